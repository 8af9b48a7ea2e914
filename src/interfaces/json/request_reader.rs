use crate::domain::request::Request;
use crate::error::{PipelineError, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads requests from a JSON-lines source, one request object per line.
///
/// Blank lines are skipped. A line that fails to parse yields an error
/// tagged with its 1-based line number and reading continues.
pub struct RequestReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader
            .lines()
            .enumerate()
            .filter_map(|(index, line)| match line {
                Err(e) => Some(Err(PipelineError::from(e))),
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str(&line).map_err(|e| {
                    PipelineError::ValidationError(format!("line {}: {}", index + 1, e))
                })),
            })
    }
}
