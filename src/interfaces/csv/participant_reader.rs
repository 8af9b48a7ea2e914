use crate::domain::money::Money;
use crate::domain::participant::{Participant, ParticipantId, Role};
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ParticipantRow {
    id: String,
    role: Role,
    balance: Money,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = PipelineError;

    fn try_from(row: ParticipantRow) -> Result<Self> {
        if row.id.is_empty() {
            return Err(PipelineError::ValidationError(
                "participant id must not be empty".to_string(),
            ));
        }
        Ok(Participant::new(ParticipantId(row.id), row.role, row.balance))
    }
}

/// Reads participants from a CSV source with an `id,role,balance` header.
///
/// Whitespace around fields is trimmed. Each row yields its own `Result`,
/// so one bad row does not stop the rest of the file.
pub struct ParticipantReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ParticipantReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes and validates participant rows.
    pub fn participants(self) -> impl Iterator<Item = Result<Participant>> {
        self.reader
            .into_deserialize::<ParticipantRow>()
            .map(|row| row.map_err(PipelineError::from).and_then(Participant::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, role, balance\nt1, trader, 0\nf1, farmer, 250.50";
        let reader = ParticipantReader::new(data.as_bytes());
        let results: Vec<Result<Participant>> = reader.participants().collect();

        assert_eq!(results.len(), 2);
        let farmer = results[1].as_ref().unwrap();
        assert_eq!(farmer.id, ParticipantId::new("f1"));
        assert_eq!(farmer.role(), Role::Farmer);
        assert_eq!(farmer.balance, Money::new(dec!(250.50)));
        assert_eq!(farmer.harvesters_count(), Some(0));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "id,role,balance\nx1,wizard,10\nm1,market,abc\nc1,customer,5";
        let reader = ParticipantReader::new(data.as_bytes());
        let results: Vec<Result<Participant>> = reader.participants().collect();

        assert!(matches!(results[0], Err(PipelineError::CsvError(_))));
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_reader_keeps_negative_balance() {
        let data = "id,role,balance\nc1,customer,-12.5\n,market,3";
        let reader = ParticipantReader::new(data.as_bytes());
        let results: Vec<Result<Participant>> = reader.participants().collect();

        let customer = results[0].as_ref().unwrap();
        assert_eq!(customer.balance, Money::new(dec!(-12.5)));
        assert!(matches!(results[1], Err(PipelineError::ValidationError(_))));
    }
}
