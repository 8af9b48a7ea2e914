use crate::application::engine::ParticipantSummary;
use crate::error::Result;
use std::io::Write;

const HEADER: [&str; 8] = [
    "participant",
    "role",
    "balance",
    "seeds",
    "beans",
    "products",
    "orders",
    "harvesters",
];

/// Writes the ledger snapshot as CSV, one row per participant.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    /// Writes the header and every summary, then flushes.
    ///
    /// Balances are normalized, so `10.00` is written as `10`. Participants
    /// that are not farmers leave `harvesters` empty.
    pub fn write_summaries(&mut self, summaries: Vec<ParticipantSummary>) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for mut summary in summaries {
            summary.balance = summary.balance.normalize();
            self.writer.serialize(summary)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
