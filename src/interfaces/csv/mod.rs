pub mod ledger_writer;
pub mod participant_reader;
