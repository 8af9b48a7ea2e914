#![allow(dead_code)]

use cocoa_chain::application::engine::PipelineEngine;
use cocoa_chain::domain::money::Money;
use cocoa_chain::domain::participant::{Participant, Role};
use cocoa_chain::domain::sources::{FixedClock, MonotonicIds, ScriptedRandom};
use cocoa_chain::infrastructure::in_memory::InMemoryLedger;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// One participant of every role, with enough money to trade.
pub const PARTICIPANTS_CSV: &str = "id,role,balance
t1,trader,0
f1,farmer,100
fa1,factory,1000
m1,market,10000
c1,customer,50
";

pub fn write_temp(contents: &str) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Writes one JSON request per line.
pub fn write_requests(requests: &[&str]) -> Result<NamedTempFile, Error> {
    write_temp(&(requests.join("\n") + "\n"))
}

/// An in-memory engine with scripted draws, a fixed clock and ids from 1.
pub async fn scripted_engine(
    draws: Vec<f64>,
    participants: &[(&str, Role, Decimal)],
) -> (InMemoryLedger, PipelineEngine) {
    let ledger = InMemoryLedger::new();
    let engine = PipelineEngine::new(Box::new(ledger.clone()), Box::new(ledger.clone()))
        .with_random(ScriptedRandom::new(draws))
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()))
        .with_ids(MonotonicIds::starting_at(1));
    for (id, role, balance) in participants {
        engine
            .register_participant(Participant::new(*id, *role, Money::new(*balance)))
            .await
            .unwrap();
    }
    (ledger, engine)
}
