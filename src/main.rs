use clap::Parser;
use cocoa_chain::application::engine::PipelineEngine;
use cocoa_chain::config::{EngineConfig, load_config};
use cocoa_chain::domain::ports::{CatalogIndexBox, RecordStoreBox};
use cocoa_chain::infrastructure::in_memory::InMemoryLedger;
use cocoa_chain::interfaces::csv::ledger_writer::LedgerWriter;
use cocoa_chain::interfaces::csv::participant_reader::ParticipantReader;
use cocoa_chain::interfaces::json::request_reader::RequestReader;
use cocoa_chain::logging;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Participants CSV file (id,role,balance)
    participants: PathBuf,

    /// Requests file, one JSON request per line
    requests: PathBuf,

    /// Path to persistent database (optional). Needs the `storage-rocksdb` feature.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Engine configuration JSON file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random source, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(RecordStoreBox, CatalogIndexBox)> {
    use cocoa_chain::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(RecordStoreBox, CatalogIndexBox)> {
    if let Some(db_path) = db_path {
        tracing::warn!(
            db_path = %db_path.display(),
            "built without storage-rocksdb, using in-memory storage"
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (RecordStoreBox, CatalogIndexBox) {
    let ledger = InMemoryLedger::new();
    (Box::new(ledger.clone()), Box::new(ledger))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).into_diagnostic()?,
        None => EngineConfig::default(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }

    let (store, index) = open_stores(cli.db_path.as_deref())?;
    let engine = PipelineEngine::open(store, index)
        .await
        .into_diagnostic()?
        .with_config(config);

    // Participants already in a persistent store keep their state.
    let file = File::open(&cli.participants).into_diagnostic()?;
    for participant in ParticipantReader::new(file).participants() {
        match participant {
            Ok(participant) => {
                let known = engine
                    .participant(&participant.id)
                    .await
                    .into_diagnostic()?;
                if known.is_none() {
                    engine
                        .register_participant(participant)
                        .await
                        .into_diagnostic()?;
                }
            }
            Err(e) => error!(error = %e, "skipping participant row"),
        }
    }

    let file = File::open(&cli.requests).into_diagnostic()?;
    let mut processed = 0usize;
    for request in RequestReader::new(file).requests() {
        match request {
            Ok(request) => match engine.process_request(request).await {
                Ok(_) => processed += 1,
                Err(e) => error!(error = %e, "request failed"),
            },
            Err(e) => error!(error = %e, "skipping request"),
        }
    }
    info!(processed, "requests done");

    let summaries = engine.snapshot().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_summaries(summaries).into_diagnostic()?;

    Ok(())
}
