//! Diagnostic tracing for the pipeline, written to stderr.
//!
//! Stdout carries only the ledger snapshot, so nothing here may write to it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, which shows rejected
/// requests and store failures but not per-record steps.
///
/// # Example
/// ```bash
/// RUST_LOG=cocoa_chain=debug cocoa-chain participants.csv requests.jsonl
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
