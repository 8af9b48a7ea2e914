//! Application layer containing the pipeline engine and its transaction
//! handlers.
//!
//! Every handler runs against a [`unit_of_work::UnitOfWork`]: it reads
//! through it, stages writes in it, and commits it once at the end. A
//! handler that rejects a request or hits a store error simply drops the
//! unit of work, so nothing it staged reaches the store.

/// Unwraps a domain check, or returns its rejection as the handler outcome.
macro_rules! accept {
    ($checked:expr) => {
        match $checked {
            Ok(value) => value,
            Err(rejection) => {
                return Ok($crate::domain::outcome::Outcome::Rejected(rejection));
            }
        }
    };
}

pub mod engine;
mod generate;
mod harvest;
mod inventory;
mod process_order;
mod trade;
mod trade_product;
mod transform;
pub mod unit_of_work;
