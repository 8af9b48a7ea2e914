//! Engine tunables, optionally loaded from a JSON file.

use crate::domain::money::Money;
use crate::error::{PipelineError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine configuration. Missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Price every generated seed is issued at.
    pub seed_unit_price: Money,
    pub min_seed_batch: u32,
    pub max_seed_batch: u32,
    /// Upper bound of the random factor applied to a bean's price when it
    /// becomes a new product.
    pub max_markup_factor: u32,
    /// Rate applied to the factory price when a market lists a product.
    pub wholesale_markup: Decimal,
    pub shelf_life_months: u32,
    /// Seed for the default random source. Unset means seeded from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_unit_price: Money::new(dec!(10)),
            min_seed_batch: 5,
            max_seed_batch: 20,
            max_markup_factor: 500,
            wholesale_markup: dec!(1.2),
            shelf_life_months: 12,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.seed_unit_price <= Money::ZERO {
            return Err(PipelineError::ValidationError(
                "seed_unit_price must be > 0".to_string(),
            ));
        }
        if self.min_seed_batch == 0 {
            return Err(PipelineError::ValidationError(
                "min_seed_batch must be > 0".to_string(),
            ));
        }
        if self.min_seed_batch > self.max_seed_batch {
            return Err(PipelineError::ValidationError(
                "min_seed_batch must not exceed max_seed_batch".to_string(),
            ));
        }
        if self.wholesale_markup < Decimal::ONE {
            return Err(PipelineError::ValidationError(
                "wholesale_markup must be >= 1".to_string(),
            ));
        }
        if self.shelf_life_months == 0 {
            return Err(PipelineError::ValidationError(
                "shelf_life_months must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate config from a JSON file.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}
