// Purchasing Ingest Configuration
//
// Environment-based configuration for the purchasing export ingestion

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Configuration for the purchasing export ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchasingConfig {
    /// Path to the flat CSV export
    pub input: PathBuf,

    /// Batch size for destination upserts
    pub batch_size: usize,
}

impl Default for PurchasingConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./data/purchasing_2023.csv"),
            batch_size: 500,
        }
    }
}

impl PurchasingConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - INGEST_PURCHASING_INPUT
    /// - INGEST_PURCHASING_BATCH_SIZE
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            input: env::var("INGEST_PURCHASING_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input),

            batch_size: env::var("INGEST_PURCHASING_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
        }
    }
}
