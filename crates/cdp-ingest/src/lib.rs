//! CDP Ingest Library
//!
//! Transforms the flat customer-service purchasing export into the
//! normalized CDP schema (customers, mailing lists, employees, purchases,
//! subscriptions, returns) and upserts the result into the destination
//! Postgres store.
//!
//! # Pipeline
//!
//! The transform itself is pure and synchronous; the database is only
//! touched at the very end, one upsert pass per destination table:
//!
//! ```text
//! CSV export -> canonicalize nulls -> derive fields -> extract entities
//!            -> resolve cross references -> reduce conflicts -> upsert
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cdp_ingest::purchasing::{config::PurchasingConfig, pipeline::PurchasingPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db_config = cdp_ingest::db::DbConfig::from_env()?;
//!     let pool = cdp_ingest::db::create_pool(&db_config).await?;
//!
//!     let pipeline = PurchasingPipeline::new(pool, PurchasingConfig::from_env());
//!     let stats = pipeline.run().await?;
//!     println!("wrote {} purchases", stats.purchases);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod purchasing;

pub use error::{Error, Result};
