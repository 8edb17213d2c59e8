//! CDP Common Library
//!
//! Shared error handling and logging setup for the CDP workspace.
//!
//! # Overview
//!
//! This crate provides the functionality every CDP component needs before it
//! can do any real work:
//!
//! - **Error Handling**: the workspace-wide error type and result alias
//! - **Logging**: tracing subscriber configuration driven by environment
//!   variables
//!
//! # Example
//!
//! ```no_run
//! use cdp_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> cdp_common::Result<()> {
//!     let config = LogConfig::from_env();
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CdpError, Result};
