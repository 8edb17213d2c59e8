//! Crate-level error types

use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingest error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Db(#[from] crate::db::DbError),

    #[error("Parse error: {0}")]
    Parser(#[from] crate::purchasing::parser::ParserError),

    #[error("Transform error: {0}")]
    Transform(#[from] crate::purchasing::normalize::TransformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CDP error: {0}")]
    Common(#[from] cdp_common::CdpError),
}
