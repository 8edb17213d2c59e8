// Purchasing Export Parser
//
// Reads the flat CSV export of call and purchase records.
//
// The export is a single headered CSV; columns are matched by name so the
// column order does not matter, and rows may omit trailing fields. No
// value interpretation happens here -- empty cells surface as None and
// textual missing markers ("n/a", "na") pass through untouched for the
// canonicalizer.

use crate::purchasing::models::RawRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Export Parser
// ============================================================================

/// Parser for the flat purchasing export
pub struct ExportParser;

impl ExportParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV export file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse export rows from a reader, preserving source order
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<RawRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: RawRecord = result?;
            records.push(record);
        }

        debug!("Parsed {} rows from export", records.len());

        Ok(records)
    }
}

impl Default for ExportParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
