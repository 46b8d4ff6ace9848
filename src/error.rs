//! Error types for vellum operations.

use thiserror::Error;

use crate::range::TextRange;

/// Errors that can occur while editing or converting a document.
///
/// These cover *host-supplied data* only: ranges, run sequences, and raw
/// HTML crossing the public API boundary. Violations of internal tree
/// invariants are programmer errors and panic instead of returning one of
/// these variants.
#[derive(Error, Debug)]
pub enum Error {
    #[error("range {range} is out of bounds for a document of length {length}")]
    InvalidRange { range: TextRange, length: usize },

    #[error("malformed style runs: {0}")]
    InvalidRuns(String),

    #[error("invalid header level {0}, expected 1-6")]
    InvalidHeaderLevel(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
