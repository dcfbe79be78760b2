//! Common error types for the ranking updater

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for ranking updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is fatal to the run; callers propagate these to the top level.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input stream has no header line
    #[error("Input has no header line")]
    EmptyInput,

    /// Header does not contain the member identifier column
    #[error("Column '{0}' not found in header")]
    MissingColumn(String),

    /// Data row too short to hold the member identifier column
    #[error("Malformed row at line {line}: expected at least {required} fields, found {found}")]
    MalformedRow {
        line: usize,
        required: usize,
        found: usize,
    },

    /// Data row whose member identifier field is empty
    #[error("Malformed row at line {line}: empty member id")]
    EmptyMemberId { line: usize },

    /// Ranking service answered with a non-success status or GraphQL errors
    #[error("Ranking service request failed ({status}): {body}")]
    Remote { status: String, body: String },

    /// Transport failure talking to the ranking service (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ranking service body does not have the expected shape
    #[error("Failed to parse ranking response: {0}")]
    Parse(String),

    /// File open/read/write failure, with the offending path
    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach a file path to an I/O error
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }
}
