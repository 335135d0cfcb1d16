//! Error types for tally-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-sheets-core
///
/// These are Rust-level failures (bad input to a constructor or parser). Spreadsheet
/// errors such as `#VALUE!` are ordinary values, see [`crate::ErrorCode`].
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Text that is not one of the spreadsheet error spellings
    #[error("Invalid error code: {0}")]
    InvalidErrorCode(String),

    /// Serial number outside the range chrono can represent
    #[error("Invalid date serial: {0}")]
    InvalidDate(f64),
}
