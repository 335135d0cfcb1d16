//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during expression parsing or evaluation
///
/// These signal a broken contract (malformed expression text, an unsupported operator,
/// a call the registry cannot serve). Spreadsheet errors such as `#VALUE!` are returned
/// as [`tally_sheets_core::Value::Error`] instead.
#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// Expression parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operator symbol outside the supported operator table
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
}
