//! # tally-sheets-core
//!
//! Core data structures for the tally-sheets formula library.
//!
//! This crate provides the fundamental types used throughout tally-sheets:
//! - [`Value`] - Any cell content or intermediate result (numbers, text, booleans, dates,
//!   errors, arrays)
//! - [`ErrorCode`] - Spreadsheet error sentinels (`#VALUE!`, `#N/A`, ...)
//! - [`coerce`] - The four coercions every operation routes through
//! - [`DateSystem`] - Serial date interpretation
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::{coerce, ErrorCode, Value};
//!
//! assert_eq!(coerce::to_number(&Value::from("12")), Ok(12.0));
//! assert_eq!(coerce::to_number(&Value::from("twelve")), Err(ErrorCode::Value));
//! assert_eq!(coerce::to_text(&Value::Boolean(true)), Ok("TRUE".to_string()));
//! ```

pub mod coerce;
pub mod date;
pub mod error;
pub mod value;

// Re-exports for convenience
pub use date::{date_to_serial, serial_to_date, DateSystem};
pub use error::{Error, Result};
pub use value::{ErrorCode, Value};
