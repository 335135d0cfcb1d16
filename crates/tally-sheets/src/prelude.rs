//! Prelude module for convenient imports
//!
//! ```rust
//! use tally_sheets::prelude::*;
//! ```

pub use crate::{
    average_if, average_ifs, count_if, count_ifs, hlookup, match_value, sum_if, sum_ifs,
    vlookup,
};
pub use crate::{ErrorCode, FunctionRegistry, Value};
pub use tally_sheets_core::coerce::{to_boolean, to_date, to_number, to_text};
