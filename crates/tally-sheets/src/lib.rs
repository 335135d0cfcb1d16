//! # tally-sheets
//!
//! Spreadsheet-style criteria and conditional aggregates over raw cell values.
//!
//! Values are plain [`Value`]s; spreadsheet errors such as `#VALUE!` or `#N/A` come back
//! as [`Value::Error`] rather than as Rust errors.
//!
//! ## Features
//!
//! - Criterion mini-language: `">10"`, `"<>apple"`, `"a*"`, `25`
//! - `COUNTIF`, `SUMIF`, `AVERAGEIF` and their multi-criteria variants
//! - `MATCH`, `VLOOKUP` and `HLOOKUP` with wildcard and approximate matching
//! - The number/boolean/date/text coercions every operation routes through
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets::prelude::*;
//!
//! let sales = Value::from(vec![120, 80, 200, 45]);
//! let region = Value::from(vec!["north", "south", "North", "east"]);
//!
//! let total = sum_ifs(&sales, &[region, Value::from("north")]).unwrap();
//! assert_eq!(total, Value::Number(320.0));
//!
//! let big = count_if(&sales, &Value::from(">100")).unwrap();
//! assert_eq!(big, Value::Number(2.0));
//! ```

pub mod prelude;

// Re-export core types
pub use tally_sheets_core::{
    coerce, date_to_serial, serial_to_date, DateSystem, Error, ErrorCode, Result, Value,
};

// Re-export formula types
pub use tally_sheets_formula::{
    compare_values, evaluate, evaluate_str, parse_expression, BinaryOperator, Criterion,
    CriterionOperator, EvaluationContext, Expr, FormulaError, FormulaResult, FunctionDef,
    FunctionRegistry, LogicalOperator, Predicate, UnaryOperator, WildcardPattern,
};

// Re-export the functions
pub use tally_sheets_formula::functions::lookup::{hlookup, match_value, vlookup};
pub use tally_sheets_formula::functions::math::{sum_if, sum_ifs};
pub use tally_sheets_formula::functions::statistical::{
    average_if, average_ifs, count_if, count_ifs,
};
