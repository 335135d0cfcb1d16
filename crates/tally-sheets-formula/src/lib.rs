//! # tally-sheets-formula
//!
//! Criteria compiler and conditional aggregates for tally-sheets.
//!
//! This crate provides:
//! - Expression parsing (text → AST) and evaluation (AST → value)
//! - Criterion tokenizing and compilation into reusable predicates
//! - Conditional aggregates (`COUNTIF`, `SUMIFS`, ...) and lookups (`MATCH`, `VLOOKUP`, ...)
//! - A function registry for calling them by name
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::Value;
//! use tally_sheets_formula::FunctionRegistry;
//!
//! let result = FunctionRegistry::global()
//!     .call(
//!         "SUMIF",
//!         &[
//!             Value::from(vec![1, 2, 3, 4]),
//!             Value::from("<=2"),
//!             Value::from(vec![10, 20, 30, 40]),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(result, Value::Number(30.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod wildcard;

pub use ast::{BinaryOperator, Expr, LogicalOperator, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{compare_values, evaluate, evaluate_str, EvaluationContext};
pub use functions::criteria::{Criterion, CriterionOperator, Predicate};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::parse_expression;
pub use wildcard::WildcardPattern;
