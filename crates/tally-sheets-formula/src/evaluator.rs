//! Expression evaluator
//!
//! Reduces an [`Expr`] to a single [`Value`]. Spreadsheet errors travel through
//! evaluation as values: the first error operand met (left to right) is the result.

use crate::ast::{BinaryOperator, Expr, LogicalOperator, UnaryOperator};
use crate::error::FormulaResult;
use crate::parser::parse_expression;
use ahash::AHashMap;
use std::cmp::Ordering;
use tally_sheets_core::coerce::{parse_numeric_text, to_boolean, to_number};
use tally_sheets_core::{ErrorCode, Value};

/// Identifier bindings for one evaluation
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    variables: AHashMap<String, Value>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a single binding
    pub fn with_variable(name: impl Into<String>, value: Value) -> Self {
        let mut ctx = Self::new();
        ctx.set(name, value);
        ctx
    }

    /// Bind (or rebind) a name
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Rebind a name in place, inserting it only when it is not yet bound
    pub fn rebind(&mut self, name: &str, value: Value) {
        match self.variables.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.variables.insert(name.to_string(), value);
            }
        }
    }

    /// Look up a name; unbound names read as [`Value::Empty`]
    pub fn get(&self, name: &str) -> Value {
        self.variables.get(name).cloned().unwrap_or_default()
    }
}

/// Evaluate an expression
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> FormulaResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Identifier(name) => Ok(ctx.get(name)),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, ctx)?;
            Ok(evaluate_unary_op(*op, &value))
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            Ok(evaluate_binary_op(*op, &left, &right))
        }
        Expr::Logical { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            Ok(evaluate_logical_op(*op, &left, &right))
        }
    }
}

/// Parse and evaluate expression text
pub fn evaluate_str(source: &str, ctx: &EvaluationContext) -> FormulaResult<Value> {
    let expr = parse_expression(source)?;
    evaluate(&expr, ctx)
}

fn number_result(n: f64) -> Value {
    if n.is_finite() {
        Value::Number(n)
    } else {
        Value::Error(ErrorCode::Num)
    }
}

fn evaluate_unary_op(op: UnaryOperator, value: &Value) -> Value {
    let result = match op {
        UnaryOperator::Negate => to_number(value).map(|n| Value::Number(-n)),
        UnaryOperator::Plus => to_number(value).map(Value::Number),
        UnaryOperator::Not => to_boolean(value).map(|b| Value::Boolean(!b)),
    };
    result.unwrap_or_else(Value::Error)
}

/// Evaluate a binary operation on already-evaluated operands
pub fn evaluate_binary_op(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    // Propagate errors
    if let Some(e) = left.error() {
        return Value::Error(e);
    }
    if let Some(e) = right.error() {
        return Value::Error(e);
    }

    match op {
        BinaryOperator::Equal => Value::Boolean(values_equal(left, right)),
        BinaryOperator::NotEqual => Value::Boolean(!values_equal(left, right)),
        BinaryOperator::LessThan => ordered(left, right, Ordering::is_lt),
        BinaryOperator::LessEqual => ordered(left, right, Ordering::is_le),
        BinaryOperator::GreaterThan => ordered(left, right, Ordering::is_gt),
        BinaryOperator::GreaterEqual => ordered(left, right, Ordering::is_ge),
        _ => {
            let (l, r) = match (to_number(left), to_number(right)) {
                (Ok(l), Ok(r)) => (l, r),
                (Err(e), _) | (_, Err(e)) => return Value::Error(e),
            };
            match op {
                BinaryOperator::Add => number_result(l + r),
                BinaryOperator::Subtract => number_result(l - r),
                BinaryOperator::Multiply => number_result(l * r),
                BinaryOperator::Divide | BinaryOperator::Remainder if r == 0.0 => {
                    Value::Error(ErrorCode::Div0)
                }
                BinaryOperator::Divide => number_result(l / r),
                _ => number_result(l % r),
            }
        }
    }
}

fn ordered(left: &Value, right: &Value, test: fn(Ordering) -> bool) -> Value {
    Value::Boolean(compare_values(left, right).map_or(false, test))
}

fn evaluate_logical_op(op: LogicalOperator, left: &Value, right: &Value) -> Value {
    let (l, r) = match (to_boolean(left), to_boolean(right)) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => return Value::Error(e),
    };
    Value::Boolean(match op {
        LogicalOperator::And => l && r,
        LogicalOperator::Or => l || r,
    })
}

/// Loose equality: numeric text equals the number it spells, text compares
/// case-insensitively, booleans equal 0/1 and `TRUE`/`FALSE` text.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Some(Ordering::Equal)
}

/// Order two scalars, or `None` when the pair has no defined ordering.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    use Value::*;

    match (left, right) {
        (Number(l) | Date(l), Number(r) | Date(r)) => l.partial_cmp(r),

        // Numeric text compares as the number it spells
        (Number(n) | Date(n), Text(s)) => parse_numeric_text(s).and_then(|t| n.partial_cmp(&t)),
        (Text(s), Number(n) | Date(n)) => parse_numeric_text(s).and_then(|t| t.partial_cmp(n)),

        // Text compares case-insensitively
        (Text(l), Text(r)) => Some(l.to_lowercase().cmp(&r.to_lowercase())),

        // FALSE < TRUE; booleans against numbers compare as 0/1
        (Boolean(l), Boolean(r)) => Some(l.cmp(r)),
        (Boolean(b), Number(n) | Date(n)) => bool_number(*b).partial_cmp(n),
        (Number(n) | Date(n), Boolean(b)) => n.partial_cmp(&bool_number(*b)),
        (Boolean(b), Text(_)) => to_boolean(right).ok().map(|t| b.cmp(&t)),
        (Text(_), Boolean(b)) => to_boolean(left).ok().map(|t| t.cmp(b)),

        (Empty, Empty) => Some(Ordering::Equal),
        (Empty, Text(s)) | (Text(s), Empty) if s.is_empty() => Some(Ordering::Equal),

        _ => None,
    }
}

fn bool_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
