//! Criteria for COUNTIF, SUMIF, AVERAGEIF and their multi-criteria variants
//!
//! A criterion is a comparison operator plus an operand, read from a single
//! user-supplied value:
//! - A number, boolean or date: equality with that value (e.g., 5)
//! - Text with an operator prefix: ">5", ">=10", "<100", "<=50", "<>0", "=5"
//! - Any other text: equality with the text (e.g., "apple")
//! - Wildcards in `=`/`<>` text: "*" matches any characters, "?" a single character
//! - Empty text: matches empty cells
//!
//! Operand text that spells a number is compared numerically, so `">10"` does not
//! compare lexically.

use crate::ast::{BinaryOperator, Expr};
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::wildcard::{has_wildcards, WildcardPattern};
use std::fmt;
use tally_sheets_core::coerce::parse_numeric_text;
use tally_sheets_core::{ErrorCode, Value};

/// Identifier the candidate cell is bound to while a predicate runs
pub const RANGE_VALUE: &str = "range-value";

/// Prefixes recognised on text criteria, longest first
const PREFIXES: &[(&str, CriterionOperator)] = &[
    ("<=", CriterionOperator::Le),
    (">=", CriterionOperator::Ge),
    ("<>", CriterionOperator::Ne),
    ("=", CriterionOperator::Eq),
    ("<", CriterionOperator::Lt),
    (">", CriterionOperator::Gt),
];

/// Comparison applied by a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl From<CriterionOperator> for BinaryOperator {
    fn from(op: CriterionOperator) -> Self {
        match op {
            CriterionOperator::Eq => BinaryOperator::Equal,
            CriterionOperator::Ne => BinaryOperator::NotEqual,
            CriterionOperator::Gt => BinaryOperator::GreaterThan,
            CriterionOperator::Ge => BinaryOperator::GreaterEqual,
            CriterionOperator::Lt => BinaryOperator::LessThan,
            CriterionOperator::Le => BinaryOperator::LessEqual,
        }
    }
}

/// A tokenized criterion
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub operator: CriterionOperator,
    pub operand: Value,
}

impl Criterion {
    /// Split a raw criterion value into operator and operand.
    ///
    /// An error criterion is returned as that error; an array is not a criterion.
    pub fn parse(raw: &Value) -> Result<Self, ErrorCode> {
        let text = match raw {
            Value::Error(e) => return Err(*e),
            Value::Array(_) => return Err(ErrorCode::Value),
            Value::Text(s) => s,
            other => {
                return Ok(Self {
                    operator: CriterionOperator::Eq,
                    operand: other.clone(),
                })
            }
        };

        let (operator, rest) = PREFIXES
            .iter()
            .find_map(|(prefix, op)| text.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((CriterionOperator::Eq, text.as_str()));

        let operand = match parse_numeric_text(rest) {
            Some(n) => Value::Number(n),
            None => Value::Text(rest.to_string()),
        };

        Ok(Self { operator, operand })
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", BinaryOperator::from(self.operator), self.operand)
    }
}

/// The executable form of a criterion
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `range-value <op> operand`
    Compiled(Expr),
    /// Wildcard text match, inverted for `<>`
    Wildcard {
        pattern: WildcardPattern,
        negate: bool,
    },
}

impl Predicate {
    /// Compile a criterion once for reuse across every row of a range
    pub fn compile(criterion: &Criterion) -> Self {
        if let Value::Text(text) = &criterion.operand {
            let negate = match criterion.operator {
                CriterionOperator::Eq => Some(false),
                CriterionOperator::Ne => Some(true),
                _ => None,
            };
            if let Some(negate) = negate.filter(|_| has_wildcards(text)) {
                match WildcardPattern::new(text) {
                    Ok(pattern) => {
                        tracing::trace!(pattern = %text, negate, "compiled wildcard criterion");
                        return Predicate::Wildcard { pattern, negate };
                    }
                    Err(e) => {
                        tracing::debug!(
                            pattern = %text,
                            error = %e,
                            "wildcard pattern rejected, comparing literally"
                        );
                    }
                }
            }
        }

        let expr = Expr::binary(
            criterion.operator.into(),
            Expr::identifier(RANGE_VALUE),
            Expr::Literal(criterion.operand.clone()),
        );
        tracing::trace!(criterion = %criterion, "compiled criterion");
        Predicate::Compiled(expr)
    }

    /// Tokenize and compile a raw criterion value
    pub fn from_value(raw: &Value) -> Result<Self, ErrorCode> {
        Criterion::parse(raw).map(|c| Self::compile(&c))
    }

    /// Test one candidate cell. Error cells never match.
    pub fn test(&self, candidate: &Value) -> FormulaResult<bool> {
        self.test_in(candidate, &mut EvaluationContext::new())
    }

    /// Test one candidate cell, binding it into a context shared across rows
    pub fn test_in(&self, candidate: &Value, ctx: &mut EvaluationContext) -> FormulaResult<bool> {
        if candidate.is_error() {
            return Ok(false);
        }
        match self {
            Predicate::Compiled(expr) => {
                ctx.rebind(RANGE_VALUE, candidate.clone());
                Ok(matches!(evaluate(expr, ctx)?, Value::Boolean(true)))
            }
            Predicate::Wildcard { pattern, negate } => {
                let hit = matches!(candidate, Value::Text(s) if pattern.is_match(s));
                Ok(hit != *negate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn predicate(raw: impl Into<Value>) -> Predicate {
        Predicate::from_value(&raw.into()).unwrap()
    }

    fn matches(p: &Predicate, v: impl Into<Value>) -> bool {
        p.test(&v.into()).unwrap()
    }

    #[test]
    fn test_parse_operator_prefixes() {
        let cases = [
            ("<=5", CriterionOperator::Le),
            (">=5", CriterionOperator::Ge),
            ("<>5", CriterionOperator::Ne),
            ("=5", CriterionOperator::Eq),
            ("<5", CriterionOperator::Lt),
            (">5", CriterionOperator::Gt),
            ("5", CriterionOperator::Eq),
        ];
        for (text, op) in cases {
            let c = Criterion::parse(&Value::from(text)).unwrap();
            assert_eq!(c.operator, op, "{}", text);
            assert_eq!(c.operand, Value::Number(5.0), "{}", text);
        }
    }

    #[test]
    fn test_parse_text_operand() {
        let c = Criterion::parse(&Value::from("<>apple")).unwrap();
        assert_eq!(c.operator, CriterionOperator::Ne);
        assert_eq!(c.operand, Value::from("apple"));

        let c = Criterion::parse(&Value::from("")).unwrap();
        assert_eq!(c.operator, CriterionOperator::Eq);
        assert_eq!(c.operand, Value::from(""));
    }

    #[test]
    fn test_parse_non_text() {
        let c = Criterion::parse(&Value::Number(25.0)).unwrap();
        assert_eq!(c.operator, CriterionOperator::Eq);
        assert_eq!(c.operand, Value::Number(25.0));

        let c = Criterion::parse(&Value::Boolean(true)).unwrap();
        assert_eq!(c.operand, Value::Boolean(true));
    }

    #[test]
    fn test_parse_rejects_errors_and_arrays() {
        assert_eq!(
            Criterion::parse(&Value::Error(ErrorCode::Na)),
            Err(ErrorCode::Na)
        );
        assert_eq!(
            Criterion::parse(&Value::from(vec![1, 2])),
            Err(ErrorCode::Value)
        );
    }

    #[test]
    fn test_compiled_tree_shape() {
        let p = predicate(">10");
        let Predicate::Compiled(expr) = p else {
            panic!("expected a compiled comparison");
        };
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOperator::GreaterThan,
                Expr::identifier(RANGE_VALUE),
                Expr::literal(10.0)
            )
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let c = Criterion::parse(&Value::from("<>x")).unwrap();
        let (Predicate::Compiled(a), Predicate::Compiled(b)) =
            (Predicate::compile(&c), Predicate::compile(&c))
        else {
            panic!("expected compiled comparisons");
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_number_criteria() {
        let p = predicate(5);
        assert!(matches(&p, 5));
        assert!(!matches(&p, 4));
        assert!(matches(&p, "5"));
        assert!(!matches(&p, "five"));
    }

    #[test]
    fn test_comparison_criteria() {
        let p = predicate(">5");
        assert!(matches(&p, 6));
        assert!(!matches(&p, 5));
        assert!(!matches(&p, 4));

        let p = predicate(">=5");
        assert!(matches(&p, 5));
        assert!(!matches(&p, 4));

        let p = predicate("<5");
        assert!(matches(&p, 4));
        assert!(!matches(&p, 5));

        let p = predicate("<=5");
        assert!(matches(&p, 5));
        assert!(!matches(&p, 6));

        let p = predicate("<>5");
        assert!(matches(&p, 6));
        assert!(!matches(&p, 5));
        assert!(matches(&p, "text"));
    }

    #[test]
    fn test_numeric_operand_is_not_lexical() {
        let p = predicate(">10");
        assert!(matches(&p, 9.5e1));
        assert!(!matches(&p, 9));
    }

    #[test]
    fn test_text_criteria() {
        let p = predicate("apple");
        assert!(matches(&p, "apple"));
        assert!(matches(&p, "APPLE"));
        assert!(!matches(&p, "banana"));
        assert!(!matches(&p, 1));
    }

    #[test]
    fn test_wildcard_criteria() {
        let p = predicate("a*");
        assert!(matches!(p, Predicate::Wildcard { negate: false, .. }));
        assert!(matches(&p, "apple"));
        assert!(matches(&p, "Avocado"));
        assert!(!matches(&p, "banana"));
        assert!(!matches(&p, 1));

        let p = predicate("<>a?");
        assert!(matches!(p, Predicate::Wildcard { negate: true, .. }));
        assert!(!matches(&p, "ab"));
        assert!(matches(&p, "abc"));
        assert!(matches(&p, 12));
    }

    #[test]
    fn test_wildcard_ignored_for_ordering() {
        let p = predicate(">a*");
        assert!(matches!(p, Predicate::Compiled(_)));
        assert!(matches(&p, "b"));
    }

    #[test]
    fn test_empty_criteria() {
        let p = predicate("");
        assert!(matches(&p, Value::Empty));
        assert!(matches(&p, ""));
        assert!(!matches(&p, "text"));
        assert!(!matches(&p, 0));

        let p = predicate("<>");
        assert!(!matches(&p, Value::Empty));
        assert!(matches(&p, "text"));
        assert!(matches(&p, 0));
    }

    #[test]
    fn test_error_cells_never_match() {
        for raw in ["<>1", "<>a*", "=1"] {
            assert!(!matches(&predicate(raw), ErrorCode::Div0), "{}", raw);
        }
    }

    #[test]
    fn test_criterion_display() {
        let c = Criterion::parse(&Value::from(">=12")).unwrap();
        assert_eq!(c.to_string(), ">= 12");
    }

    #[test]
    fn test_shared_context_across_rows() {
        let p = predicate(">2");
        let mut ctx = EvaluationContext::new();
        let rows = [Value::from(1), Value::from(5), Value::from(2), Value::from(3)];
        let hits: Vec<bool> = rows
            .iter()
            .map(|cell| p.test_in(cell, &mut ctx).unwrap())
            .collect();
        assert_eq!(hits, vec![false, true, false, true]);
        assert_eq!(ctx.get(RANGE_VALUE), Value::from(3));
    }
}
