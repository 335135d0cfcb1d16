//! Conditional-aggregate driver
//!
//! Applies compiled criteria element-wise across parallel ranges. Ranges are flattened
//! in row order; a row qualifies only when every criterion holds for it.

use super::criteria::Predicate;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use tally_sheets_core::{ErrorCode, Value};

/// One `(range, criterion)` pair, compiled
#[derive(Debug)]
struct Clause {
    cells: Vec<Value>,
    predicate: Predicate,
}

/// A set of criteria over ranges of equal length
#[derive(Debug)]
pub struct CriteriaSet {
    clauses: Vec<Clause>,
    len: usize,
}

/// Flatten a range argument. An error in place of the whole range is returned as-is.
pub fn range_cells(range: &Value) -> Result<Vec<Value>, ErrorCode> {
    match range {
        Value::Error(e) => Err(*e),
        v => Ok(v.flatten()),
    }
}

impl CriteriaSet {
    /// A single criterion over one range
    pub fn single(range: &Value, criterion: &Value) -> Result<Self, ErrorCode> {
        let cells = range_cells(range)?;
        let predicate = Predicate::from_value(criterion)?;
        Ok(Self {
            len: cells.len(),
            clauses: vec![Clause { cells, predicate }],
        })
    }

    /// Criteria from alternating `range, criterion` arguments.
    ///
    /// Every range must have `expected_len` cells, or the length of the first range when
    /// none is given. A length mismatch or an incomplete pair is `#VALUE!`.
    pub fn from_pairs(pairs: &[Value], expected_len: Option<usize>) -> Result<Self, ErrorCode> {
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            tracing::debug!(args = pairs.len(), "criteria arguments do not form pairs");
            return Err(ErrorCode::Value);
        }

        let mut clauses = Vec::with_capacity(pairs.len() / 2);
        let mut len = expected_len;
        for (index, pair) in pairs.chunks_exact(2).enumerate() {
            let cells = range_cells(&pair[0])?;
            let predicate = Predicate::from_value(&pair[1])?;

            let expected = *len.get_or_insert(cells.len());
            if cells.len() != expected {
                tracing::debug!(
                    pair = index + 1,
                    expected,
                    actual = cells.len(),
                    "criteria range length mismatch"
                );
                return Err(ErrorCode::Value);
            }
            clauses.push(Clause { cells, predicate });
        }

        Ok(Self {
            clauses,
            len: len.unwrap_or(0),
        })
    }

    /// Number of rows the criteria cover
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every criterion holds for a row
    pub fn is_match(&self, row: usize) -> FormulaResult<bool> {
        self.row_matches(row, &mut EvaluationContext::new())
    }

    fn row_matches(&self, row: usize, ctx: &mut EvaluationContext) -> FormulaResult<bool> {
        for clause in &self.clauses {
            let cell = clause.cells.get(row).unwrap_or(&Value::Empty);
            if !clause.predicate.test_in(cell, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Indices of qualifying rows, in range order
    pub fn matching_rows(&self) -> FormulaResult<Vec<usize>> {
        let mut ctx = EvaluationContext::new();
        let mut rows = Vec::new();
        for row in 0..self.len {
            if self.row_matches(row, &mut ctx)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

/// Sum and count the numeric cells at the given rows.
///
/// Text, boolean and empty cells are skipped. The first error cell is returned.
pub fn sum_numbers_at(rows: &[usize], cells: &[Value]) -> Result<(f64, usize), ErrorCode> {
    let mut sum = 0.0;
    let mut count = 0;
    for cell in rows.iter().filter_map(|&row| cells.get(row)) {
        match cell {
            Value::Number(n) | Value::Date(n) => {
                sum += n;
                count += 1;
            }
            Value::Error(e) => return Err(*e),
            _ => {}
        }
    }
    Ok((sum, count))
}
