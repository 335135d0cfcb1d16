//! Conditional sums

use super::aggregate::{range_cells, sum_numbers_at, CriteriaSet};
use crate::error::FormulaResult;
use tally_sheets_core::{ErrorCode, Value};

/// SUMIF(range, criteria, [sum_range]) - Sums the cells that meet a criterion.
///
/// Without `sum_range` the tested cells themselves are summed. Non-numeric cells in the
/// summed range are skipped; an error in a qualifying row is returned.
pub fn sum_if(
    range: &Value,
    criterion: &Value,
    sum_range: Option<&Value>,
) -> FormulaResult<Value> {
    let set = match CriteriaSet::single(range, criterion) {
        Ok(set) => set,
        Err(e) => return Ok(Value::Error(e)),
    };
    let cells = match range_cells(sum_range.unwrap_or(range)) {
        Ok(cells) => cells,
        Err(e) => return Ok(Value::Error(e)),
    };

    let rows = set.matching_rows()?;
    Ok(match sum_numbers_at(&rows, &cells) {
        Ok((sum, _)) => Value::Number(sum),
        Err(e) => Value::Error(e),
    })
}

/// SUMIFS(sum_range, criteria_range1, criteria1, ...) - Sums the cells of `sum_range`
/// whose rows meet every criterion.
///
/// Each criteria range must have as many cells as `sum_range`, otherwise `#VALUE!`.
pub fn sum_ifs(sum_range: &Value, pairs: &[Value]) -> FormulaResult<Value> {
    let cells = match range_cells(sum_range) {
        Ok(cells) => cells,
        Err(e) => return Ok(Value::Error(e)),
    };
    let set = match CriteriaSet::from_pairs(pairs, Some(cells.len())) {
        Ok(set) => set,
        Err(e) => return Ok(Value::Error(e)),
    };

    let rows = set.matching_rows()?;
    Ok(match sum_numbers_at(&rows, &cells) {
        Ok((sum, _)) => Value::Number(sum),
        Err(e) => Value::Error(e),
    })
}

pub fn fn_sumif(args: &[Value]) -> FormulaResult<Value> {
    match args {
        [range, criterion] => sum_if(range, criterion, None),
        [range, criterion, sum_range] => sum_if(range, criterion, Some(sum_range)),
        _ => Ok(Value::Error(ErrorCode::Value)),
    }
}

pub fn fn_sumifs(args: &[Value]) -> FormulaResult<Value> {
    let [sum_range, pairs @ ..] = args else {
        return Ok(Value::Error(ErrorCode::Value));
    };
    sum_ifs(sum_range, pairs)
}
