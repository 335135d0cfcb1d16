//! Conditional counts and averages

use super::aggregate::{range_cells, sum_numbers_at, CriteriaSet};
use crate::error::FormulaResult;
use tally_sheets_core::{ErrorCode, Value};

/// COUNTIF(range, criteria) - Counts the cells that meet a criterion
pub fn count_if(range: &Value, criterion: &Value) -> FormulaResult<Value> {
    match CriteriaSet::single(range, criterion) {
        Ok(set) => Ok(Value::Number(set.matching_rows()?.len() as f64)),
        Err(e) => Ok(Value::Error(e)),
    }
}

/// COUNTIFS(criteria_range1, criteria1, ...) - Counts the rows that meet every criterion.
///
/// All criteria ranges must be as long as the first one, otherwise `#VALUE!`.
pub fn count_ifs(pairs: &[Value]) -> FormulaResult<Value> {
    match CriteriaSet::from_pairs(pairs, None) {
        Ok(set) => Ok(Value::Number(set.matching_rows()?.len() as f64)),
        Err(e) => Ok(Value::Error(e)),
    }
}

/// AVERAGEIF(range, criteria, [average_range]) - Averages the cells that meet a criterion.
///
/// Returns `#DIV/0!` when no numeric cell qualifies.
pub fn average_if(
    range: &Value,
    criterion: &Value,
    average_range: Option<&Value>,
) -> FormulaResult<Value> {
    let set = match CriteriaSet::single(range, criterion) {
        Ok(set) => set,
        Err(e) => return Ok(Value::Error(e)),
    };
    let cells = match range_cells(average_range.unwrap_or(range)) {
        Ok(cells) => cells,
        Err(e) => return Ok(Value::Error(e)),
    };

    let rows = set.matching_rows()?;
    Ok(average(sum_numbers_at(&rows, &cells)))
}

/// AVERAGEIFS(average_range, criteria_range1, criteria1, ...) - Averages the cells of
/// `average_range` whose rows meet every criterion.
pub fn average_ifs(average_range: &Value, pairs: &[Value]) -> FormulaResult<Value> {
    let cells = match range_cells(average_range) {
        Ok(cells) => cells,
        Err(e) => return Ok(Value::Error(e)),
    };
    let set = match CriteriaSet::from_pairs(pairs, Some(cells.len())) {
        Ok(set) => set,
        Err(e) => return Ok(Value::Error(e)),
    };

    let rows = set.matching_rows()?;
    Ok(average(sum_numbers_at(&rows, &cells)))
}

fn average(total: Result<(f64, usize), ErrorCode>) -> Value {
    match total {
        Ok((_, 0)) => Value::Error(ErrorCode::Div0),
        Ok((sum, count)) => Value::Number(sum / count as f64),
        Err(e) => Value::Error(e),
    }
}

pub fn fn_countif(args: &[Value]) -> FormulaResult<Value> {
    match args {
        [range, criterion] => count_if(range, criterion),
        _ => Ok(Value::Error(ErrorCode::Value)),
    }
}

pub fn fn_countifs(args: &[Value]) -> FormulaResult<Value> {
    count_ifs(args)
}

pub fn fn_averageif(args: &[Value]) -> FormulaResult<Value> {
    match args {
        [range, criterion] => average_if(range, criterion, None),
        [range, criterion, average_range] => average_if(range, criterion, Some(average_range)),
        _ => Ok(Value::Error(ErrorCode::Value)),
    }
}

pub fn fn_averageifs(args: &[Value]) -> FormulaResult<Value> {
    let [average_range, pairs @ ..] = args else {
        return Ok(Value::Error(ErrorCode::Value));
    };
    average_ifs(average_range, pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_countif_number() {
        let result = count_if(&Value::from(vec![1, 2, 2, 3]), &Value::from(2));
        assert_eq!(result.unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_countif_numeric_text() {
        let result = count_if(&Value::from(vec!["2", "2", "x"]), &Value::from("2"));
        assert_eq!(result.unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_countif_comparison() {
        let range = Value::from(vec![1, 5, 10, 15, 20]);
        assert_eq!(
            count_if(&range, &Value::from(">5")).unwrap(),
            Value::Number(3.0)
        );
        assert_eq!(
            count_if(&range, &Value::from("<=5")).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            count_if(&range, &Value::from("<>10")).unwrap(),
            Value::Number(4.0)
        );
    }

    #[test]
    fn test_countif_empty_range() {
        let result = count_if(&Value::Array(vec![]), &Value::from("=1"));
        assert_eq!(result.unwrap(), Value::Number(0.0));
    }

    #[test]
    fn test_countif_skips_error_cells() {
        let range = Value::Array(vec![
            Value::Number(1.0),
            Value::Error(ErrorCode::Na),
            Value::Number(3.0),
        ]);
        assert_eq!(
            count_if(&range, &Value::from("<>1")).unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_countif_wildcard() {
        let range = Value::from(vec!["apple", "Apricot", "banana", "a"]);
        assert_eq!(
            count_if(&range, &Value::from("ap*")).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            count_if(&range, &Value::from("<>ap*")).unwrap(),
            Value::Number(2.0)
        );
    }

    #[test]
    fn test_countif_array_criterion() {
        let result = count_if(&Value::from(vec![1]), &Value::from(vec![1]));
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_countifs() {
        let result = count_ifs(&[
            Value::from(vec![1, 2, 3]),
            Value::from(">1"),
            Value::from(vec![5, 6, 7]),
            Value::from("<7"),
        ]);
        assert_eq!(result.unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_countifs_length_mismatch() {
        let result = count_ifs(&[
            Value::from(vec![1, 2, 3]),
            Value::from(">1"),
            Value::from(vec![5, 6]),
            Value::from("<7"),
        ]);
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_averageif() {
        let result = average_if(
            &Value::from(vec!["a", "b", "a"]),
            &Value::from("a"),
            Some(&Value::from(vec![10, 20, 40])),
        );
        assert_eq!(result.unwrap(), Value::Number(25.0));

        let result = average_if(&Value::from(vec![1, 2, 3, 4]), &Value::from(">2"), None);
        assert_eq!(result.unwrap(), Value::Number(3.5));
    }

    #[test]
    fn test_averageif_no_match_is_div0() {
        let result = average_if(&Value::from(vec![1, 2, 3]), &Value::from(">10"), None);
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Div0));

        // Matches without a numeric cell to average
        let result = average_if(&Value::from(vec!["a", "a"]), &Value::from("a"), None);
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Div0));
    }

    #[test]
    fn test_averageifs() {
        let result = average_ifs(
            &Value::from(vec![10, 20, 30, 40]),
            &[
                Value::from(vec![1, 2, 3, 4]),
                Value::from(">=2"),
                Value::from(vec!["x", "y", "x", "y"]),
                Value::from("y"),
            ],
        );
        assert_eq!(result.unwrap(), Value::Number(30.0));
    }

    #[test]
    fn test_averageifs_errors() {
        let result = average_ifs(
            &Value::from(vec![10, 20]),
            &[Value::from(vec![1, 2, 3]), Value::from(">0")],
        );
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Value));

        let result = average_ifs(
            &Value::from(vec![10, 20]),
            &[Value::from(vec![1, 2]), Value::from(">5")],
        );
        assert_eq!(result.unwrap(), Value::Error(ErrorCode::Div0));
    }

    #[test]
    fn test_registry_wrappers_check_shape() {
        assert_eq!(
            fn_countif(&[Value::from(1)]).unwrap(),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            fn_averageifs(&[]).unwrap(),
            Value::Error(ErrorCode::Value)
        );
    }
}
