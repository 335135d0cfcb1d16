//! Lookup functions

use crate::error::FormulaResult;
use crate::evaluator::{compare_values, values_equal};
use crate::wildcard::WildcardPattern;
use std::cmp::Ordering;
use tally_sheets_core::coerce::{to_boolean, to_number};
use tally_sheets_core::{ErrorCode, Value};

/// Broad kind of a value. MATCH only considers elements of the lookup value's kind.
#[derive(Debug, PartialEq, Eq)]
enum Kind {
    Number,
    Text,
    Boolean,
    Other,
}

fn kind(v: &Value) -> Kind {
    match v {
        Value::Number(_) | Value::Date(_) => Kind::Number,
        Value::Text(_) => Kind::Text,
        Value::Boolean(_) => Kind::Boolean,
        _ => Kind::Other,
    }
}

/// Position (0-based) of `lookup` in `items` for a normalised match type.
///
/// - `1`: largest element <= lookup, assuming ascending order
/// - `0`: first equal element; text lookups may use wildcards
/// - `-1`: smallest element >= lookup, assuming descending order
fn match_position(lookup: &Value, items: &[Value], match_type: i32) -> Option<usize> {
    let pattern = match (match_type, lookup) {
        (0, Value::Text(s)) => WildcardPattern::new(s)
            .map_err(|e| tracing::debug!(pattern = %s, error = %e, "MATCH pattern rejected"))
            .ok(),
        _ => None,
    };

    let lookup_kind = kind(lookup);
    let mut result = None;
    for (i, item) in items.iter().enumerate() {
        if kind(item) != lookup_kind {
            continue;
        }
        if values_equal(item, lookup) {
            return Some(i);
        }
        match match_type {
            1 => {
                if compare_values(item, lookup) == Some(Ordering::Less) {
                    result = Some(i);
                } else {
                    break;
                }
            }
            -1 => {
                if compare_values(item, lookup) == Some(Ordering::Greater) {
                    result = Some(i);
                } else {
                    break;
                }
            }
            _ => {
                if let (Some(pattern), Value::Text(s)) = (&pattern, item) {
                    if pattern.is_match(s) {
                        return Some(i);
                    }
                }
            }
        }
    }
    result
}

/// Read MATCH's match_type: absent means 1, non-numeric is `#REF!`, values outside
/// [-1, 1] clamp, anything else that is not -1, 0 or 1 is `#N/A`.
fn normalise_match_type(match_type: Option<&Value>) -> Result<i32, ErrorCode> {
    let n = match match_type {
        None | Some(Value::Empty) => return Ok(1),
        Some(v) => to_number(v).map_err(|_| ErrorCode::Ref)?,
    };
    let n = n.clamp(-1.0, 1.0);
    if n == 1.0 {
        Ok(1)
    } else if n == 0.0 {
        Ok(0)
    } else if n == -1.0 {
        Ok(-1)
    } else {
        Err(ErrorCode::Na)
    }
}

/// MATCH(lookup_value, lookup_array, [match_type]) - 1-based position of a value in a
/// one-dimensional range
pub fn match_value(lookup: &Value, lookup_array: &Value, match_type: Option<&Value>) -> Value {
    if let Some(e) = lookup.error().or_else(|| lookup_array.error()) {
        return Value::Error(e);
    }
    if matches!(lookup, Value::Array(_)) {
        return Value::Error(ErrorCode::Value);
    }

    let rows = lookup_array.rows();
    let cols = rows.first().map_or(0, Vec::len);
    if rows.len() > 1 && cols > 1 {
        return Value::Error(ErrorCode::Na);
    }
    let items = lookup_array.flatten();

    let match_type = match normalise_match_type(match_type) {
        Ok(t) => t,
        Err(e) => return Value::Error(e),
    };

    match match_position(lookup, &items, match_type) {
        Some(i) => Value::Number((i + 1) as f64),
        None => Value::Error(ErrorCode::Na),
    }
}

/// Shared argument handling for VLOOKUP/HLOOKUP: returns the validated 0-based index and
/// the match type implied by `range_lookup`.
fn lookup_args(
    lookup: &Value,
    table: &Value,
    index: &Value,
    range_lookup: Option<&Value>,
    extent: usize,
) -> Result<(usize, i32), ErrorCode> {
    if let Some(e) = lookup.error().or_else(|| table.error()) {
        return Err(e);
    }
    if !matches!(table, Value::Array(_)) {
        return Err(ErrorCode::Na);
    }

    let index = to_number(index)?.trunc();
    if index.is_nan() || index < 1.0 {
        return Err(ErrorCode::Value);
    }
    if index > extent as f64 {
        return Err(ErrorCode::Ref);
    }

    let approximate = match range_lookup {
        None | Some(Value::Empty) => true,
        Some(v) => to_boolean(v)?,
    };
    Ok((index as usize - 1, if approximate { 1 } else { 0 }))
}

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
///
/// Finds `lookup_value` in the first column and returns the cell `col_index_num` columns
/// across. `range_lookup` defaults to TRUE (approximate match over an ascending column).
pub fn vlookup(
    lookup: &Value,
    table: &Value,
    col_index: &Value,
    range_lookup: Option<&Value>,
) -> Value {
    let rows = table.rows();
    let cols = rows.first().map_or(0, Vec::len);
    let (col, match_type) = match lookup_args(lookup, table, col_index, range_lookup, cols) {
        Ok(args) => args,
        Err(e) => return Value::Error(e),
    };

    let keys: Vec<Value> = rows
        .iter()
        .map(|row| row.first().cloned().unwrap_or_default())
        .collect();
    match match_position(lookup, &keys, match_type) {
        Some(row) => rows[row].get(col).cloned().unwrap_or_default(),
        None => Value::Error(ErrorCode::Na),
    }
}

/// HLOOKUP(lookup_value, table_array, row_index_num, [range_lookup])
///
/// Finds `lookup_value` in the first row and returns the cell `row_index_num` rows down.
pub fn hlookup(
    lookup: &Value,
    table: &Value,
    row_index: &Value,
    range_lookup: Option<&Value>,
) -> Value {
    let rows = table.rows();
    let (row, match_type) = match lookup_args(lookup, table, row_index, range_lookup, rows.len())
    {
        Ok(args) => args,
        Err(e) => return Value::Error(e),
    };

    let keys = rows.first().cloned().unwrap_or_default();
    match match_position(lookup, &keys, match_type) {
        Some(col) => rows[row].get(col).cloned().unwrap_or_default(),
        None => Value::Error(ErrorCode::Na),
    }
}

pub fn fn_match(args: &[Value]) -> FormulaResult<Value> {
    Ok(match args {
        [lookup, array] => match_value(lookup, array, None),
        [lookup, array, match_type] => match_value(lookup, array, Some(match_type)),
        _ => Value::Error(ErrorCode::Value),
    })
}

pub fn fn_vlookup(args: &[Value]) -> FormulaResult<Value> {
    Ok(match args {
        [lookup, table, col] => vlookup(lookup, table, col, None),
        [lookup, table, col, range_lookup] => vlookup(lookup, table, col, Some(range_lookup)),
        _ => Value::Error(ErrorCode::Value),
    })
}

pub fn fn_hlookup(args: &[Value]) -> FormulaResult<Value> {
    Ok(match args {
        [lookup, table, row] => hlookup(lookup, table, row, None),
        [lookup, table, row, range_lookup] => hlookup(lookup, table, row, Some(range_lookup)),
        _ => Value::Error(ErrorCode::Value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn table() -> Value {
        Value::Array(vec![
            Value::Array(vec![n(1.0), Value::from("one"), n(10.0)]),
            Value::Array(vec![n(2.0), Value::from("two"), n(20.0)]),
            Value::Array(vec![n(4.0), Value::from("four"), n(40.0)]),
        ])
    }

    #[test]
    fn test_match_wildcards() {
        let fruits = Value::from(vec!["apple", "banana"]);
        assert_eq!(match_value(&Value::from("a*"), &fruits, Some(&n(0.0))), n(1.0));
        assert_eq!(match_value(&Value::from("*n*"), &fruits, Some(&n(0.0))), n(2.0));

        let words = Value::from(vec!["apple", "ale"]);
        assert_eq!(match_value(&Value::from("a?ple"), &words, Some(&n(0.0))), n(1.0));
        assert_eq!(
            match_value(&Value::from("b?"), &words, Some(&n(0.0))),
            Value::Error(ErrorCode::Na)
        );
    }

    #[test]
    fn test_match_exact() {
        let arr = Value::from(vec![10, 20, 30]);
        assert_eq!(match_value(&n(20.0), &arr, Some(&n(0.0))), n(2.0));
        assert_eq!(
            match_value(&n(25.0), &arr, Some(&n(0.0))),
            Value::Error(ErrorCode::Na)
        );
        assert_eq!(
            match_value(&Value::from("APPLE"), &Value::from(vec!["apple"]), Some(&n(0.0))),
            n(1.0)
        );
    }

    #[test]
    fn test_match_ascending() {
        let arr = Value::from(vec![10, 20, 30, 40]);
        assert_eq!(match_value(&n(25.0), &arr, None), n(2.0));
        assert_eq!(match_value(&n(30.0), &arr, Some(&n(1.0))), n(3.0));
        assert_eq!(match_value(&n(99.0), &arr, None), n(4.0));
        assert_eq!(match_value(&n(5.0), &arr, None), Value::Error(ErrorCode::Na));
    }

    #[test]
    fn test_match_descending() {
        let arr = Value::from(vec![40, 30, 20, 10]);
        assert_eq!(match_value(&n(25.0), &arr, Some(&n(-1.0))), n(2.0));
        assert_eq!(match_value(&n(20.0), &arr, Some(&n(-1.0))), n(3.0));
        assert_eq!(
            match_value(&n(50.0), &arr, Some(&n(-1.0))),
            Value::Error(ErrorCode::Na)
        );
    }

    #[test]
    fn test_match_skips_other_kinds() {
        let arr = Value::Array(vec![Value::from("x"), n(5.0), Value::Boolean(true), n(7.0)]);
        assert_eq!(match_value(&n(7.0), &arr, Some(&n(0.0))), n(4.0));
        assert_eq!(match_value(&n(6.0), &arr, None), n(2.0));
    }

    #[test]
    fn test_match_type_normalisation() {
        let arr = Value::from(vec![10, 20, 30]);
        assert_eq!(match_value(&n(25.0), &arr, Some(&n(5.0))), n(2.0));
        assert_eq!(match_value(&n(25.0), &arr, Some(&n(-7.0))), Value::Error(ErrorCode::Na));
        assert_eq!(
            match_value(&n(20.0), &arr, Some(&n(0.5))),
            Value::Error(ErrorCode::Na)
        );
        assert_eq!(
            match_value(&n(20.0), &arr, Some(&Value::from("exact"))),
            Value::Error(ErrorCode::Ref)
        );
    }

    #[test]
    fn test_match_shapes() {
        let column = Value::Array(vec![
            Value::Array(vec![n(1.0)]),
            Value::Array(vec![n(2.0)]),
        ]);
        assert_eq!(match_value(&n(2.0), &column, Some(&n(0.0))), n(2.0));
        assert_eq!(
            match_value(&n(2.0), &table(), Some(&n(0.0))),
            Value::Error(ErrorCode::Na)
        );
        assert_eq!(match_value(&n(3.0), &n(3.0), Some(&n(0.0))), n(1.0));
    }

    #[test]
    fn test_match_errors() {
        let arr = Value::from(vec![1, 2]);
        assert_eq!(
            match_value(&Value::Error(ErrorCode::Div0), &arr, None),
            Value::Error(ErrorCode::Div0)
        );
        assert_eq!(
            match_value(&n(1.0), &Value::Error(ErrorCode::Ref), None),
            Value::Error(ErrorCode::Ref)
        );
        assert_eq!(match_value(&arr, &arr, None), Value::Error(ErrorCode::Value));
    }

    #[test]
    fn test_vlookup() {
        let exact = Value::Boolean(false);
        assert_eq!(vlookup(&n(2.0), &table(), &n(2.0), Some(&exact)), Value::from("two"));
        assert_eq!(vlookup(&n(4.0), &table(), &n(3.0), Some(&exact)), n(40.0));
        assert_eq!(
            vlookup(&n(3.0), &table(), &n(2.0), Some(&exact)),
            Value::Error(ErrorCode::Na)
        );
        // Approximate by default
        assert_eq!(vlookup(&n(3.0), &table(), &n(2.0), None), Value::from("two"));
        assert_eq!(
            vlookup(&n(0.5), &table(), &n(2.0), None),
            Value::Error(ErrorCode::Na)
        );
    }

    #[test]
    fn test_vlookup_index_bounds() {
        assert_eq!(
            vlookup(&n(1.0), &table(), &n(0.0), None),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            vlookup(&n(1.0), &table(), &n(4.0), None),
            Value::Error(ErrorCode::Ref)
        );
        assert_eq!(
            vlookup(&n(1.0), &table(), &n(f64::NAN), None),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            vlookup(&n(1.0), &n(1.0), &n(1.0), None),
            Value::Error(ErrorCode::Na)
        );
        assert_eq!(
            vlookup(&n(1.0), &table(), &n(1.0), Some(&Value::from("maybe"))),
            Value::Error(ErrorCode::Value)
        );
    }

    #[test]
    fn test_hlookup() {
        let exact = Value::Boolean(false);
        assert_eq!(hlookup(&n(1.0), &table(), &n(2.0), Some(&exact)), n(2.0));
        assert_eq!(
            hlookup(&Value::from("one"), &table(), &n(3.0), Some(&exact)),
            Value::from("four")
        );
        assert_eq!(
            hlookup(&n(1.0), &table(), &n(4.0), None),
            Value::Error(ErrorCode::Ref)
        );
        assert_eq!(
            hlookup(&n(1.0), &table(), &n(f64::NAN), None),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            hlookup(&Value::from("two"), &table(), &n(1.0), Some(&exact)),
            Value::Error(ErrorCode::Na)
        );
    }
}
