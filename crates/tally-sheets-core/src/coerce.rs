//! Type coercion
//!
//! The four conversions here are the only place raw values are turned into numbers,
//! booleans, dates or text. Every one is total: it returns the converted value or the
//! [`ErrorCode`] a spreadsheet would show. An error operand is returned unchanged.
//!
//! | input            | number      | boolean        | date            | text          |
//! |------------------|-------------|----------------|-----------------|---------------|
//! | empty            | 0           | #VALUE!        | #VALUE!         | ""            |
//! | FALSE / TRUE     | 0 / 1       | itself         | #VALUE!         | FALSE / TRUE  |
//! | number           | itself      | n != 0         | serial → date   | its digits    |
//! | numeric text     | parsed      | #VALUE!        | serial → date   | itself        |
//! | TRUE/FALSE text  | #VALUE!     | parsed         | #VALUE!         | itself        |
//! | date text        | #VALUE!     | #VALUE!        | parsed          | itself        |
//! | date             | serial      | TRUE           | itself          | #VALUE!       |
//! | array            | #VALUE!     | #VALUE!        | #VALUE!         | #VALUE!       |

use crate::date::{serial_to_date, DateSystem};
use crate::value::{ErrorCode, Value};
use chrono::{NaiveDate, NaiveDateTime};

/// Text date layouts accepted by [`to_date`], tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse text that looks like a number.
///
/// Surrounding whitespace is ignored; `inf` and `NaN` spellings are not numbers.
pub fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce to a number
pub fn to_number(value: &Value) -> Result<f64, ErrorCode> {
    match value {
        Value::Error(e) => Err(*e),
        Value::Empty => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) | Value::Date(n) => Ok(*n),
        Value::Text(s) => parse_numeric_text(s).ok_or(ErrorCode::Value),
        Value::Array(_) => Err(ErrorCode::Value),
    }
}

/// Coerce to a boolean
pub fn to_boolean(value: &Value) -> Result<bool, ErrorCode> {
    match value {
        Value::Error(e) => Err(*e),
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(*n != 0.0),
        Value::Text(s) => {
            if s.eq_ignore_ascii_case("TRUE") {
                Ok(true)
            } else if s.eq_ignore_ascii_case("FALSE") {
                Ok(false)
            } else {
                Err(ErrorCode::Value)
            }
        }
        Value::Date(serial) => serial_to_date(*serial, DateSystem::Excel1900)
            .map(|_| true)
            .map_err(|_| ErrorCode::Value),
        Value::Empty | Value::Array(_) => Err(ErrorCode::Value),
    }
}

/// Coerce to a calendar date in the 1900 date system
pub fn to_date(value: &Value) -> Result<NaiveDate, ErrorCode> {
    to_date_in(value, DateSystem::Excel1900)
}

/// Coerce to a calendar date, reading serial numbers in the given date system
pub fn to_date_in(value: &Value, system: DateSystem) -> Result<NaiveDate, ErrorCode> {
    match value {
        Value::Error(e) => Err(*e),
        Value::Number(n) | Value::Date(n) => serial_date(*n, system),
        Value::Text(s) => match parse_numeric_text(s) {
            Some(n) => serial_date(n, system),
            None => parse_date_text(s).ok_or(ErrorCode::Value),
        },
        Value::Empty | Value::Boolean(_) | Value::Array(_) => Err(ErrorCode::Value),
    }
}

fn serial_date(serial: f64, system: DateSystem) -> Result<NaiveDate, ErrorCode> {
    if serial < 0.0 {
        return Err(ErrorCode::Num);
    }
    serial_to_date(serial, system).map_err(|_| ErrorCode::Num)
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Coerce to text
pub fn to_text(value: &Value) -> Result<String, ErrorCode> {
    match value {
        Value::Error(e) => Err(*e),
        Value::Empty => Ok(String::new()),
        Value::Number(n) => Ok(format_number(*n)),
        Value::Boolean(true) => Ok("TRUE".to_string()),
        Value::Boolean(false) => Ok("FALSE".to_string()),
        Value::Text(s) => Ok(s.clone()),
        Value::Date(_) | Value::Array(_) => Err(ErrorCode::Value),
    }
}

/// Format a number the way a cell shows it in General format: integral values have no
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
