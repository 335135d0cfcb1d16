//! Value types shared by every operation

use crate::date::{date_to_serial, DateSystem};
use crate::error::Error;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Any cell content or intermediate result
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Calendar date stored as a serial day number
    Date(f64),

    /// Error value (#VALUE!, #N/A, etc.)
    Error(ErrorCode),

    /// Ordered sequence of values; nested arrays represent rows
    Array(Vec<Value>),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Check if the value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Flatten nested arrays into a single row-ordered sequence.
    ///
    /// A scalar flattens to a one-element sequence.
    pub fn flatten(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Value>) {
        match self {
            Value::Array(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            v => out.push(v.clone()),
        }
    }

    /// View the value as a grid of rows.
    ///
    /// An array of arrays is a table with one row per inner array; an array of scalars
    /// is a single row; a scalar is a 1x1 grid.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        match self {
            Value::Array(items)
                if !items.is_empty() && items.iter().all(|i| matches!(i, Value::Array(_))) =>
            {
                items.iter().map(Value::flatten).collect()
            }
            Value::Array(items) => vec![items.clone()],
            v => vec![vec![v.clone()]],
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Date(serial) => write!(f, "{}", serial),
            Value::Error(e) => write!(f, "{}", e),
            Value::Array(_) => {
                write!(f, "{{")?;
                for (r, row) in self.rows().iter().enumerate() {
                    if r > 0 {
                        write!(f, ";")?;
                    }
                    for (c, item) in row.iter().enumerate() {
                        if c > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", item)?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorCode> for Value {
    fn from(e: ErrorCode) -> Self {
        Value::Error(e)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date_to_serial(date, DateSystem::Excel1900))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Spreadsheet error codes
///
/// Errors are values: they are returned and propagated like any other [`Value`],
/// never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// #NULL! - Empty intersection
    Null,
    /// #DIV/0! - Division by zero or averaging nothing
    Div0,
    /// #VALUE! - Wrong type or shape of argument
    Value,
    /// #REF! - Invalid reference
    Ref,
    /// #NAME? - Unrecognized name
    Name,
    /// #NUM! - Out-of-domain numeric argument
    Num,
    /// #N/A - Lookup found nothing
    Na,
    /// #GETTING_DATA - External data is loading
    Data,
}

impl ErrorCode {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Null => "#NULL!",
            ErrorCode::Div0 => "#DIV/0!",
            ErrorCode::Value => "#VALUE!",
            ErrorCode::Ref => "#REF!",
            ErrorCode::Name => "#NAME?",
            ErrorCode::Num => "#NUM!",
            ErrorCode::Na => "#N/A",
            ErrorCode::Data => "#GETTING_DATA",
        }
    }
}

impl FromStr for ErrorCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "#NULL!" => Ok(ErrorCode::Null),
            "#DIV/0!" => Ok(ErrorCode::Div0),
            "#VALUE!" => Ok(ErrorCode::Value),
            "#REF!" => Ok(ErrorCode::Ref),
            "#NAME?" => Ok(ErrorCode::Name),
            "#NUM!" => Ok(ErrorCode::Num),
            "#N/A" => Ok(ErrorCode::Na),
            "#GETTING_DATA" => Ok(ErrorCode::Data),
            _ => Err(Error::InvalidErrorCode(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
