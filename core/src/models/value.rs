//! SQLite cell values
//!
//! This module provides the dynamically typed cell value read back from a
//! test database, along with the lenient numeric conversions the extraction
//! pipeline relies on.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use rusqlite::types::ValueRef;
use serde::{Serialize, Deserialize};

/// Placeholder rendered for missing values in report tables
pub const MISSING_CELL: &str = "-";

/// Value of a single SQLite cell
#[derive(Clone, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,

    /// Integer (64-bit)
    Integer(i64),

    /// Floating point (64-bit)
    Real(f64),

    /// Text string
    Text(String),

    /// Binary data
    Blob(Vec<u8>),
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Integer(v) => write!(f, "Integer({})", v),
            Value::Real(v) => write!(f, "Real({})", v),
            Value::Text(v) => {
                if v.chars().count() > 20 {
                    let head: String = v.chars().take(20).collect();
                    write!(f, "Text(\"{}...\")", head)
                } else {
                    write!(f, "Text(\"{}\")", v)
                }
            }
            Value::Blob(v) => {
                if v.len() > 10 {
                    write!(f, "Blob({} bytes)", v.len())
                } else {
                    write!(f, "Blob({:?})", v)
                }
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Null => write!(f, "None"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Text(v) => write!(f, "{}", v),
            Value::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => {
                // NaN cells compare equal so tables can be compared
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl Value {
    /// Whether the cell counts as missing: NULL, NaN or blank text
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Real(v) => v.is_nan(),
            Value::Text(v) => v.trim().is_empty(),
            _ => false,
        }
    }

    /// Finite numeric value of the cell, parsing text if needed
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Value::Integer(v) => *v as f64,
            Value::Real(v) => *v,
            Value::Text(v) => v.trim().replace(',', ".").parse::<f64>().ok()?,
            Value::Null | Value::Blob(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Integer value of the cell; integral reals and text such as `564.0`
    /// are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Real(_) | Value::Text(_) => {
                if let Value::Text(t) = self {
                    if let Ok(v) = t.trim().parse::<i64>() {
                        return Some(v);
                    }
                }
                let f = self.as_f64()?;
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
            Value::Null | Value::Blob(_) => None,
        }
    }

    /// Text for a report cell; missing values render as `-`
    pub fn to_cell_text(&self) -> String {
        if self.is_blank() {
            MISSING_CELL.to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(564).to_string(), "564");
        assert_eq!(Value::Real(564.0).to_string(), "564.0");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::from("PE100").to_string(), "PE100");
    }

    #[test]
    fn test_numeric_conversion() {
        assert_eq!(Value::from("12.5").as_f64(), Some(12.5));
        assert_eq!(Value::from(" 3 ").as_f64(), Some(3.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Real(f64::NAN).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);

        assert_eq!(Value::from("564.0").as_i64(), Some(564));
        assert_eq!(Value::Real(7.0).as_i64(), Some(7));
        assert_eq!(Value::Real(7.5).as_i64(), None);
        assert_eq!(Value::from("x1").as_i64(), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Value::Null.to_cell_text(), "-");
        assert_eq!(Value::Real(f64::NAN).to_cell_text(), "-");
        assert_eq!(Value::from("  ").to_cell_text(), "-");
        assert_eq!(Value::Integer(0).to_cell_text(), "0");
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(Value::Real(f64::NAN), Value::Real(f64::NAN));
        assert_ne!(Value::Integer(1), Value::Real(1.0));
    }
}
