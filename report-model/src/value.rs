//! FILENAME: report-model/src/value.rs
//! PURPOSE: Defines the scalar values that flow through a report run.
//! CONTEXT: Field values of driving and child records, group keys, variable
//! results and expression results all share this one small enum. The engine
//! never interprets values beyond equality, ordering and numeric extraction.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// A single report value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Seconds since the Unix epoch.
    Date(i64),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Returns the numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
        }
    }

    /// Orders two values of the same type.
    /// Returns None when the types differ (Empty sorts before everything).
    /// NaN values are treated as equal to each other and greater than any number.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Empty, Value::Empty) => Some(Ordering::Equal),
            (Value::Empty, _) => Some(Ordering::Less),
            (_, Value::Empty) => Some(Ordering::Greater),
            (Value::Number(a), Value::Number(b)) => Some(compare_numbers(*a, *b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the display value as a String.
    pub fn display_value(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Date(secs) => format!("@{}", secs),
        }
    }
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Some(Ordering::Equal))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(f64::NAN), Value::Number(1.0));
    }

    #[test]
    fn test_mixed_types_are_not_comparable() {
        assert_eq!(Value::from("1").compare(&Value::from(1.0)), None);
        assert_ne!(Value::from("1"), Value::from(1.0));
    }

    #[test]
    fn test_empty_sorts_first() {
        assert_eq!(Value::Empty.compare(&Value::from("a")), Some(Ordering::Less));
        assert_eq!(Value::Date(5).compare(&Value::Empty), Some(Ordering::Greater));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(Value::from(15.0).display_value(), "15");
        assert_eq!(Value::from(2.5).display_value(), "2.5");
        assert_eq!(Value::from(true).display_value(), "TRUE");
        assert_eq!(Value::Empty.display_value(), "");
    }
}
