use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single table cell: number, string, boolean or missing.
///
/// Serializes untagged, so a JSON record `{"age": 31, "city": null}`
/// maps directly onto `Number` and `Null` cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Build a numeric cell. `NaN` is stored as a missing value.
    pub fn number(v: f64) -> Self {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Number(v)
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Hashable, totally ordered key for this cell.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Number(v) => ValueKey::Number(NumberKey::new(*v)),
            Value::Text(s) => ValueKey::Text(s.clone()),
        }
    }

    /// Render the cell the way it appears in one-hot feature names and
    /// schema samples. Integral numbers drop the fractional part and
    /// booleans render as `True`/`False`.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Number(v) => render_number(*v),
            Value::Text(s) => s.clone(),
        }
    }
}

fn render_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Bit pattern of a non-NaN float with `-0.0` folded onto `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberKey(u64);

impl NumberKey {
    pub fn new(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        NumberKey(v.to_bits())
    }

    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().total_cmp(&other.get())
    }
}

/// Equality/ordering key for cells: missing < booleans < numbers < text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Number(NumberKey),
    Text(String),
}

impl ValueKey {
    pub fn to_value(&self) -> Value {
        match self {
            ValueKey::Null => Value::Null,
            ValueKey::Bool(b) => Value::Bool(*b),
            ValueKey::Number(n) => Value::Number(n.get()),
            ValueKey::Text(s) => Value::Text(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_null() {
        assert!(Value::number(f64::NAN).is_null());
        assert_eq!(Value::from(2.5), Value::Number(2.5));
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Number(3.0).render(), "3");
        assert_eq!(Value::Number(2.5).render(), "2.5");
        assert_eq!(Value::Bool(true).render(), "True");
        assert_eq!(Value::text("red").render(), "red");
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            Value::text("b").key(),
            Value::Number(2.0).key(),
            Value::Number(-1.0).key(),
            Value::text("a").key(),
        ];
        keys.sort();
        let values: Vec<Value> = keys.iter().map(|k| k.to_value()).collect();
        assert_eq!(
            values,
            vec![Value::Number(-1.0), Value::Number(2.0), Value::text("a"), Value::text("b")]
        );
        assert_eq!(Value::Number(0.0).key(), Value::Number(-0.0).key());
    }

    #[test]
    fn test_untagged_json() {
        let cells: Vec<Value> = serde_json::from_str(r#"[1.5, "x", true, null]"#).unwrap();
        assert_eq!(
            cells,
            vec![Value::Number(1.5), Value::text("x"), Value::Bool(true), Value::Null]
        );
    }
}
