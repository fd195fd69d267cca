//! Information object values.
//!
//! `IoValue` is the protocol-agnostic representation of a value travelling
//! between the facade and a concrete transport. Reads return one, writes
//! carry one, and write acknowledgements are conventionally `Bool`.

use serde::{Deserialize, Serialize};

/// A value read from or written to an information object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IoValue {
    /// Integer value (single/double point states, scaled values, setpoints).
    Integer(i64),

    /// Floating-point value (short measured values).
    Float(f64),

    /// Boolean value (command acknowledgements, single point states).
    Bool(bool),

    /// Textual value (model-specific payloads).
    Text(String),
}

impl IoValue {
    /// Try to get the value as i64.
    ///
    /// Booleans map to 0/1; floats are accepted only when integral, so the
    /// domain check never silently truncates.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::Float(_) => None,
            Self::Bool(v) => Some(if *v { 1 } else { 0 }),
            Self::Text(_) => None,
        }
    }

    /// Try to get the value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }

    /// Try to get the value as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Integer(v) => Some(*v != 0),
            Self::Float(v) => Some(*v != 0.0),
            Self::Text(_) => None,
        }
    }

    /// Try to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for IoValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for IoValue {
    fn from(v: i32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<i16> for IoValue {
    fn from(v: i16) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<u32> for IoValue {
    fn from(v: u32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<f64> for IoValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for IoValue {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<bool> for IoValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for IoValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for IoValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl std::fmt::Display for IoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        let v = IoValue::from(42);
        assert_eq!(v.as_i64(), Some(42));
        assert_eq!(v.as_f64(), Some(42.0));

        let v = IoValue::from(true);
        assert_eq!(v.as_bool(), Some(true));
        assert_eq!(v.as_i64(), Some(1));
    }

    #[test]
    fn test_fractional_float_has_no_integer_form() {
        assert_eq!(IoValue::from(2.5).as_i64(), None);
        assert_eq!(IoValue::from(2.0).as_i64(), Some(2));
    }

    #[test]
    fn test_text_value() {
        let v = IoValue::from("open");
        assert_eq!(v.as_str(), Some("open"));
        assert_eq!(v.as_i64(), None);
    }
}
