//! Station and object addressing.
//!
//! Telecontrol addressing in the IEC 60870-5-104 tradition: a *station
//! address* (common address of ASDU) scopes a set of *object addresses*
//! (information object addresses). Deployments mix numeric and symbolic
//! addresses, so both forms are first-class here.

use serde::{Deserialize, Serialize};

/// A station or object address.
///
/// Addresses are either numeric (the usual wire form) or textual (symbolic
/// names used by simulation models). The two forms never compare equal:
/// `Numeric(1)` and `Text("1")` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    /// Numeric address (COA/IOA as transmitted on the wire).
    Numeric(i64),

    /// Symbolic address (model-side identifier).
    Text(String),
}

impl Address {
    /// Create a numeric address.
    pub fn numeric(value: i64) -> Self {
        Self::Numeric(value)
    }

    /// Create a textual address.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Get the numeric form, if this is a numeric address.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Address {
    fn from(v: i64) -> Self {
        Self::Numeric(v)
    }
}

impl From<i32> for Address {
    fn from(v: i32) -> Self {
        Self::Numeric(v as i64)
    }
}

impl From<u16> for Address {
    fn from(v: u16) -> Self {
        Self::Numeric(v as i64)
    }
}

impl From<u32> for Address {
    fn from(v: u32) -> Self {
        Self::Numeric(v as i64)
    }
}

impl From<&str> for Address {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Address {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_are_distinct() {
        assert_ne!(Address::from(1), Address::from("1"));
        assert_eq!(Address::from(7), Address::numeric(7));
        assert_eq!(Address::from("A"), Address::text("A"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::from(42).to_string(), "42");
        assert_eq!(Address::from("pump_1").to_string(), "pump_1");
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Address::from(42).as_i64(), Some(42));
        assert_eq!(Address::from("x").as_i64(), None);
    }
}
