//! Value domains per ASDU type identifier.
//!
//! A static allowlist: type identifiers with a known value domain constrain
//! the values that may be read from or written to a datapoint of that type.
//! Type identifiers absent from the table permit any value. Domain checks
//! are advisory throughout the crate: violations are logged, never blocked.

use std::collections::HashMap;
use std::ops::{Range, RangeInclusive};

use once_cell::sync::Lazy;

use crate::core::data::IoValue;

/// Cause of transmission denoting periodic/cyclic reporting.
pub const PERIODIC_COT: u8 = 1;

/// Valid causes of transmission.
pub const COT_RANGE: RangeInclusive<u8> = 1..=47;

/// Type identifiers with control-direction process-information semantics.
///
/// Reads and writes addressing a datapoint with a type identifier in this
/// range must use the exact type identifier the datapoint was declared with.
pub const COMMAND_TYPE_IDS: Range<u8> = 45..69;

/// The set or range of values permitted for a type identifier.
#[derive(Debug, Clone)]
pub enum ValueDomain {
    /// A small enumerated set of permitted values.
    Set(&'static [i64]),

    /// A contiguous integer range of permitted values.
    Range(RangeInclusive<i64>),
}

impl ValueDomain {
    /// Membership test.
    pub fn permits(&self, value: i64) -> bool {
        match self {
            Self::Set(values) => values.contains(&value),
            Self::Range(range) => range.contains(&value),
        }
    }
}

impl std::fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Set(values) => write!(f, "{:?}", values),
            Self::Range(range) => write!(f, "[{}, {}]", range.start(), range.end()),
        }
    }
}

const SINGLE_STATE: &[i64] = &[0, 1];
const DOUBLE_STATE: &[i64] = &[0, 1, 2, 3];
const SCALED_RANGE: RangeInclusive<i64> = -32768..=3277;

/// Process-wide table: ASDU type identifier to permitted values.
///
/// Single-point types map to {0, 1}, double-point/step types to {0..3}, and
/// scaled analog types to a signed 16-bit-style range.
pub static VALUE_DOMAINS: Lazy<HashMap<u8, ValueDomain>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for type_id in [1u8, 2, 30, 45, 58] {
        table.insert(type_id, ValueDomain::Set(SINGLE_STATE));
    }
    for type_id in [3u8, 4, 31, 46, 59] {
        table.insert(type_id, ValueDomain::Set(DOUBLE_STATE));
    }
    for type_id in [11u8, 12, 49, 62] {
        table.insert(type_id, ValueDomain::Range(SCALED_RANGE));
    }
    table
});

/// Check a value against the domain of a type identifier.
///
/// Type identifiers without a table entry (including the wildcard 0) permit
/// any value. For known type identifiers the value must have an integer form
/// inside the domain.
pub fn is_value_permitted(type_id: u8, value: &IoValue) -> bool {
    match VALUE_DOMAINS.get(&type_id) {
        None => true,
        Some(domain) => value.as_i64().is_some_and(|v| domain.permits(v)),
    }
}

/// The domain for a type identifier, if one is known.
pub fn domain_of(type_id: u8) -> Option<&'static ValueDomain> {
    VALUE_DOMAINS.get(&type_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_state_domain() {
        assert!(is_value_permitted(1, &IoValue::from(0)));
        assert!(is_value_permitted(1, &IoValue::from(1)));
        assert!(!is_value_permitted(1, &IoValue::from(5)));
        assert!(is_value_permitted(1, &IoValue::from(true)));
    }

    #[test]
    fn test_double_state_domain() {
        assert!(is_value_permitted(46, &IoValue::from(3)));
        assert!(!is_value_permitted(46, &IoValue::from(4)));
    }

    #[test]
    fn test_scaled_domain() {
        assert!(is_value_permitted(11, &IoValue::from(-32768)));
        assert!(is_value_permitted(11, &IoValue::from(3277)));
        assert!(!is_value_permitted(11, &IoValue::from(3278)));
    }

    #[test]
    fn test_unknown_type_permits_anything() {
        assert!(is_value_permitted(0, &IoValue::from(123456)));
        assert!(is_value_permitted(200, &IoValue::from("any")));
    }

    #[test]
    fn test_non_integer_value_against_known_domain() {
        assert!(!is_value_permitted(1, &IoValue::from("on")));
        assert!(!is_value_permitted(11, &IoValue::from(1.5)));
    }

    #[test]
    fn test_command_type_ids_bounds() {
        assert!(!COMMAND_TYPE_IDS.contains(&44));
        assert!(COMMAND_TYPE_IDS.contains(&45));
        assert!(COMMAND_TYPE_IDS.contains(&68));
        assert!(!COMMAND_TYPE_IDS.contains(&69));
    }
}
