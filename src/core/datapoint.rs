//! Datapoint records.
//!
//! Three shapes of the same information object, depending on where it is in
//! its lifecycle:
//!
//! - [`RawDatapoint`]: the ingestion record handed to the backend at
//!   construction time. Relationship and payload are optional.
//! - [`PrimitiveDatapoint`]: the five-field identity tuple the RTU front-end
//!   works with. Hashable; lives in the store's identity set.
//! - [`ComplexDatapoint`]: identity plus the opaque model-specific payload.
//!   This is what the store actually holds.

use serde::{Deserialize, Serialize};

use crate::core::address::Address;

/// An input row for datapoint ingestion.
///
/// This is the fixed-shape replacement for loosely structured per-point
/// configuration rows: the five identity fields are always present (the
/// relationship as an `Option`), and the payload slot defaults to JSON null.
///
/// # Example
///
/// ```rust
/// use rtu_backend::core::datapoint::RawDatapoint;
///
/// let dp = RawDatapoint::new(1, 10, 45, 3)
///     .with_relationship(11)
///     .with_payload(serde_json::json!({ "breaker": "Q1" }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDatapoint {
    /// Station address (COA) the datapoint belongs to.
    pub station: Address,

    /// Object address (IOA) within the station.
    pub object: Address,

    /// ASDU type identifier. Fixed for the lifetime of the datapoint.
    pub type_id: u8,

    /// Default cause of transmission, in 1..=47.
    pub cause: u8,

    /// Optional link to a sibling object address under the same station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Address>,

    /// Opaque model-specific payload (use-case data).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl RawDatapoint {
    /// Create a raw datapoint with no relationship and no payload.
    pub fn new(
        station: impl Into<Address>,
        object: impl Into<Address>,
        type_id: u8,
        cause: u8,
    ) -> Self {
        Self {
            station: station.into(),
            object: object.into(),
            type_id,
            cause,
            relationship: None,
            payload: serde_json::Value::Null,
        }
    }

    /// Link this datapoint to a sibling object under the same station.
    #[must_use]
    pub fn with_relationship(mut self, object: impl Into<Address>) -> Self {
        self.relationship = Some(object.into());
        self
    }

    /// Attach a model-specific payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// The identity tuple of one information object attached to one RTU.
///
/// Equality and hashing cover all five fields, so changing the cause of
/// transmission produces a *different* identity. The store keeps its keyed
/// map and identity set synchronized for exactly this reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveDatapoint {
    /// Station address (COA).
    pub station: Address,

    /// Object address (IOA).
    pub object: Address,

    /// ASDU type identifier.
    pub type_id: u8,

    /// Default cause of transmission.
    pub cause: u8,

    /// Sibling link; `None` means no relationship.
    pub relationship: Option<Address>,
}

impl PrimitiveDatapoint {
    /// True if this datapoint expects periodic updates (cause 1).
    pub fn is_periodic(&self) -> bool {
        self.cause == crate::core::domain::PERIODIC_COT
    }
}

impl std::fmt::Display for PrimitiveDatapoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, type {}, cot {})",
            self.station, self.object, self.type_id, self.cause
        )
    }
}

/// A stored datapoint: identity plus the opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexDatapoint {
    /// The identity fields.
    pub primitive: PrimitiveDatapoint,

    /// Opaque model-specific payload.
    pub payload: serde_json::Value,
}

impl ComplexDatapoint {
    /// The primitive projection (identity fields only).
    pub fn primitive(&self) -> &PrimitiveDatapoint {
        &self.primitive
    }
}

impl From<RawDatapoint> for ComplexDatapoint {
    fn from(raw: RawDatapoint) -> Self {
        Self {
            primitive: PrimitiveDatapoint {
                station: raw.station,
                object: raw.object,
                type_id: raw.type_id,
                cause: raw.cause,
                relationship: raw.relationship,
            },
            payload: raw.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_builder() {
        let dp = RawDatapoint::new(1, "A", 45, 3)
            .with_relationship("B")
            .with_payload(serde_json::json!({"k": 1}));
        assert_eq!(dp.station, Address::from(1));
        assert_eq!(dp.relationship, Some(Address::from("B")));
        assert_eq!(dp.payload["k"], 1);
    }

    #[test]
    fn test_identity_includes_cause() {
        let raw = RawDatapoint::new(1, 10, 11, 1);
        let a = ComplexDatapoint::from(raw.clone()).primitive.clone();
        let mut b = a.clone();
        b.cause = 2;
        assert_ne!(a, b);
    }

    #[test]
    fn test_periodic_flag() {
        let dp = ComplexDatapoint::from(RawDatapoint::new(1, 10, 11, 1));
        assert!(dp.primitive.is_periodic());
        let dp = ComplexDatapoint::from(RawDatapoint::new(1, 10, 11, 3));
        assert!(!dp.primitive.is_periodic());
    }
}
