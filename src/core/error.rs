//! Error types.
//!
//! Almost every failure in this crate is recoverable and resolves locally to
//! an absent result plus a diagnostic. The one hard failure is a dangling
//! datapoint relationship discovered at construction time: the store must not
//! come up partially valid, because relationship resolution downstream
//! assumes the invariant unconditionally.

use thiserror::Error;

use crate::core::address::Address;

/// Errors raised by the RTU backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A datapoint's relationship references an object address that does not
    /// exist under the same station. Raised during ingestion only; the
    /// backend is not constructed.
    #[error(
        "datapoint ({station}, {object}) has invalid relationship {relationship}: \
         no datapoint with that object address under station {station}"
    )]
    InvalidRelationship {
        /// Station address of the offending datapoint.
        station: Address,
        /// Object address of the offending datapoint.
        object: Address,
        /// The unresolvable relationship target.
        relationship: Address,
    },
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_addresses() {
        let err = BackendError::InvalidRelationship {
            station: Address::from(1),
            object: Address::from("B"),
            relationship: Address::from("missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("B"));
        assert!(msg.contains("missing"));
    }
}
