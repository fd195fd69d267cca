//! The backend abstraction layer.
//!
//! A concrete backend supplies a [`QueryProtocol`] implementation; the
//! [`RtuBackend`] facade supplies everything else.

pub mod facade;
pub mod query;
pub mod readiness;

pub use facade::{BackendConfig, PushCallback, RtuBackend};
pub use query::{FromExported, QueryProtocol};
pub use readiness::ReadinessGate;
