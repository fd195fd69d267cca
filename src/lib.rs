//! # rtu-backend
//!
//! Backend abstraction for virtualised Remote Terminal Units, giving
//! heterogeneous model-specific transports a uniform datapoint interface
//! with telecontrol-style addressing (station address, information object
//! address, ASDU type identifier, cause of transmission).
//!
//! ## Features
//!
//! - **One seam**: a concrete backend implements exactly two capabilities,
//!   build a query and send it ([`QueryProtocol`])
//! - **Canonical datapoint store**: uniqueness, relationship integrity,
//!   value domains, and cause bookkeeping enforced in one place
//! - **Advisory validation**: out-of-domain values are flagged, never
//!   blocked, so raw model values can be forwarded unfiltered
//! - **One-shot readiness gate**: callers block in one place until
//!   model-specific startup has completed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rtu_backend::prelude::*;
//!
//! struct SimQuery { /* handle to the simulation model */ }
//!
//! #[async_trait::async_trait]
//! impl QueryProtocol for SimQuery {
//!     type Query = SimRequest;
//!
//!     fn build_query(&self, station: &Address, object: &Address,
//!                    cause: u8, value: Option<&IoValue>) -> SimRequest {
//!         /* translate to the model's request shape */
//!     }
//!
//!     async fn send_query(&mut self, query: SimRequest) -> Option<IoValue> {
//!         /* drive the model */
//!     }
//! }
//!
//! let config = BackendConfig::new(1)
//!     .datapoints(vec![RawDatapoint::new(1, 10, 11, 1)])
//!     .autostart(true);
//! let mut backend = RtuBackend::new(config, SimQuery::new()).await?;
//!
//! let value = backend.read(&1.into(), &10.into(), 0, 0).await;
//! ```
//!
//! ## What this crate is not
//!
//! No wire protocol is implemented here, nothing is persisted across
//! restarts, and the datapoint store is deliberately single-writer: it is
//! populated once at construction and mutated only through
//! [`RtuBackend::change_cause_of_transmission`], which an embedding must
//! serialize against concurrent reads.

pub mod backend;
pub mod core;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{
        BackendConfig, FromExported, PushCallback, QueryProtocol, ReadinessGate, RtuBackend,
    };
    pub use crate::core::{
        address::Address,
        data::IoValue,
        datapoint::{ComplexDatapoint, PrimitiveDatapoint, RawDatapoint},
        diag::{DiagnosticsSink, NoopSink, TracingSink},
        error::{BackendError, Result},
    };
    pub use crate::store::{DatapointStore, TypeConsistency};
}

// Re-export core types at crate root for convenience
pub use crate::backend::{BackendConfig, QueryProtocol, ReadinessGate, RtuBackend};
pub use crate::core::address::Address;
pub use crate::core::data::IoValue;
pub use crate::core::datapoint::{ComplexDatapoint, PrimitiveDatapoint, RawDatapoint};
pub use crate::core::error::{BackendError, Result};
pub use crate::store::{DatapointStore, TypeConsistency};
