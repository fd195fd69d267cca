//! The query protocol seam.
//!
//! This trait is the only thing a concrete backend has to implement: how to
//! build a model-specific query and how to send it. The core never looks
//! inside a query; it only decides whether one may be issued at all.

use async_trait::async_trait;

use crate::backend::readiness::ReadinessGate;
use crate::core::address::Address;
use crate::core::data::IoValue;
use crate::core::error::Result;

/// Model-specific query construction and transport.
///
/// `build_query` with `value = None` denotes a read; any value denotes a
/// write of that value. A `cause` of 0 asks the backend to use the cause the
/// datapoint was initialised with. Behavior for a (station, object) that is
/// not attached is the backend's responsibility; the facade never builds a
/// query for one.
///
/// `send_query` may block or suspend for arbitrarily long and may fail;
/// `None` signals "no answer". The core applies no retry or timeout of its
/// own, and an in-flight query cannot be cancelled from here.
#[async_trait]
pub trait QueryProtocol: Send + Sync {
    /// The model-specific query representation.
    type Query: Send;

    /// Construct a query against one information object.
    fn build_query(
        &self,
        station: &Address,
        object: &Address,
        cause: u8,
        value: Option<&IoValue>,
    ) -> Self::Query;

    /// Perform the query against the model or transport.
    ///
    /// For reads the returned value is the IO; for writes it is a
    /// backend-defined success indicator (conventionally `IoValue::Bool`).
    async fn send_query(&mut self, query: Self::Query) -> Option<IoValue>;

    /// Model-specific startup work, finished by opening the gate.
    ///
    /// Backends that spawn simulations or wait for peers override this and
    /// call [`ReadinessGate::mark_ready`] once the model can be driven. The
    /// default has nothing to wait for and opens the gate immediately.
    async fn startup(&mut self, gate: &ReadinessGate) {
        gate.mark_ready();
    }
}

/// Rebuild a backend from previously exported state.
///
/// The export format is backend-defined; the core fixes only the shape of
/// the hook. Implementing this is optional.
pub trait FromExported: Sized {
    /// The backend-specific export representation.
    type Export;

    /// Reconstruct the backend from an export.
    fn from_exported(export: Self::Export) -> Result<Self>;
}
