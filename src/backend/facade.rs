//! The backend facade.
//!
//! [`RtuBackend`] composes the datapoint store, the readiness gate, the
//! diagnostics sink, and a concrete [`QueryProtocol`] into the uniform
//! read/write/introspection API an RTU front-end drives. All cross-cutting
//! correctness lives here and in the store: addressing, type consistency,
//! value domains, cause bookkeeping. The concrete backend only ever builds
//! and sends queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtu_backend::prelude::*;
//!
//! let config = BackendConfig::new(1)
//!     .datapoints(vec![
//!         RawDatapoint::new(1, 10, 11, 1),
//!         RawDatapoint::new(1, 11, 45, 3),
//!     ])
//!     .autostart(true);
//!
//! let mut backend = RtuBackend::new(config, MySimulationQuery::default()).await?;
//! let value = backend.read(&1.into(), &10.into(), 0, 0).await;
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::query::QueryProtocol;
use crate::backend::readiness::ReadinessGate;
use crate::core::address::Address;
use crate::core::data::IoValue;
use crate::core::datapoint::{PrimitiveDatapoint, RawDatapoint};
use crate::core::diag::{DiagnosticsSink, NoopSink};
use crate::core::domain::{domain_of, is_value_permitted};
use crate::core::error::Result;
use crate::store::{DatapointStore, TypeConsistency};

/// Callback invoked by a concrete backend when the model pushes a value
/// toward the RTU. Push direction only: the facade stores it but never calls
/// it on its own query path.
pub type PushCallback = Arc<dyn Fn(&Address, &Address) + Send + Sync>;

/// Construction parameters for an [`RtuBackend`].
pub struct BackendConfig {
    /// Station address (COA) of the RTU.
    pub station: Address,

    /// Datapoint rows to ingest.
    pub datapoints: Vec<RawDatapoint>,

    /// Whether the rows carry relationship fields. When false, every stored
    /// relationship is empty.
    pub relationships_included: bool,

    /// Run the backend's startup hook and block on the readiness gate before
    /// construction returns.
    pub autostart: bool,

    /// Diagnostics sink; a no-op sink when absent.
    pub sink: Option<Arc<dyn DiagnosticsSink>>,

    /// Callback for asynchronously pushed values.
    pub push_callback: Option<PushCallback>,
}

impl BackendConfig {
    /// Create a configuration for an RTU with the given station address.
    pub fn new(station: impl Into<Address>) -> Self {
        Self {
            station: station.into(),
            datapoints: Vec::new(),
            relationships_included: false,
            autostart: false,
            sink: None,
            push_callback: None,
        }
    }

    /// Set the datapoint rows.
    #[must_use]
    pub fn datapoints(mut self, datapoints: Vec<RawDatapoint>) -> Self {
        self.datapoints = datapoints;
        self
    }

    /// Declare that the rows carry relationship fields.
    #[must_use]
    pub fn relationships_included(mut self, included: bool) -> Self {
        self.relationships_included = included;
        self
    }

    /// Block on the readiness gate during construction.
    #[must_use]
    pub fn autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Inject a diagnostics sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Register the push callback.
    #[must_use]
    pub fn push_callback(mut self, callback: PushCallback) -> Self {
        self.push_callback = Some(callback);
        self
    }
}

/// A virtualised RTU backend over a concrete query protocol.
pub struct RtuBackend<Q: QueryProtocol> {
    store: DatapointStore,
    gate: ReadinessGate,
    sink: Arc<dyn DiagnosticsSink>,
    push_callback: Option<PushCallback>,
    query: Q,
}

impl<Q: QueryProtocol> RtuBackend<Q> {
    /// Ingest the datapoints and assemble the backend.
    ///
    /// Fails with [`crate::core::error::BackendError::InvalidRelationship`]
    /// if any row's relationship does not resolve under its station; no
    /// partially usable backend is produced. With `autostart` set, the
    /// query protocol's startup hook runs and construction blocks on the
    /// readiness gate before returning.
    pub async fn new(config: BackendConfig, query: Q) -> Result<Self> {
        let sink: Arc<dyn DiagnosticsSink> = config.sink.unwrap_or_else(|| Arc::new(NoopSink));
        let store = DatapointStore::ingest(
            config.station,
            config.datapoints,
            config.relationships_included,
            sink.clone(),
        )?;

        let mut backend = Self {
            store,
            gate: ReadinessGate::new(),
            sink,
            push_callback: config.push_callback,
            query,
        };

        if config.autostart {
            let gate = backend.gate.clone();
            backend.query.startup(&gate).await;
            backend.gate.await_ready(None).await;
            backend.sink.info("backend startup complete");
        }

        Ok(backend)
    }

    /// Station address of this RTU.
    pub fn station(&self) -> &Address {
        self.store.station()
    }

    /// Whether a datapoint is attached.
    pub fn has(&self, station: &Address, object: &Address) -> bool {
        self.store.contains(station, object)
    }

    /// Read the current IO of an attached datapoint.
    ///
    /// `cause` is passed through to the query; 0 asks the backend for the
    /// datapoint's default. A `type_id` inside the command range must match
    /// the stored type or the query is not sent. An out-of-domain result is
    /// still returned, with a diagnostic: domain checking is advisory on
    /// read.
    pub async fn read(
        &mut self,
        station: &Address,
        object: &Address,
        cause: u8,
        type_id: u8,
    ) -> Option<IoValue> {
        if !self.store.contains(station, object) {
            self.sink.warning(&format!(
                "tried to read IO for unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
            return None;
        }

        if !self.type_id_acceptable(station, object, type_id, "read") {
            return None;
        }

        let query = self.query.build_query(station, object, cause, None);
        let res = self.query.send_query(query).await;
        match &res {
            None => self.sink.warning(&format!(
                "reading IO for attached datapoint with (station, object, cot) ({}, {}, {}) failed",
                station, object, cause
            )),
            Some(value) if !is_value_permitted(type_id, value) => {
                // Advisory only: the value is handed to the caller anyway.
                if let Some(domain) = domain_of(type_id) {
                    self.sink.warning(&format!(
                        "read IO with invalid value {} for type id {} from datapoint ({}, {}), \
                         expecting value in {}",
                        value, type_id, station, object, domain
                    ));
                }
            }
            Some(value) => self.sink.debug(&format!(
                "read datapoint with (station, object, cot) ({}, {}, {}) -> {}",
                station, object, cause, value
            )),
        }
        res
    }

    /// Write an IO to an attached datapoint.
    ///
    /// A `cause` of 0 substitutes the cause the datapoint was initialised
    /// with. The same type gating as [`RtuBackend::read`] applies. A value
    /// outside its type's domain is flagged but the write is still
    /// attempted. Returns the transport's result unchanged, `None` on
    /// failure.
    pub async fn write(
        &mut self,
        station: &Address,
        object: &Address,
        value: IoValue,
        cause: u8,
        type_id: u8,
    ) -> Option<IoValue> {
        let Some(stored) = self.store.primitive(station, object) else {
            self.sink.warning(&format!(
                "tried to write IO for unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
            return None;
        };
        let cause = if cause == 0 { stored.cause } else { cause };

        if !self.type_id_acceptable(station, object, type_id, "write") {
            return None;
        }

        if !is_value_permitted(type_id, &value) {
            if let Some(domain) = domain_of(type_id) {
                self.sink.warning(&format!(
                    "writing invalid value {} for type id {} to datapoint ({}, {}), \
                     expecting value in {}",
                    value, type_id, station, object, domain
                ));
            }
        }

        let query = self.query.build_query(station, object, cause, Some(&value));
        let res = self.query.send_query(query).await;
        self.sink.debug(&format!(
            "wrote datapoint with (station, object, cot) ({}, {}, {}) -> {:?}",
            station, object, cause, res
        ));
        if res.is_none() {
            self.sink.warning(&format!(
                "writing IO for attached datapoint with (station, object, cot) ({}, {}, {}) failed",
                station, object, cause
            ));
        }
        res
    }

    /// Read the IO of the datapoint related to the given one.
    ///
    /// Resolves the relationship under the same station, then delegates to
    /// [`RtuBackend::read`]. `None` if the origin is absent or its
    /// relationship is empty.
    pub async fn read_related(
        &mut self,
        station: &Address,
        object: &Address,
        cause: u8,
        type_id: u8,
    ) -> Option<IoValue> {
        if !self.store.contains(station, object) {
            self.sink.warning(&format!(
                "cannot read related IO from unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
        }
        let related = self.store.related(station, object)?.primitive().clone();
        self.read(&related.station, &related.object, cause, type_id)
            .await
    }

    /// Write an IO to the datapoint related to the given one.
    pub async fn write_related(
        &mut self,
        station: &Address,
        object: &Address,
        value: IoValue,
        cause: u8,
        type_id: u8,
    ) -> Option<IoValue> {
        if !self.store.contains(station, object) {
            self.sink.warning(&format!(
                "cannot write related IO from unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
        }
        let related = self.store.related(station, object)?.primitive().clone();
        self.write(
            &related.station,
            &related.object,
            value,
            cause,
            type_id,
        )
        .await
    }

    /// Primitive projection of an attached datapoint.
    pub fn datapoint(&self, station: &Address, object: &Address) -> Option<PrimitiveDatapoint> {
        self.store.primitive(station, object)
    }

    /// Primitive projection plus the live IO.
    ///
    /// This is the one lookup that performs a transport round-trip; the read
    /// uses the datapoint's stored cause.
    pub async fn datapoint_with_value(
        &mut self,
        station: &Address,
        object: &Address,
    ) -> Option<(PrimitiveDatapoint, Option<IoValue>)> {
        let dp = self.store.primitive(station, object)?;
        let value = self.read(station, object, dp.cause, 0).await;
        Some((dp, value))
    }

    /// Primitive projection of the related datapoint.
    pub fn related_datapoint(
        &self,
        station: &Address,
        object: &Address,
    ) -> Option<PrimitiveDatapoint> {
        self.store.related(station, object).map(|dp| dp.primitive().clone())
    }

    /// Related datapoint plus its live IO.
    pub async fn related_datapoint_with_value(
        &mut self,
        station: &Address,
        object: &Address,
    ) -> Option<(PrimitiveDatapoint, Option<IoValue>)> {
        let related = self.related_datapoint(station, object)?;
        let value = self
            .read(&related.station, &related.object, related.cause, 0)
            .await;
        Some((related, value))
    }

    /// Change a datapoint's default cause of transmission. See
    /// [`DatapointStore::change_cause`] for the no-op conditions.
    pub fn change_cause_of_transmission(
        &mut self,
        station: &Address,
        object: &Address,
        new_cause: u8,
    ) {
        self.store.change_cause(station, object, new_cause);
    }

    /// All object addresses under a station (the RTU's own by default).
    pub fn object_addresses(
        &self,
        station: Option<&Address>,
    ) -> HashSet<Address> {
        self.store.object_addresses(station)
    }

    /// All (station, object) identifiers expecting periodic updates.
    pub fn periodic_ids(&self) -> HashSet<(Address, Address)> {
        self.store.periodic_ids()
    }

    /// Periodic object addresses under a station (the RTU's own by default).
    pub fn periodic_object_addresses(
        &self,
        station: Option<&Address>,
    ) -> HashSet<Address> {
        self.store.periodic_object_addresses(station)
    }

    /// All primitive datapoints expecting periodic updates.
    pub fn periodic_datapoints(&self) -> HashSet<PrimitiveDatapoint> {
        self.store.periodic_datapoints()
    }

    /// All attached primitive datapoints.
    pub fn datapoints(&self) -> &HashSet<PrimitiveDatapoint> {
        self.store.datapoints()
    }

    /// Open the readiness gate, with a "ready" diagnostic. Idempotent.
    pub fn mark_ready(&self) {
        self.gate.mark_ready();
        self.sink.info("backend ready");
    }

    /// Whether the readiness gate is open.
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Block until the backend is ready or the timeout elapses.
    pub async fn await_ready(&self, timeout: Option<Duration>) -> bool {
        self.gate.await_ready(timeout).await
    }

    /// A clone of the readiness gate, for concrete backends that complete
    /// startup from another task.
    pub fn readiness_gate(&self) -> ReadinessGate {
        self.gate.clone()
    }

    /// The registered push callback, if any. Invoked by the concrete
    /// backend when the model pushes a value toward the RTU.
    pub fn push_callback(&self) -> Option<&PushCallback> {
        self.push_callback.as_ref()
    }

    /// Invoke the push callback for one datapoint, if registered.
    pub fn notify_push(&self, station: &Address, object: &Address) {
        if let Some(callback) = &self.push_callback {
            callback(station, object);
        }
    }

    /// The underlying query protocol.
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Mutable access to the underlying query protocol.
    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    /// The datapoint store.
    pub fn store(&self) -> &DatapointStore {
        &self.store
    }

    /// Apply the command-type gate, logging on mismatch.
    fn type_id_acceptable(
        &self,
        station: &Address,
        object: &Address,
        type_id: u8,
        operation: &str,
    ) -> bool {
        match self.store.command_type_consistency(station, object, type_id) {
            TypeConsistency::Mismatch => {
                let expected = self
                    .store
                    .primitive(station, object)
                    .map(|dp| dp.type_id)
                    .unwrap_or_default();
                self.sink.warning(&format!(
                    "rejected {} query with command type id {} for datapoint ({}, {}), \
                     expecting type id {} for command queries to this datapoint",
                    operation, type_id, station, object, expected
                ));
                false
            }
            _ => true,
        }
    }
}
