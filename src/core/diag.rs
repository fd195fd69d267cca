//! Diagnostics sink.
//!
//! The backend reports everything noteworthy through an injected
//! [`DiagnosticsSink`]. A no-op sink is substituted when none is supplied,
//! so call sites never branch on whether diagnostics are enabled. Sinks are
//! fire-and-forget and must never influence control flow.
//!
//! # Example
//!
//! ```rust
//! use rtu_backend::core::diag::{DiagnosticsSink, TracingSink};
//! use std::sync::Arc;
//!
//! let sink: Arc<dyn DiagnosticsSink> = Arc::new(TracingSink);
//! sink.info("backend ready");
//! ```

use std::sync::{Arc, Mutex};

/// A destination for backend diagnostics.
///
/// Severity levels mirror the usual logging hierarchy; `critical` is
/// reserved for conditions that abort construction.
pub trait DiagnosticsSink: Send + Sync {
    /// Low-level trace of queries and results.
    fn debug(&self, msg: &str);

    /// Lifecycle information (startup, readiness).
    fn info(&self, msg: &str);

    /// Recoverable problems: unattached datapoints, type mismatches,
    /// out-of-domain values, transport failures.
    fn warning(&self, msg: &str);

    /// Errors that did not abort the operation.
    fn error(&self, msg: &str);

    /// Fatal conditions; emitted just before construction aborts.
    fn critical(&self, msg: &str);
}

/// Sink that discards every message.
///
/// Used as the default so the core never checks for sink presence.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn debug(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn warning(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
    fn critical(&self, _msg: &str) {}
}

/// Sink that forwards to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn debug(&self, msg: &str) {
        tracing::debug!(target: "rtu_backend", "{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "rtu_backend", "{}", msg);
    }

    fn warning(&self, msg: &str) {
        tracing::warn!(target: "rtu_backend", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "rtu_backend", "{}", msg);
    }

    fn critical(&self, msg: &str) {
        tracing::error!(target: "rtu_backend", critical = true, "{}", msg);
    }
}

/// Sink that records messages in memory, by severity.
///
/// Intended for tests asserting on advisory diagnostics.
#[derive(Debug, Default)]
pub struct CapturingSink {
    messages: Mutex<Vec<(Severity, String)>>,
}

/// Severity tag used by [`CapturingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl CapturingSink {
    /// Create an empty capturing sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All captured messages in arrival order.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Count of messages at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }

    fn push(&self, severity: Severity, msg: &str) {
        self.messages.lock().unwrap().push((severity, msg.to_string()));
    }
}

impl DiagnosticsSink for CapturingSink {
    fn debug(&self, msg: &str) {
        self.push(Severity::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.push(Severity::Info, msg);
    }

    fn warning(&self, msg: &str) {
        self.push(Severity::Warning, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Severity::Error, msg);
    }

    fn critical(&self, msg: &str) {
        self.push(Severity::Critical, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_sink_orders_and_counts() {
        let sink = CapturingSink::new();
        sink.warning("first");
        sink.debug("second");
        sink.warning("third");

        assert_eq!(sink.count(Severity::Warning), 2);
        assert_eq!(sink.count(Severity::Critical), 0);
        let msgs = sink.messages();
        assert_eq!(msgs[0].1, "first");
        assert_eq!(msgs[2].1, "third");
    }

    #[test]
    fn test_noop_sink_is_silent() {
        // Just exercises the no-op paths.
        let sink = NoopSink;
        sink.debug("x");
        sink.critical("x");
    }
}
