//! Core abstractions for the RTU backend.
//!
//! This module provides the addressing, value, datapoint, domain, error, and
//! diagnostics types everything else builds on.

pub mod address;
pub mod data;
pub mod datapoint;
pub mod diag;
pub mod domain;
pub mod error;

pub use address::Address;
pub use data::IoValue;
pub use datapoint::{ComplexDatapoint, PrimitiveDatapoint, RawDatapoint};
pub use diag::{DiagnosticsSink, NoopSink, TracingSink};
pub use domain::{is_value_permitted, ValueDomain, COMMAND_TYPE_IDS, COT_RANGE, PERIODIC_COT};
pub use error::{BackendError, Result};
