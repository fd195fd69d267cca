//! Datapoint storage.
//!
//! One RTU owns exactly one [`DatapointStore`]; the store and the RTU share
//! a lifetime and the store is never shared across RTUs.

mod datapoints;

pub use datapoints::{DatapointStore, TypeConsistency};
