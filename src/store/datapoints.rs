//! The canonical datapoint store of one RTU.
//!
//! Two synchronized views of the same data:
//!
//! - a two-level keyed map `station -> object -> ComplexDatapoint`, the
//!   source of truth for lookups;
//! - a flat identity set of [`PrimitiveDatapoint`]s, used for enumeration
//!   (IOA listings, periodic-subscription queries).
//!
//! Every mutation touches both views in the same call; they are never
//! updated independently. The store is populated once at construction and
//! afterwards mutated only by [`DatapointStore::change_cause`]. Nothing is
//! ever removed.
//!
//! The store is not internally synchronized. Construction-then-read is safe
//! from any number of threads; a `change_cause` call must be serialized
//! against concurrent reads by the embedding.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::address::Address;
use crate::core::datapoint::{ComplexDatapoint, PrimitiveDatapoint, RawDatapoint};
use crate::core::diag::DiagnosticsSink;
use crate::core::domain::{COMMAND_TYPE_IDS, COT_RANGE, PERIODIC_COT};
use crate::core::error::{BackendError, Result};

/// Outcome of the command-type consistency check.
///
/// Only type identifiers inside the control-direction process-information
/// range are subject to strict matching; any other combination passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeConsistency {
    /// The addressed datapoint is not attached.
    Unknown,

    /// Stored or requested type identifier is outside the command range;
    /// the check does not apply and the request is acceptable.
    NotApplicable,

    /// Both are command-range identifiers and they agree.
    Match,

    /// Both are command-range identifiers and they differ.
    Mismatch,
}

impl TypeConsistency {
    /// True unless the check identified a command-range mismatch.
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, Self::Mismatch)
    }
}

/// Owns every datapoint attached to one RTU.
pub struct DatapointStore {
    /// Station address of the owning RTU; the default scope for
    /// enumerations that do not name a station.
    station: Address,

    /// Keyed map: station -> object -> datapoint.
    by_station: HashMap<Address, HashMap<Address, ComplexDatapoint>>,

    /// Identity set, kept in lockstep with the keyed map.
    identities: HashSet<PrimitiveDatapoint>,

    sink: Arc<dyn DiagnosticsSink>,
}

impl DatapointStore {
    /// Build the store from raw datapoint rows.
    ///
    /// When `relationships_included` is false, every row's relationship field
    /// is stored empty, whatever the input carried. Duplicate
    /// (station, object) keys keep the last row in the keyed map.
    ///
    /// After both views are populated, every non-empty relationship must
    /// resolve to an object address under the same station; a dangling
    /// relationship aborts construction with
    /// [`BackendError::InvalidRelationship`].
    pub fn ingest(
        station: Address,
        raw: impl IntoIterator<Item = RawDatapoint>,
        relationships_included: bool,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self> {
        if !relationships_included {
            sink.info("init data does not provide relationships, storing empty relationship fields");
        }

        let mut by_station: HashMap<Address, HashMap<Address, ComplexDatapoint>> = HashMap::new();
        let mut identities = HashSet::new();

        for mut row in raw {
            if !relationships_included {
                row.relationship = None;
            }
            let dp = ComplexDatapoint::from(row);

            let objects = by_station.entry(dp.primitive.station.clone()).or_default();
            if let Some(previous) = objects.insert(dp.primitive.object.clone(), dp.clone()) {
                // Last write wins in the keyed map; the displaced identity
                // must leave the set as well.
                identities.remove(&previous.primitive);
            }
            identities.insert(dp.primitive);
        }

        let store = Self {
            station,
            by_station,
            identities,
            sink,
        };
        store.check_relationships()?;
        Ok(store)
    }

    /// Verify the relationship invariant over the whole identity set.
    fn check_relationships(&self) -> Result<()> {
        for dp in &self.identities {
            if let Some(rel) = &dp.relationship {
                if !self.contains(&dp.station, rel) {
                    self.sink.critical(&format!(
                        "invalid relationship for datapoint {}: no datapoint with object address {} \
                         under station {}",
                        dp, rel, dp.station
                    ));
                    return Err(BackendError::InvalidRelationship {
                        station: dp.station.clone(),
                        object: dp.object.clone(),
                        relationship: rel.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Station address of the owning RTU.
    pub fn station(&self) -> &Address {
        &self.station
    }

    /// O(1) membership test.
    pub fn contains(&self, station: &Address, object: &Address) -> bool {
        self.by_station
            .get(station)
            .is_some_and(|objects| objects.contains_key(object))
    }

    /// Full stored datapoint, payload included.
    pub fn get(&self, station: &Address, object: &Address) -> Option<&ComplexDatapoint> {
        self.by_station.get(station)?.get(object)
    }

    /// Primitive projection of a stored datapoint.
    pub fn primitive(&self, station: &Address, object: &Address) -> Option<PrimitiveDatapoint> {
        self.get(station, object).map(|dp| dp.primitive.clone())
    }

    /// Follow a datapoint's relationship to its sibling.
    ///
    /// `None` if the origin is absent or its relationship field is empty.
    /// A present, non-empty relationship always resolves, because the
    /// invariant was checked at ingestion. Relationships are directional:
    /// A pointing to B says nothing about B.
    pub fn related(&self, station: &Address, object: &Address) -> Option<&ComplexDatapoint> {
        let origin = self.get(station, object)?;
        let rel = origin.primitive.relationship.as_ref()?;
        self.get(station, rel)
    }

    /// Change the default cause of transmission for one datapoint.
    ///
    /// No-op with a warning if the datapoint is absent or `new_cause` is
    /// outside 1..=47. Otherwise the keyed map entry is replaced and the
    /// identity set swaps the old tuple for the new one in the same call.
    pub fn change_cause(&mut self, station: &Address, object: &Address, new_cause: u8) {
        let Some(objects) = self.by_station.get_mut(station) else {
            self.sink.warning(&format!(
                "cannot change cot for unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
            return;
        };
        let Some(dp) = objects.get_mut(object) else {
            self.sink.warning(&format!(
                "cannot change cot for unattached datapoint with (station, object) ({}, {})",
                station, object
            ));
            return;
        };
        if !COT_RANGE.contains(&new_cause) {
            self.sink.warning(&format!(
                "tried to change cot to invalid value {} for datapoint with (station, object) ({}, {})",
                new_cause, station, object
            ));
            return;
        }

        let old_identity = dp.primitive.clone();
        dp.primitive.cause = new_cause;
        let new_identity = dp.primitive.clone();

        self.identities.remove(&old_identity);
        self.identities.insert(new_identity);
    }

    /// Command-type consistency of a request against a stored datapoint.
    pub fn command_type_consistency(
        &self,
        station: &Address,
        object: &Address,
        requested: u8,
    ) -> TypeConsistency {
        let Some(dp) = self.get(station, object) else {
            return TypeConsistency::Unknown;
        };
        let stored = dp.primitive.type_id;
        if COMMAND_TYPE_IDS.contains(&stored) && COMMAND_TYPE_IDS.contains(&requested) {
            if stored == requested {
                TypeConsistency::Match
            } else {
                TypeConsistency::Mismatch
            }
        } else {
            TypeConsistency::NotApplicable
        }
    }

    /// All object addresses under a station; the RTU's own station if none
    /// is given.
    pub fn object_addresses(&self, station: Option<&Address>) -> HashSet<Address> {
        let station = station.unwrap_or(&self.station);
        self.identities
            .iter()
            .filter(|dp| &dp.station == station)
            .map(|dp| dp.object.clone())
            .collect()
    }

    /// All (station, object) identifiers expecting periodic updates.
    pub fn periodic_ids(&self) -> HashSet<(Address, Address)> {
        self.identities
            .iter()
            .filter(|dp| dp.cause == PERIODIC_COT)
            .map(|dp| (dp.station.clone(), dp.object.clone()))
            .collect()
    }

    /// Periodic object addresses under a station; defaults to the RTU's own.
    pub fn periodic_object_addresses(&self, station: Option<&Address>) -> HashSet<Address> {
        let station = station.unwrap_or(&self.station);
        self.identities
            .iter()
            .filter(|dp| dp.cause == PERIODIC_COT && &dp.station == station)
            .map(|dp| dp.object.clone())
            .collect()
    }

    /// All primitive datapoints expecting periodic updates.
    pub fn periodic_datapoints(&self) -> HashSet<PrimitiveDatapoint> {
        self.identities
            .iter()
            .filter(|dp| dp.cause == PERIODIC_COT)
            .cloned()
            .collect()
    }

    /// All attached primitive datapoints.
    pub fn datapoints(&self) -> &HashSet<PrimitiveDatapoint> {
        &self.identities
    }

    /// Number of attached datapoints.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// True if no datapoints are attached.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl std::fmt::Debug for DatapointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatapointStore")
            .field("station", &self.station)
            .field("datapoints", &self.identities.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diag::{CapturingSink, NoopSink, Severity};

    fn store(rows: Vec<RawDatapoint>, relationships: bool) -> Result<DatapointStore> {
        DatapointStore::ingest(Address::from(1), rows, relationships, Arc::new(NoopSink))
    }

    #[test]
    fn test_ingest_then_contains() {
        let s = store(
            vec![
                RawDatapoint::new(1, 10, 11, 1),
                RawDatapoint::new(1, 11, 45, 3),
                RawDatapoint::new(2, 10, 1, 1),
            ],
            false,
        )
        .unwrap();

        assert!(s.contains(&1.into(), &10.into()));
        assert!(s.contains(&1.into(), &11.into()));
        assert!(s.contains(&2.into(), &10.into()));
        assert!(!s.contains(&1.into(), &12.into()));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_relationship_normalization_when_not_included() {
        let s = store(
            vec![RawDatapoint::new(1, 10, 11, 1).with_relationship(99)],
            false,
        )
        .unwrap();

        // The dangling relationship was discarded, so ingestion succeeds
        // and the stored relationship is empty.
        let dp = s.primitive(&1.into(), &10.into()).unwrap();
        assert_eq!(dp.relationship, None);
    }

    #[test]
    fn test_dangling_relationship_is_fatal() {
        let err = store(
            vec![
                RawDatapoint::new(1, "A", 1, 1),
                RawDatapoint::new(1, "B", 1, 1).with_relationship("C"),
            ],
            true,
        )
        .unwrap_err();

        match err {
            BackendError::InvalidRelationship { relationship, .. } => {
                assert_eq!(relationship, Address::from("C"));
            }
        }
    }

    #[test]
    fn test_relationship_across_stations_is_invalid() {
        // Object 10 exists under station 2 but not under station 1.
        let res = store(
            vec![
                RawDatapoint::new(2, 10, 1, 1),
                RawDatapoint::new(1, 11, 1, 1).with_relationship(10),
            ],
            true,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_dangling_relationship_logs_critical() {
        let sink = CapturingSink::new();
        let res = DatapointStore::ingest(
            Address::from(1),
            vec![RawDatapoint::new(1, "B", 1, 1).with_relationship("C")],
            true,
            sink.clone(),
        );
        assert!(res.is_err());
        assert_eq!(sink.count(Severity::Critical), 1);
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let s = store(
            vec![
                RawDatapoint::new(1, 10, 11, 1).with_payload(serde_json::json!("old")),
                RawDatapoint::new(1, 10, 11, 3).with_payload(serde_json::json!("new")),
            ],
            false,
        )
        .unwrap();

        let dp = s.get(&1.into(), &10.into()).unwrap();
        assert_eq!(dp.primitive.cause, 3);
        assert_eq!(dp.payload, serde_json::json!("new"));
        // The displaced identity left the set with its row.
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_related_resolves_forward_only() {
        let s = store(
            vec![
                RawDatapoint::new(1, "A", 1, 1),
                RawDatapoint::new(1, "B", 1, 1).with_relationship("A"),
            ],
            true,
        )
        .unwrap();

        let related = s.related(&1.into(), &"B".into()).unwrap();
        assert_eq!(related.primitive.object, Address::from("A"));
        assert_eq!(related.primitive.relationship, None);

        // Directional: A does not point back to B.
        assert!(s.related(&1.into(), &"A".into()).is_none());
    }

    #[test]
    fn test_related_of_absent_origin() {
        let s = store(vec![RawDatapoint::new(1, "A", 1, 1)], true).unwrap();
        assert!(s.related(&1.into(), &"Z".into()).is_none());
    }

    #[test]
    fn test_change_cause_valid() {
        let mut s = store(vec![RawDatapoint::new(1, 10, 11, 1)], false).unwrap();
        let old_identity = s.primitive(&1.into(), &10.into()).unwrap();

        s.change_cause(&1.into(), &10.into(), 3);

        let dp = s.primitive(&1.into(), &10.into()).unwrap();
        assert_eq!(dp.cause, 3);
        assert!(!s.datapoints().contains(&old_identity));
        assert!(s.datapoints().contains(&dp));
        // No longer periodic.
        assert!(s.periodic_object_addresses(None).is_empty());
    }

    #[test]
    fn test_change_cause_out_of_range_is_noop() {
        let sink = CapturingSink::new();
        let mut s = DatapointStore::ingest(
            Address::from(1),
            vec![RawDatapoint::new(1, 10, 11, 1)],
            false,
            sink.clone(),
        )
        .unwrap();

        s.change_cause(&1.into(), &10.into(), 0);
        s.change_cause(&1.into(), &10.into(), 48);

        assert_eq!(s.primitive(&1.into(), &10.into()).unwrap().cause, 1);
        assert_eq!(sink.count(Severity::Warning), 2);
    }

    #[test]
    fn test_change_cause_absent_is_noop() {
        let sink = CapturingSink::new();
        let mut s = DatapointStore::ingest(
            Address::from(1),
            vec![RawDatapoint::new(1, 10, 11, 1)],
            false,
            sink.clone(),
        )
        .unwrap();

        s.change_cause(&1.into(), &99.into(), 3);
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn test_type_consistency() {
        let s = store(
            vec![
                RawDatapoint::new(1, 10, 45, 3),
                RawDatapoint::new(1, 11, 11, 1),
            ],
            false,
        )
        .unwrap();

        // Command type vs. command type: strict equality.
        assert_eq!(
            s.command_type_consistency(&1.into(), &10.into(), 45),
            TypeConsistency::Match
        );
        assert_eq!(
            s.command_type_consistency(&1.into(), &10.into(), 46),
            TypeConsistency::Mismatch
        );
        // Wildcard 0 against a command-type datapoint: not subject to the check.
        assert_eq!(
            s.command_type_consistency(&1.into(), &10.into(), 0),
            TypeConsistency::NotApplicable
        );
        // Non-command stored type: never subject to the check.
        assert_eq!(
            s.command_type_consistency(&1.into(), &11.into(), 45),
            TypeConsistency::NotApplicable
        );
        assert_eq!(
            s.command_type_consistency(&1.into(), &99.into(), 45),
            TypeConsistency::Unknown
        );
    }

    #[test]
    fn test_enumerations() {
        let s = store(
            vec![
                RawDatapoint::new(1, 10, 11, 1),
                RawDatapoint::new(1, 11, 45, 3),
                RawDatapoint::new(2, 20, 1, 1),
            ],
            false,
        )
        .unwrap();

        // Default station is the RTU's own.
        assert_eq!(
            s.object_addresses(None),
            [Address::from(10), Address::from(11)].into_iter().collect()
        );
        assert_eq!(
            s.object_addresses(Some(&2.into())),
            [Address::from(20)].into_iter().collect()
        );
        assert_eq!(
            s.periodic_object_addresses(None),
            [Address::from(10)].into_iter().collect()
        );
        assert_eq!(
            s.periodic_ids(),
            [
                (Address::from(1), Address::from(10)),
                (Address::from(2), Address::from(20)),
            ]
            .into_iter()
            .collect()
        );
        assert_eq!(s.periodic_datapoints().len(), 2);
    }
}
