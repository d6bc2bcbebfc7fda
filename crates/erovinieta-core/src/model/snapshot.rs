// ── Poll-cycle snapshot ──
//
// One complete, immutable result of a poll cycle. The coordinator builds a
// fresh `Snapshot` every cycle and swaps it in whole; nothing mutates a
// published snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Country, Detection, Transaction, UserProfile, Vehicle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub user: UserProfile,
    /// Every listed vehicle, including ones with incomplete identity.
    pub vehicles: Vec<Vehicle>,
    pub countries: Vec<Country>,
    pub transactions: Vec<Transaction>,
    /// Detections per plate, for every vehicle with a complete identity.
    pub crossings_by_plate: BTreeMap<String, Vec<Detection>>,
    /// All detections across vehicles, flattened in plate order.
    pub all_crossings: Vec<Detection>,
    /// History length the transaction list was fetched with.
    pub history_years: u8,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Assemble a snapshot, deriving `all_crossings` from the per-plate map.
    pub fn assemble(
        user: UserProfile,
        vehicles: Vec<Vehicle>,
        countries: Vec<Country>,
        transactions: Vec<Transaction>,
        crossings_by_plate: BTreeMap<String, Vec<Detection>>,
        history_years: u8,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let all_crossings = crossings_by_plate.values().flatten().cloned().collect();
        Self {
            user,
            vehicles,
            countries,
            transactions,
            crossings_by_plate,
            all_crossings,
            history_years,
            fetched_at,
        }
    }

    /// First listed vehicle with this plate.
    pub fn vehicle_by_plate(&self, plate: &str) -> Option<&Vehicle> {
        self.vehicles
            .iter()
            .find(|v| v.plate.as_deref() == Some(plate))
    }

    /// Detections for one vehicle.
    ///
    /// Prefers the per-plate map; falls back to filtering the flattened list
    /// by VIN and plate when the plate has no entry.
    pub fn crossings_for(&self, vin: &str, plate: &str) -> Vec<&Detection> {
        match self.crossings_by_plate.get(plate) {
            Some(list) => list.iter().collect(),
            None => self
                .all_crossings
                .iter()
                .filter(|d| d.belongs_to(vin, plate))
                .collect(),
        }
    }

    /// Display name of the country with `id`, if listed.
    pub fn country_name(&self, id: &serde_json::Value) -> Option<&str> {
        self.countries
            .iter()
            .find(|c| c.id.as_ref() == Some(id))
            .and_then(|c| c.name.as_deref())
    }

    /// `true` when both snapshots carry the same data, ignoring `fetched_at`.
    pub fn same_content(&self, other: &Self) -> bool {
        Self {
            fetched_at: other.fetched_at,
            ..self.clone()
        } == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(vin: &str, plate: &str) -> Detection {
        Detection {
            vin: Some(vin.into()),
            plate: Some(plate.into()),
            ..Detection::default()
        }
    }

    #[test]
    fn crossings_prefer_per_plate_map() {
        let mut by_plate = BTreeMap::new();
        by_plate.insert("B1".to_owned(), vec![detection("V1", "B1")]);
        let snap = Snapshot::assemble(
            UserProfile::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            by_plate,
            2,
            Utc::now(),
        );
        assert_eq!(snap.crossings_for("V1", "B1").len(), 1);
        assert_eq!(snap.all_crossings.len(), 1);
    }

    #[test]
    fn crossings_fall_back_to_flattened_list() {
        let snap = Snapshot {
            all_crossings: vec![
                detection("V1", "B1"),
                detection("V2", "B2"),
                detection("V9", "B1"),
            ],
            ..Snapshot::default()
        };
        let found = snap.crossings_for("V1", "B1");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].vin.as_deref(), Some("V1"));
    }

    #[test]
    fn same_content_ignores_fetch_time() {
        let a = Snapshot::default();
        let b = Snapshot {
            fetched_at: Utc::now(),
            ..Snapshot::default()
        };
        assert!(a.same_content(&b));
        let c = Snapshot {
            history_years: 3,
            ..Snapshot::default()
        };
        assert!(!a.same_content(&c));
    }
}
