// Per-vehicle values. Each holds only the vehicle's identity and looks the
// vehicle up in whichever snapshot it is evaluated against.

use chrono::{DateTime, Utc};

use super::format::{local_timestamp, ron};
use super::{Attributes, ObservableValue, SensorKind, SensorValue, with_attribution};
use crate::model::{Detection, Snapshot, VehicleIdentity, or_default};

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&str>) -> SensorValue {
    or_default(value, NOT_AVAILABLE).into()
}

fn insert_identity(attrs: &mut Attributes, identity: &VehicleIdentity) {
    attrs.insert("plate".into(), identity.plate.as_str().into());
    attrs.insert("vin".into(), identity.vin.as_str().into());
    attrs.insert(
        "certificate_series".into(),
        identity.certificate_series.as_str().into(),
    );
}

// ── Active vignette ──────────────────────────────────────────────

/// Whether the vehicle's vignette is still valid.
#[derive(Debug, Clone)]
pub struct ActiveVignette {
    identity: VehicleIdentity,
    unique_id: String,
}

impl ActiveVignette {
    pub fn new(identity: VehicleIdentity, entry_id: &str) -> Self {
        let unique_id = SensorKind::ActiveVignette.unique_id(&identity.plate, entry_id);
        Self {
            identity,
            unique_id,
        }
    }
}

impl ObservableValue for ActiveVignette {
    fn kind(&self) -> SensorKind {
        SensorKind::ActiveVignette
    }

    fn name(&self) -> String {
        format!("Active vignette ({})", self.identity.plate)
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> SensorValue {
        let active = snapshot
            .vehicle_by_plate(&self.identity.plate)
            .and_then(|v| v.vignette.as_ref())
            .is_some_and(|vignette| vignette.is_active_at(now));
        active.into()
    }

    fn attributes(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Attributes {
        let vehicle = snapshot.vehicle_by_plate(&self.identity.plate);
        let mut attrs = Attributes::new();
        insert_identity(&mut attrs, &self.identity);

        let country = vehicle
            .and_then(|v| v.country_id.as_ref())
            .and_then(|id| snapshot.country_name(id))
            .unwrap_or("Unknown");
        attrs.insert("country".into(), country.into());

        match vehicle.and_then(|v| v.vignette.as_ref()) {
            None => {
                attrs.insert("vignette".into(), "none".into());
            }
            Some(vignette) => {
                attrs.insert(
                    "vignette_category".into(),
                    or_na(vignette.category.as_deref()),
                );
                attrs.insert(
                    "vignette_start".into(),
                    local_timestamp(vignette.starts_at).into(),
                );
                attrs.insert(
                    "vignette_end".into(),
                    local_timestamp(vignette.expires_at).into(),
                );
                let days = vignette
                    .days_remaining_at(now)
                    .map_or_else(|| NOT_AVAILABLE.into(), SensorValue::Integer);
                attrs.insert("days_remaining".into(), days);
            }
        }
        with_attribution(attrs)
    }
}

// ── Unpaid crossings ─────────────────────────────────────────────

/// `true` when the vehicle crossed a toll bridge without paying within
/// the last [`Detection::UNPAID_WINDOW_HOURS`] hours.
#[derive(Debug, Clone)]
pub struct UnpaidCrossings {
    identity: VehicleIdentity,
    unique_id: String,
}

impl UnpaidCrossings {
    pub fn new(identity: VehicleIdentity, entry_id: &str) -> Self {
        let unique_id = SensorKind::UnpaidCrossings.unique_id(&identity.plate, entry_id);
        Self {
            identity,
            unique_id,
        }
    }

    fn recent_unpaid<'a>(&self, snapshot: &'a Snapshot, now: DateTime<Utc>) -> Vec<&'a Detection> {
        snapshot
            .crossings_for(&self.identity.vin, &self.identity.plate)
            .into_iter()
            .filter(|d| d.is_recent_unpaid(now))
            .collect()
    }
}

impl ObservableValue for UnpaidCrossings {
    fn kind(&self) -> SensorKind {
        SensorKind::UnpaidCrossings
    }

    fn name(&self) -> String {
        format!("Unpaid crossings ({})", self.identity.plate)
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> SensorValue {
        (!self.recent_unpaid(snapshot, now).is_empty()).into()
    }

    fn attributes(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Attributes {
        let unpaid = self.recent_unpaid(snapshot, now);
        let mut attrs = Attributes::new();
        attrs.insert("unpaid_crossings".into(), SensorValue::count(unpaid.len()));
        insert_identity(&mut attrs, &self.identity);
        for (i, d) in unpaid.iter().enumerate() {
            let n = i + 1;
            attrs.insert(format!("crossing_{n}_category"), or_na(d.category.as_deref()));
            attrs.insert(
                format!("crossing_{n}_detected_at"),
                local_timestamp(d.detected_at).into(),
            );
            attrs.insert(format!("crossing_{n}_direction"), or_na(d.direction.as_deref()));
            attrs.insert(format!("crossing_{n}_lane"), or_na(d.lane.as_deref()));
        }
        with_attribution(attrs)
    }
}

// ── Crossing history ─────────────────────────────────────────────

/// Every crossing in the look-back period; value is the count.
#[derive(Debug, Clone)]
pub struct CrossingHistory {
    identity: VehicleIdentity,
    unique_id: String,
}

impl CrossingHistory {
    pub fn new(identity: VehicleIdentity, entry_id: &str) -> Self {
        let unique_id = SensorKind::CrossingHistory.unique_id(&identity.plate, entry_id);
        Self {
            identity,
            unique_id,
        }
    }
}

impl ObservableValue for CrossingHistory {
    fn kind(&self) -> SensorKind {
        SensorKind::CrossingHistory
    }

    fn name(&self) -> String {
        format!("Crossing history ({})", self.identity.plate)
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> SensorValue {
        SensorValue::count(
            snapshot
                .crossings_for(&self.identity.vin, &self.identity.plate)
                .len(),
        )
    }

    fn attributes(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> Attributes {
        let crossings = snapshot.crossings_for(&self.identity.vin, &self.identity.plate);
        let mut attrs = Attributes::new();
        attrs.insert("total_crossings".into(), SensorValue::count(crossings.len()));
        insert_identity(&mut attrs, &self.identity);
        for (i, d) in crossings.iter().enumerate() {
            let n = i + 1;
            attrs.insert(format!("crossing_{n}_category"), or_na(d.category.as_deref()));
            attrs.insert(
                format!("crossing_{n}_detected_at"),
                local_timestamp(d.detected_at).into(),
            );
            attrs.insert(format!("crossing_{n}_direction"), or_na(d.direction.as_deref()));
            attrs.insert(format!("crossing_{n}_lane"), or_na(d.lane.as_deref()));
            attrs.insert(
                format!("crossing_{n}_value_ron"),
                d.value.map_or_else(|| NOT_AVAILABLE.into(), SensorValue::Number),
            );
            attrs.insert(format!("crossing_{n}_partner"), or_na(d.partner.as_deref()));
            attrs.insert(
                format!("crossing_{n}_payment_method"),
                or_na(d.payment_method.as_deref()),
            );
            attrs.insert(
                format!("crossing_{n}_payer_plate"),
                or_na(d.payer_plate.as_deref()),
            );
            attrs.insert(
                format!("crossing_{n}_purchased_crossings"),
                or_na(d.tax_name.as_deref()),
            );
            attrs.insert(
                format!("crossing_{n}_valid_until"),
                local_timestamp(d.valid_until).into(),
            );
        }
        with_attribution(attrs)
    }
}

// ── Toll balance ─────────────────────────────────────────────────

/// Unexpired prepaid bridge-toll balance, in RON.
#[derive(Debug, Clone)]
pub struct TollBalance {
    plate: String,
    unique_id: String,
}

impl TollBalance {
    pub fn new(plate: String, entry_id: &str) -> Self {
        let unique_id = SensorKind::TollBalance.unique_id(&plate, entry_id);
        Self { plate, unique_id }
    }

    fn balance(&self, snapshot: &Snapshot) -> f64 {
        snapshot
            .vehicle_by_plate(&self.plate)
            .and_then(|v| v.unexpired_balance)
            .unwrap_or(0.0)
    }
}

impl ObservableValue for TollBalance {
    fn kind(&self) -> SensorKind {
        SensorKind::TollBalance
    }

    fn name(&self) -> String {
        format!("Toll balance ({})", self.plate)
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> SensorValue {
        SensorValue::Number(self.balance(snapshot))
    }

    fn attributes(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("plate".into(), self.plate.as_str().into());
        attrs.insert(
            "unexpired_toll_balance".into(),
            ron(self.balance(snapshot)).into(),
        );
        with_attribution(attrs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{Country, UserProfile, Vehicle, Vignette};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap()
    }

    fn identity(vin: &str, plate: &str) -> VehicleIdentity {
        VehicleIdentity {
            vin: vin.into(),
            plate: plate.into(),
            certificate_series: format!("CIV-{plate}"),
        }
    }

    fn vehicle(vin: &str, plate: &str) -> Vehicle {
        Vehicle {
            vin: Some(vin.into()),
            plate: Some(plate.into()),
            certificate_series: Some(format!("CIV-{plate}")),
            country_id: Some(json!(1)),
            ..Vehicle::default()
        }
    }

    fn crossing(vin: &str, plate: &str, hours_ago: i64, paid: bool) -> Detection {
        Detection {
            vin: Some(vin.into()),
            plate: Some(plate.into()),
            detected_at: Some(now() - Duration::hours(hours_ago)),
            payment_status: paid.then(|| "PAID".to_owned()),
            category: Some("A".into()),
            direction: Some("Fetesti-Cernavoda".into()),
            lane: Some("2".into()),
            ..Detection::default()
        }
    }

    fn snapshot(vehicles: Vec<Vehicle>, crossings: BTreeMap<String, Vec<Detection>>) -> Snapshot {
        Snapshot::assemble(
            UserProfile::default(),
            vehicles,
            vec![Country {
                id: Some(json!(1)),
                name: Some("Romania".into()),
            }],
            Vec::new(),
            crossings,
            2,
            now(),
        )
    }

    #[test]
    fn recent_unpaid_crossing_flags_only_its_vehicle() {
        let mut crossings = BTreeMap::new();
        crossings.insert(
            "B123XYZ".to_owned(),
            vec![crossing("V1", "B123XYZ", 1, false), crossing("V1", "B123XYZ", 72, false)],
        );
        crossings.insert("CJ01ABC".to_owned(), vec![crossing("V2", "CJ01ABC", 2, true)]);
        let snap = snapshot(
            vec![vehicle("V1", "B123XYZ"), vehicle("V2", "CJ01ABC")],
            crossings,
        );

        let flagged = UnpaidCrossings::new(identity("V1", "B123XYZ"), "e");
        assert_eq!(flagged.value(&snap, now()), SensorValue::Bool(true));
        let attrs = flagged.attributes(&snap, now());
        assert_eq!(attrs["unpaid_crossings"], SensorValue::Integer(1));
        assert_eq!(attrs["crossing_1_lane"], SensorValue::Text("2".into()));
        assert!(!attrs.contains_key("crossing_2_lane"));

        let neighbour = UnpaidCrossings::new(identity("V2", "CJ01ABC"), "e");
        assert_eq!(neighbour.value(&snap, now()), SensorValue::Bool(false));
        assert_eq!(
            neighbour.attributes(&snap, now())["unpaid_crossings"],
            SensorValue::Integer(0)
        );
    }

    #[test]
    fn history_lists_every_crossing() {
        let mut crossings = BTreeMap::new();
        crossings.insert(
            "B123XYZ".to_owned(),
            vec![crossing("V1", "B123XYZ", 1, true), crossing("V1", "B123XYZ", 900, false)],
        );
        let snap = snapshot(vec![vehicle("V1", "B123XYZ")], crossings);

        let history = CrossingHistory::new(identity("V1", "B123XYZ"), "e");
        assert_eq!(history.value(&snap, now()), SensorValue::Integer(2));
        let attrs = history.attributes(&snap, now());
        assert_eq!(attrs["total_crossings"], SensorValue::Integer(2));
        assert_eq!(attrs["crossing_2_partner"], SensorValue::Text("N/A".into()));
        assert_eq!(attrs["crossing_1_value_ron"], SensorValue::Text("N/A".into()));
        assert_eq!(attrs.last().map(|(k, _)| k.as_str()), Some("attribution"));
    }

    #[test]
    fn active_vignette_reads_current_snapshot() {
        let mut car = vehicle("V1", "B123XYZ");
        car.vignette = Some(Vignette {
            starts_at: Some(now() - Duration::days(30)),
            expires_at: Some(now() + Duration::hours(60)),
            category: Some("A".into()),
        });
        let snap = snapshot(vec![car], BTreeMap::new());

        let value = ActiveVignette::new(identity("V1", "B123XYZ"), "entry1");
        assert_eq!(value.unique_id(), "erovinieta_active_vignette_b123xyz_entry1");
        assert_eq!(value.name(), "Active vignette (B123XYZ)");
        assert_eq!(value.value(&snap, now()), SensorValue::Bool(true));

        let attrs = value.attributes(&snap, now());
        assert_eq!(attrs["country"], SensorValue::Text("Romania".into()));
        assert_eq!(attrs["vignette_category"], SensorValue::Text("A".into()));
        assert_eq!(attrs["days_remaining"], SensorValue::Integer(2));

        let later = now() + Duration::days(3);
        assert_eq!(value.value(&snap, later), SensorValue::Bool(false));
    }

    #[test]
    fn vehicle_without_vignette_reports_none() {
        let mut car = vehicle("V1", "B123XYZ");
        car.country_id = Some(json!(99));
        let snap = snapshot(vec![car], BTreeMap::new());

        let value = ActiveVignette::new(identity("V1", "B123XYZ"), "e");
        assert_eq!(value.value(&snap, now()), SensorValue::Bool(false));
        let attrs = value.attributes(&snap, now());
        assert_eq!(attrs["vignette"], SensorValue::Text("none".into()));
        assert_eq!(attrs["country"], SensorValue::Text("Unknown".into()));
        assert!(!attrs.contains_key("days_remaining"));
    }

    #[test]
    fn balance_defaults_to_zero() {
        let mut car = vehicle("V1", "B123XYZ");
        car.unexpired_balance = Some(12.5);
        let snap = snapshot(vec![car, vehicle("V2", "CJ01ABC")], BTreeMap::new());

        let funded = TollBalance::new("B123XYZ".into(), "e");
        assert_eq!(funded.value(&snap, now()), SensorValue::Number(12.5));
        assert_eq!(
            funded.attributes(&snap, now())["unexpired_toll_balance"],
            SensorValue::Text("12.50 RON".into())
        );

        let empty = TollBalance::new("CJ01ABC".into(), "e");
        assert_eq!(empty.value(&snap, now()), SensorValue::Number(0.0));
        let gone = TollBalance::new("IS99ZZZ".into(), "e");
        assert_eq!(gone.value(&snap, now()), SensorValue::Number(0.0));
    }
}
