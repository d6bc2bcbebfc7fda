// ── Observable values ──
//
// Read-only views over the published snapshot. Each value kind implements
// `ObservableValue`; the set is built once from the first snapshot and then
// re-evaluated against whichever snapshot is current.

mod account;
pub mod format;
mod vehicle;

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::Snapshot;

pub use account::{TransactionsReport, UserProfileValue};
pub use vehicle::{ActiveVignette, CrossingHistory, TollBalance, UnpaidCrossings};

/// Attribution attached as the last attribute of every value.
pub const ATTRIBUTION: &str = "Data provided by CNAIR eRovinieta";

/// Ordered attribute map; insertion order is display order.
pub type Attributes = IndexMap<String, SensorValue>;

// ── SensorValue ──────────────────────────────────────────────────

/// A scalar reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Missing,
}

impl SensorValue {
    /// Count as an integer reading.
    pub fn count(n: usize) -> Self {
        Self::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => f.write_str(format::yes_no(*b)),
            Self::Missing => Ok(()),
        }
    }
}

impl From<String> for SensorValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SensorValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for SensorValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for SensorValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for SensorValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// ── SensorKind ───────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    UserProfile,
    ActiveVignette,
    UnpaidCrossings,
    CrossingHistory,
    TollBalance,
    TransactionsReport,
}

impl SensorKind {
    /// Material Design icon hint.
    pub fn icon(self) -> &'static str {
        match self {
            Self::UserProfile => "mdi:account-details",
            Self::ActiveVignette => "mdi:car",
            Self::UnpaidCrossings => "mdi:invoice-text-remove",
            Self::CrossingHistory => "mdi:bridge",
            Self::TollBalance => "mdi:boom-gate",
            Self::TransactionsReport => "mdi:chart-bar-stacked",
        }
    }

    /// `erovinieta_<kind>_<subject>_<entry id>`, with the subject sanitized.
    pub fn unique_id(self, subject: &str, entry_id: &str) -> String {
        format!("erovinieta_{self}_{}_{entry_id}", format::sanitize(subject))
    }
}

// ── ObservableValue ──────────────────────────────────────────────

/// A named value derived from the current snapshot.
pub trait ObservableValue: Send + Sync {
    fn kind(&self) -> SensorKind;

    fn name(&self) -> String;

    fn unique_id(&self) -> &str;

    fn icon(&self) -> &'static str {
        self.kind().icon()
    }

    fn value(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> SensorValue;

    /// Attributes, ending with `attribution`.
    fn attributes(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Attributes;

    /// Evaluate everything at once against one snapshot.
    fn read(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Reading {
        Reading {
            kind: self.kind(),
            name: self.name(),
            unique_id: self.unique_id().to_owned(),
            icon: self.icon(),
            value: self.value(snapshot, now),
            attributes: self.attributes(snapshot, now),
        }
    }
}

/// One evaluated observable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub kind: SensorKind,
    pub name: String,
    pub unique_id: String,
    pub icon: &'static str,
    pub value: SensorValue,
    pub attributes: Attributes,
}

/// Append the attribution entry; call last.
pub(crate) fn with_attribution(mut attributes: Attributes) -> Attributes {
    attributes.insert("attribution".into(), ATTRIBUTION.into());
    attributes
}

/// Build the value set for a freshly set-up integration.
///
/// The profile value is always present. Each vehicle with a complete
/// identity gets vignette, unpaid-crossing, crossing-history and balance
/// values. The transactions report is only built when `snapshot` already
/// has transactions.
pub fn build_sensors(snapshot: &Snapshot, entry_id: &str) -> Vec<Box<dyn ObservableValue>> {
    let mut sensors: Vec<Box<dyn ObservableValue>> = Vec::new();
    let account = snapshot.user.full_name.as_deref().unwrap_or("unknown");

    sensors.push(Box::new(UserProfileValue::new(account, entry_id)));

    for vehicle in &snapshot.vehicles {
        let Some(identity) = vehicle.identity() else {
            tracing::warn!(
                plate = vehicle.plate.as_deref().unwrap_or("unknown"),
                "vehicle has incomplete identity, no values created"
            );
            continue;
        };
        sensors.push(Box::new(ActiveVignette::new(identity.clone(), entry_id)));
        sensors.push(Box::new(UnpaidCrossings::new(identity.clone(), entry_id)));
        sensors.push(Box::new(CrossingHistory::new(identity.clone(), entry_id)));
        sensors.push(Box::new(TollBalance::new(identity.plate, entry_id)));
    }

    if snapshot.transactions.is_empty() {
        tracing::debug!("no transactions in first snapshot, skipping report");
    } else {
        sensors.push(Box::new(TransactionsReport::new(account, entry_id)));
    }

    sensors
}
