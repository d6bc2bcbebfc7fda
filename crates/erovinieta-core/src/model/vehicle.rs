// ── Vehicle domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One vehicle registered on the account, as listed by the portal.
///
/// Identity fields are `None` when the portal sent them null or blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub certificate_series: Option<String>,
    /// Portal country id; resolve against the snapshot's country list.
    pub country_id: Option<Value>,
    /// Most recent vignette, if the vehicle has one.
    pub vignette: Option<Vignette>,
    /// Unexpired toll balance in RON.
    pub unexpired_balance: Option<f64>,
}

/// The (VIN, plate, certificate series) triple that identifies a vehicle to
/// the crossing-detection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleIdentity {
    pub vin: String,
    pub plate: String,
    pub certificate_series: String,
}

impl Vehicle {
    /// The full identity, or `None` if any of the three fields is missing.
    pub fn identity(&self) -> Option<VehicleIdentity> {
        Some(VehicleIdentity {
            vin: self.vin.clone()?,
            plate: self.plate.clone()?,
            certificate_series: self.certificate_series.clone()?,
        })
    }
}

/// Validity window of a road vignette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vignette {
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

impl Vignette {
    /// `true` iff the vignette has an expiry strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|stop| stop > now)
    }

    /// Whole days until expiry, floored; negative once expired.
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let stop = self.expires_at?;
        Some((stop.timestamp() - now.timestamp()).div_euclid(86_400))
    }
}

/// Entry of the portal's country reference list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: Option<Value>,
    pub name: Option<String>,
}
