// ── API-to-domain type conversions ──
//
// Bridges raw `erovinieta_api::models` wire types into canonical
// `erovinieta_core::model` domain types. Blank strings and nulls go through
// the default-substitution helpers so every "not set" looks the same.

use chrono::{DateTime, Utc};
use serde_json::Value;

use erovinieta_api::models as wire;

use crate::model::{
    Country, Detection, Transaction, UserProfile, Vehicle, Vignette, non_blank, or_default,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Convert an optional epoch-milliseconds timestamp to `DateTime<Utc>`.
///
/// Zero is treated as "not set", matching how the portal fills unused dates.
fn epoch_ms_to_datetime(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.filter(|&ms| ms != 0)
        .and_then(DateTime::from_timestamp_millis)
}

/// Trimmed, non-blank copy of an optional string.
fn text(raw: Option<String>) -> Option<String> {
    non_blank(raw).map(|s| s.trim().to_owned())
}

/// Render a loosely-typed id as text.
fn id_text(raw: Option<Value>) -> Option<String> {
    match non_blank(raw)? {
        Value::String(s) => Some(s.trim().to_owned()),
        other => Some(other.to_string()),
    }
}

// ── Account ────────────────────────────────────────────────────────

impl From<wire::UserData> for UserProfile {
    fn from(u: wire::UserData) -> Self {
        let holder = u.holder.unwrap_or_default();
        let named =
            |r: Option<wire::NamedRef>| text(r.and_then(|r| r.display().map(str::to_owned)));
        UserProfile {
            id: id_text(u.id),
            full_name: text(holder.name),
            national_id: text(u.national_id),
            phone: text(holder.phone),
            email: text(holder.email),
            natural_person: or_default(u.natural_person, false),
            accepts_correspondence: or_default(u.accepts_correspondence, false),
            address: text(u.address),
            country: named(u.country),
            county: named(u.county),
            locality: named(u.locality),
            county_text: text(u.county_text),
            locality_text: text(u.locality_text),
        }
    }
}

// ── Vehicles ───────────────────────────────────────────────────────

impl From<wire::VehicleRow> for Vehicle {
    fn from(row: wire::VehicleRow) -> Self {
        let entity = row.entity.unwrap_or_default();
        let vignette = or_default(row.vignettes, Vec::new())
            .into_iter()
            .next()
            .map(Vignette::from);
        Vehicle {
            vin: text(entity.vin),
            plate: text(entity.plate_no),
            certificate_series: text(entity.certificate_series),
            country_id: non_blank(entity.country_id),
            vignette,
            unexpired_balance: row.detection_payment_sum.and_then(|s| s.unexpired_balance),
        }
    }
}

impl From<wire::Vignette> for Vignette {
    fn from(v: wire::Vignette) -> Self {
        Vignette {
            starts_at: epoch_ms_to_datetime(v.vignette_start_date),
            expires_at: epoch_ms_to_datetime(v.vignette_stop_date),
            category: text(v.vignette_category),
        }
    }
}

impl From<wire::Country> for Country {
    fn from(c: wire::Country) -> Self {
        Country {
            id: non_blank(c.id),
            name: text(c.name),
        }
    }
}

// ── Transactions ───────────────────────────────────────────────────

impl From<wire::Transaction> for Transaction {
    fn from(t: wire::Transaction) -> Self {
        Transaction {
            series: text(t.series),
            total_with_vat: or_default(t.total_with_vat, 0.0),
            extra: t.extra,
        }
    }
}

// ── Detections ─────────────────────────────────────────────────────

impl From<wire::Detection> for Detection {
    fn from(d: wire::Detection) -> Self {
        Detection {
            vin: text(d.vin),
            plate: text(d.plate_no),
            detected_at: epoch_ms_to_datetime(d.detection_timestamp),
            // Only an absent status marks a crossing unpaid; `""` is kept.
            payment_status: d.payment_status,
            category: text(d.detection_category),
            lane: text(d.lane),
            direction: text(d.direction),
            value: d.value,
            partner: text(d.partner),
            payment_method: text(d.payment_method),
            payer_plate: text(d.payment_plate_no),
            tax_name: text(d.tax_name),
            valid_until: epoch_ms_to_datetime(d.valid_until_timestamp),
        }
    }
}
