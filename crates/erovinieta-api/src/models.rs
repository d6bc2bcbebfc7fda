// Portal wire models
//
// The portal is a Spring backend with Romanian field names and loose
// typing: numbers arrive as strings, identifiers as either, and almost any
// field may be null or absent. Every field is therefore optional and the
// numeric ones go through lenient deserializers. Interpretation (defaults,
// validity) is the domain layer's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Envelopes ────────────────────────────────────────────────────────

/// Paginated list envelope: `{ "view": [...], "total": N }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Option::default")]
    pub view: Option<Vec<T>>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub total: Option<i64>,
}

impl<T> Page<T> {
    /// The page rows, or an empty slice when `view` is null.
    pub fn rows(&self) -> &[T] {
        self.view.as_deref().unwrap_or_default()
    }

    pub fn into_rows(self) -> Vec<T> {
        self.view.unwrap_or_default()
    }
}

// ── Account ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "cnpCui")]
    pub national_id: Option<String>,
    /// Natural person (as opposed to a company account).
    #[serde(default, rename = "pf", deserialize_with = "lenient::opt_bool")]
    pub natural_person: Option<bool>,
    #[serde(
        default,
        rename = "acceptaCorespondenta",
        deserialize_with = "lenient::opt_bool"
    )]
    pub accepts_correspondence: Option<bool>,
    #[serde(default, rename = "adresa")]
    pub address: Option<String>,
    #[serde(default, rename = "judetText")]
    pub county_text: Option<String>,
    #[serde(default, rename = "localitateText")]
    pub locality_text: Option<String>,
    #[serde(default, rename = "utilizator")]
    pub holder: Option<AccountHolder>,
    #[serde(default, rename = "tara")]
    pub country: Option<NamedRef>,
    #[serde(default, rename = "judet")]
    pub county: Option<NamedRef>,
    #[serde(default, rename = "localitate")]
    pub locality: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AccountHolder {
    #[serde(default, rename = "nume")]
    pub name: Option<String>,
    #[serde(default, rename = "telefon", deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Reference object carrying a display name under either `denumire` or `nume`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NamedRef {
    #[serde(default, rename = "denumire")]
    pub title: Option<String>,
    #[serde(default, rename = "nume")]
    pub name: Option<String>,
}

impl NamedRef {
    pub fn display(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }
}

// ── Vehicles ─────────────────────────────────────────────────────────

/// One row of `getVehiclesPaginated`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRow {
    #[serde(default)]
    pub entity: Option<VehicleEntity>,
    #[serde(default, rename = "userDetailsVignettes")]
    pub vignettes: Option<Vec<Vignette>>,
    #[serde(default)]
    pub detection_payment_sum: Option<DetectionPaymentSum>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEntity {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub vin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub plate_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub certificate_series: Option<String>,
    /// Country identifier, matched against [`Country::id`].
    #[serde(default, rename = "tara")]
    pub country_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vignette {
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub vignette_start_date: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub vignette_stop_date: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub vignette_category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DetectionPaymentSum {
    /// Unexpired toll balance, in RON.
    #[serde(
        default,
        rename = "soldPeajeNeexpirate",
        deserialize_with = "lenient::opt_f64"
    )]
    pub unexpired_balance: Option<f64>,
}

// ── Reference data ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Country {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "denumire")]
    pub name: Option<String>,
}

// ── Transactions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub series: Option<String>,
    /// Transaction total including VAT, in RON.
    #[serde(
        default,
        rename = "valoareTotalaCuTva",
        deserialize_with = "lenient::opt_f64"
    )]
    pub total_with_vat: Option<f64>,
    /// Remaining portal fields, preserved for consumers.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Detections ───────────────────────────────────────────────────────

/// Envelope of `getDetectionsForVehicle`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionList {
    #[serde(default)]
    pub detection_list: Option<Vec<Detection>>,
}

/// A single road-crossing detection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub vin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub plate_no: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub detection_timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub detection_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub lane: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub partner: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_plate_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tax_name: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub valid_until_timestamp: Option<i64>,
}

/// Request body for `getDetectionsForVehicle`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionQuery<'a> {
    pub vin: &'a str,
    pub plate_no: &'a str,
    pub certificate_series: &'a str,
    pub vehicle_fleet_entity: FleetEntityRef<'a>,
    /// Trailing look-back period, in months.
    pub period: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetEntityRef<'a> {
    pub certificate_series: &'a str,
    pub plate_no: &'a str,
    pub vin: &'a str,
}

impl<'a> DetectionQuery<'a> {
    /// Trailing period, in months, the portal's web client asks for.
    pub const DEFAULT_PERIOD: u8 = 4;

    /// Query one vehicle's detections over the default trailing period.
    pub fn new(vin: &'a str, plate_no: &'a str, certificate_series: &'a str) -> Self {
        Self {
            vin,
            plate_no,
            certificate_series,
            vehicle_fleet_entity: FleetEntityRef {
                certificate_series,
                plate_no,
                vin,
            },
            period: Self::DEFAULT_PERIOD,
        }
    }

    pub fn with_period(mut self, months: u8) -> Self {
        self.period = months;
        self
    }
}

// ── Lenient scalar decoding ──────────────────────────────────────────

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        })
    }

    pub(super) fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn opt_string<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub(super) fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_i64().map(|i| i != 0),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "da" => Some(true),
                "false" | "0" | "nu" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn vehicle_row_decodes_portal_shape() {
        let row: VehicleRow = serde_json::from_value(json!({
            "entity": {
                "vin": "WVWZZZ1JZXW000001",
                "plateNo": "B123XYZ",
                "certificateSeries": "CIV123",
                "tara": 1
            },
            "userDetailsVignettes": [{
                "vignetteStartDate": 1_700_000_000_000_i64,
                "vignetteStopDate": "1731536000000",
                "vignetteCategory": "A"
            }],
            "detectionPaymentSum": { "soldPeajeNeexpirate": "12.50" }
        }))
        .unwrap();

        let entity = row.entity.unwrap();
        assert_eq!(entity.plate_no.as_deref(), Some("B123XYZ"));
        assert_eq!(entity.country_id, Some(json!(1)));
        let vignette = &row.vignettes.unwrap()[0];
        assert_eq!(vignette.vignette_stop_date, Some(1_731_536_000_000));
        assert_eq!(
            row.detection_payment_sum.unwrap().unexpired_balance,
            Some(12.5)
        );
    }

    #[test]
    fn nulls_and_garbage_become_none() {
        let det: Detection = serde_json::from_value(json!({
            "detectionTimestamp": null,
            "value": "n/a",
            "lane": 2,
            "paymentStatus": "PAID"
        }))
        .unwrap();
        assert_eq!(det.detection_timestamp, None);
        assert_eq!(det.value, None);
        assert_eq!(det.lane.as_deref(), Some("2"));
        assert_eq!(det.payment_status.as_deref(), Some("PAID"));
    }

    #[test]
    fn transaction_keeps_unknown_fields() {
        let tx: Transaction = serde_json::from_value(json!({
            "series": "TX1",
            "valoareTotalaCuTva": 30.5,
            "dataTranzactie": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert_eq!(tx.total_with_vat, Some(30.5));
        assert!(tx.extra.contains_key("dataTranzactie"));
    }

    #[test]
    fn page_with_null_view_has_no_rows() {
        let page: Page<Country> = serde_json::from_value(json!({ "view": null })).unwrap();
        assert!(page.rows().is_empty());
    }

    #[test]
    fn detection_query_mirrors_identity_into_fleet_entity() {
        let body = serde_json::to_value(DetectionQuery::new("VIN1", "B1ABC", "S1")).unwrap();
        assert_eq!(
            body,
            json!({
                "vin": "VIN1",
                "plateNo": "B1ABC",
                "certificateSeries": "S1",
                "vehicleFleetEntity": {
                    "certificateSeries": "S1",
                    "plateNo": "B1ABC",
                    "vin": "VIN1"
                },
                "period": 4
            })
        );
    }
}
