// ── Bridge-crossing detection domain type ──

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One recorded crossing of a toll bridge.
///
/// A detection without a payment status has not been paid for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
    pub payment_status: Option<String>,
    pub category: Option<String>,
    pub lane: Option<String>,
    pub direction: Option<String>,
    /// Crossing fee in RON.
    pub value: Option<f64>,
    pub partner: Option<String>,
    pub payment_method: Option<String>,
    /// Plate the crossing was paid under (may differ from the detected plate).
    pub payer_plate: Option<String>,
    /// Name of the prepaid crossing package that covered this detection.
    pub tax_name: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Detection {
    /// Look-back window, in hours, for the unpaid-crossing indicator.
    pub const UNPAID_WINDOW_HOURS: i64 = 24;

    pub fn is_unpaid(&self) -> bool {
        self.payment_status.is_none()
    }

    /// Unpaid and detected no more than 24 hours before `now`.
    /// Detections without a timestamp never qualify.
    pub fn is_recent_unpaid(&self, now: DateTime<Utc>) -> bool {
        self.is_unpaid()
            && self
                .detected_at
                .is_some_and(|at| now - at <= Duration::hours(Self::UNPAID_WINDOW_HOURS))
    }

    /// `true` when this detection belongs to the vehicle with `vin` and `plate`.
    pub fn belongs_to(&self, vin: &str, plate: &str) -> bool {
        self.vin.as_deref() == Some(vin) && self.plate.as_deref() == Some(plate)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap_or_default()
    }

    fn unpaid_at(at: Option<DateTime<Utc>>) -> Detection {
        Detection {
            detected_at: at,
            ..Detection::default()
        }
    }

    #[test]
    fn recent_unpaid_window_is_inclusive() {
        assert!(unpaid_at(Some(now() - Duration::hours(1))).is_recent_unpaid(now()));
        assert!(unpaid_at(Some(now() - Duration::hours(24))).is_recent_unpaid(now()));
        assert!(
            !unpaid_at(Some(now() - Duration::hours(24) - Duration::seconds(1)))
                .is_recent_unpaid(now())
        );
    }

    #[test]
    fn missing_timestamp_never_counts() {
        assert!(!unpaid_at(None).is_recent_unpaid(now()));
    }

    #[test]
    fn paid_detection_is_not_unpaid() {
        let paid = Detection {
            payment_status: Some("PAID".into()),
            detected_at: Some(now()),
            ..Detection::default()
        };
        assert!(!paid.is_recent_unpaid(now()));
    }
}
