// Account-level values: profile and transactions report.

use chrono::{DateTime, Utc};

use super::format::{capitalize_words, ron, title_case, yes_no};
use super::{Attributes, ObservableValue, SensorKind, SensorValue, with_attribution};
use crate::model::{Snapshot, or_default, total_paid};

const UNSPECIFIED: &str = "unspecified";

fn text_or_unspecified(value: Option<&str>) -> SensorValue {
    or_default(value, UNSPECIFIED).into()
}

// ── Profile ──────────────────────────────────────────────────────

/// Account profile; value is the portal account id.
#[derive(Debug, Clone)]
pub struct UserProfileValue {
    unique_id: String,
}

impl UserProfileValue {
    pub fn new(account: &str, entry_id: &str) -> Self {
        Self {
            unique_id: SensorKind::UserProfile.unique_id(account, entry_id),
        }
    }
}

impl ObservableValue for UserProfileValue {
    fn kind(&self) -> SensorKind {
        SensorKind::UserProfile
    }

    fn name(&self) -> String {
        "User profile".into()
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> SensorValue {
        text_or_unspecified(snapshot.user.id.as_deref())
    }

    fn attributes(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> Attributes {
        let user = &snapshot.user;
        let mut attrs = Attributes::new();
        attrs.insert(
            "full_name".into(),
            title_case(user.full_name.as_deref().unwrap_or_default()).into(),
        );
        attrs.insert("national_id".into(), text_or_unspecified(user.national_id.as_deref()));
        attrs.insert("phone".into(), text_or_unspecified(user.phone.as_deref()));
        attrs.insert("natural_person".into(), yes_no(user.natural_person).into());
        attrs.insert("email".into(), text_or_unspecified(user.email.as_deref()));
        attrs.insert(
            "accepts_correspondence".into(),
            yes_no(user.accepts_correspondence).into(),
        );
        attrs.insert("address".into(), text_or_unspecified(user.address.as_deref()));
        attrs.insert("locality".into(), text_or_unspecified(user.display_locality()));
        attrs.insert("county".into(), text_or_unspecified(user.display_county()));
        attrs.insert(
            "country".into(),
            capitalize_words(or_default(user.country.as_deref(), UNSPECIFIED)).into(),
        );
        with_attribution(attrs)
    }
}

// ── Transactions report ──────────────────────────────────────────

/// Purchases over the configured history window; value is the count.
#[derive(Debug, Clone)]
pub struct TransactionsReport {
    unique_id: String,
}

impl TransactionsReport {
    pub fn new(account: &str, entry_id: &str) -> Self {
        Self {
            unique_id: SensorKind::TransactionsReport.unique_id(account, entry_id),
        }
    }
}

impl ObservableValue for TransactionsReport {
    fn kind(&self) -> SensorKind {
        SensorKind::TransactionsReport
    }

    fn name(&self) -> String {
        "Transactions report".into()
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> SensorValue {
        SensorValue::count(snapshot.transactions.len())
    }

    fn attributes(&self, snapshot: &Snapshot, _now: DateTime<Utc>) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(
            "analysed_period".into(),
            format!("last {} years", snapshot.history_years).into(),
        );
        attrs.insert(
            "invoice_count".into(),
            SensorValue::count(snapshot.transactions.len()),
        );
        attrs.insert(
            "total_paid".into(),
            ron(total_paid(&snapshot.transactions)).into(),
        );
        with_attribution(attrs)
    }
}
