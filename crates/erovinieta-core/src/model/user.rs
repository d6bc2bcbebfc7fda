// ── Account profile domain type ──

use serde::{Deserialize, Serialize};

/// The logged-in account's profile.
///
/// Every field is optional: a failed profile fetch yields
/// `UserProfile::default()` and the rest of the snapshot is unaffected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Portal account id, rendered as text (the portal uses numbers or strings).
    pub id: Option<String>,
    pub full_name: Option<String>,
    /// CNP for individuals, CUI for companies.
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub natural_person: bool,
    pub accepts_correspondence: bool,
    pub address: Option<String>,
    pub country: Option<String>,
    /// Structured county/locality, populated for Romanian addresses.
    pub county: Option<String>,
    pub locality: Option<String>,
    /// Free-text county/locality, used for foreign addresses.
    pub county_text: Option<String>,
    pub locality_text: Option<String>,
}

impl UserProfile {
    /// `true` when the account's country is Romania, which switches the
    /// address to the portal's structured county/locality fields.
    pub fn is_domestic(&self) -> bool {
        self.country
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case("romania"))
    }

    /// County as the portal would display it.
    pub fn display_county(&self) -> Option<&str> {
        if self.is_domestic() {
            self.county.as_deref()
        } else {
            self.county_text.as_deref()
        }
    }

    /// Locality as the portal would display it.
    pub fn display_locality(&self) -> Option<&str> {
        if self.is_domestic() {
            self.locality.as_deref()
        } else {
            self.locality_text.as_deref()
        }
    }
}
