// ── Runtime integration configuration ──
//
// These types describe *what* to poll and how often. They carry credential
// data and tuning, but never touch disk. The CLI builds an
// `IntegrationConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Portal application root used when a profile does not override it.
pub const DEFAULT_BASE_URL: &str = "https://www.erovinieta.ro/vignettes-portal-web/";

/// Options that may change while the integration is running.
///
/// The interval takes effect immediately (the timer is rebuilt); the history
/// length is re-read at the start of the next cycle's transaction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOptions {
    /// Time between poll cycles.
    #[serde(with = "duration_secs")]
    pub update_interval: Duration,
    /// How many years of transactions to request.
    pub history_years: u8,
}

impl PollOptions {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);
    pub const MIN_INTERVAL: Duration = Duration::from_secs(300);
    pub const MAX_INTERVAL: Duration = Duration::from_secs(86_400);

    pub const DEFAULT_HISTORY_YEARS: u8 = 2;
    pub const MIN_HISTORY_YEARS: u8 = 1;
    pub const MAX_HISTORY_YEARS: u8 = 10;

    pub fn new(update_interval: Duration, history_years: u8) -> Self {
        Self {
            update_interval,
            history_years,
        }
    }

    /// Reject intervals or history lengths outside the supported ranges.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(Self::MIN_INTERVAL..=Self::MAX_INTERVAL).contains(&self.update_interval) {
            return Err(CoreError::Config {
                message: format!(
                    "update interval must be between {}s and {}s, got {}s",
                    Self::MIN_INTERVAL.as_secs(),
                    Self::MAX_INTERVAL.as_secs(),
                    self.update_interval.as_secs()
                ),
            });
        }
        if !(Self::MIN_HISTORY_YEARS..=Self::MAX_HISTORY_YEARS).contains(&self.history_years) {
            return Err(CoreError::Config {
                message: format!(
                    "transaction history must be between {} and {} years, got {}",
                    Self::MIN_HISTORY_YEARS,
                    Self::MAX_HISTORY_YEARS,
                    self.history_years
                ),
            });
        }
        Ok(())
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_HISTORY_YEARS)
    }
}

/// Everything needed to set up one integration instance.
///
/// Built by the CLI, passed to `Integration::setup`; core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    /// Stable identifier of this configured account; suffixes every
    /// observable value's unique id.
    pub entry_id: String,
    /// Portal application root.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    pub options: PollOptions,
}

impl IntegrationConfig {
    /// Config against the public portal with default timeout and options.
    pub fn new(
        entry_id: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, CoreError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default portal URL: {e}"),
        })?;
        Ok(Self {
            entry_id: entry_id.into(),
            base_url,
            username: username.into(),
            password,
            timeout: erovinieta_api::transport::DEFAULT_TIMEOUT,
            options: PollOptions::default(),
        })
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PollOptions::default().validate().is_ok());
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        assert!(PollOptions::new(Duration::from_secs(300), 1).validate().is_ok());
        assert!(PollOptions::new(Duration::from_secs(86_400), 10).validate().is_ok());
        assert!(PollOptions::new(Duration::from_secs(299), 2).validate().is_err());
        assert!(PollOptions::new(Duration::from_secs(86_401), 2).validate().is_err());
    }

    #[test]
    fn history_years_out_of_range_is_rejected() {
        let err = PollOptions::new(PollOptions::DEFAULT_INTERVAL, 0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(
            PollOptions::new(PollOptions::DEFAULT_INTERVAL, 11)
                .validate()
                .is_err()
        );
    }
}
