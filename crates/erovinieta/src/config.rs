//! CLI configuration: thin wrapper around `erovinieta_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--username, --base-url, --interval, ...).

use erovinieta_core::IntegrationConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use erovinieta_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
    store_password,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Apply flag overrides on top of a profile. Flags win.
pub fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref base_url) = global.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if let Some(interval) = global.interval {
        profile.update_interval = Some(interval);
    }
    if let Some(years) = global.history_years {
        profile.history_years = Some(years);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

/// Build an `IntegrationConfig` from the config file, profile, and flags.
///
/// Without a matching profile, `--username` (or `EROVINIETA_USERNAME`) is
/// enough; the password then comes from the env var or keyring.
pub fn build_integration_config(global: &GlobalOpts) -> Result<IntegrationConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let base = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.username.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let profile = apply_overrides(base, global);
    Ok(erovinieta_config::profile_to_integration_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Comma-separated profile names, or `(none)`.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
