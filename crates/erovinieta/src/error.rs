//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use erovinieta_config::ConfigError;
use erovinieta_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the portal: {reason}")]
    #[diagnostic(
        code(erovinieta::connection_failed),
        help(
            "Check your network connection and the portal URL.\n\
             Increase the timeout with --timeout if the portal is slow."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(erovinieta::auth_failed),
        help(
            "Verify your portal username and password.\n\
             Run: erovinieta config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(erovinieta::no_credentials),
        help(
            "Configure credentials with: erovinieta config init\n\
             Or set the EROVINIETA_USERNAME and EROVINIETA_PASSWORD environment variables."
        )
    )]
    NoCredentials { profile: String },

    // ── Portal ───────────────────────────────────────────────────────
    #[error(
        "Portal error{}: {message}",
        .status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
    )]
    #[diagnostic(code(erovinieta::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("Update failed: {message}")]
    #[diagnostic(
        code(erovinieta::update_failed),
        help("The previous data is kept; try again later.")
    )]
    UpdateFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(erovinieta::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(erovinieta::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: erovinieta config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(erovinieta::no_config),
        help(
            "Create one with: erovinieta config init\n\
             Or pass --username and set EROVINIETA_PASSWORD.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(erovinieta::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(code(erovinieta::keyring))]
    Keyring { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(erovinieta::internal))]
    Internal { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(erovinieta::json))]
    Json(#[from] serde_json::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(erovinieta::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Api {
                message,
                status: None,
            } => CliError::ConnectionFailed { reason: message },
            CoreError::Api { message, status } => CliError::ApiError { status, message },
            CoreError::UpdateFailed { message } => CliError::UpdateFailed { message },
            CoreError::Config { message } => CliError::Validation {
                field: "options".into(),
                reason: message,
            },
            CoreError::Cancelled => CliError::Internal {
                message: "polling was stopped".into(),
            },
            CoreError::NotSetUp => CliError::Internal {
                message: "no data has been published yet".into(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Internal {
                message: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
