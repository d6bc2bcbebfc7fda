//! Polling layer between `erovinieta-api` and its consumers.
//!
//! - **[`Integration`]**: lifecycle handle for one configured account.
//!   [`setup()`](Integration::setup) authenticates, runs the first poll
//!   cycle, builds the observable values and starts the timer;
//!   [`teardown()`](Integration::teardown) stops it.
//!
//! - **[`Coordinator`]**: runs poll cycles sequentially and publishes one
//!   immutable [`Snapshot`] per cycle. Failing fetch steps are replaced by
//!   empty values; a failed cycle keeps the previous snapshot.
//!
//! - **Observable values** ([`sensor`]): named readings derived from the
//!   current snapshot (active vignette, unpaid crossings, toll balance, ...).
//!
//! - **Domain model** ([`model`]): portal data after default substitution.

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod integration;
pub mod model;
pub mod sensor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_BASE_URL, IntegrationConfig, PollOptions};
pub use coordinator::{Coordinator, CycleState};
pub use error::CoreError;
pub use integration::Integration;
pub use sensor::{ObservableValue, Reading, SensorKind, SensorValue};

pub use model::{
    Country, Detection, Snapshot, Transaction, UserProfile, Vehicle, VehicleIdentity, Vignette,
};
