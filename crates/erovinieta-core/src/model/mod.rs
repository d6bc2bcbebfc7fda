// ── Domain model ──

pub mod defaults;
pub mod detection;
pub mod snapshot;
pub mod transaction;
pub mod user;
pub mod vehicle;

pub use defaults::{Blank, non_blank, or_default};
pub use detection::Detection;
pub use snapshot::Snapshot;
pub use transaction::{Transaction, total_paid};
pub use user::UserProfile;
pub use vehicle::{Country, Vehicle, VehicleIdentity, Vignette};
