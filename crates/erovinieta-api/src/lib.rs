// erovinieta-api: Async Rust client for the erovinieta.ro customer portal

pub mod endpoints;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use endpoints::DEFAULT_PAGE_SIZE;
pub use error::Error;
pub use session::{SESSION_COOKIE, SessionClient, SessionToken};
pub use transport::{SessionJar, TransportConfig};
