// ── Lifecycle handle ──
//
// Explicit handle for one configured account: built by `setup`, consumed by
// `teardown`. Callers keep it; nothing is registered globally.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use erovinieta_api::{SessionClient, TransportConfig};

use crate::config::{IntegrationConfig, PollOptions};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::Snapshot;
use crate::sensor::{ObservableValue, Reading, build_sensors};

/// A running integration: coordinator plus the observable values built from
/// its first snapshot.
pub struct Integration {
    entry_id: String,
    coordinator: Coordinator,
    sensors: Vec<Box<dyn ObservableValue>>,
}

impl Integration {
    /// Authenticate, run the first poll cycle, build the observable values
    /// and start the periodic timer.
    ///
    /// Any failure before the timer starts returns `Err` and leaves nothing
    /// running.
    pub async fn setup(config: IntegrationConfig) -> Result<Self, CoreError> {
        config.options.validate()?;

        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = SessionClient::new(
            config.base_url.as_str(),
            config.username.clone(),
            config.password.clone(),
            &transport,
        )?;
        client.authenticate().await?;

        let coordinator = Coordinator::new(Arc::new(client), config.options);
        let snapshot = match coordinator.refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                coordinator.shutdown().await;
                return Err(e);
            }
        };

        let sensors = build_sensors(&snapshot, &config.entry_id);
        coordinator.start();
        info!(
            entry_id = %config.entry_id,
            vehicles = snapshot.vehicles.len(),
            values = sensors.len(),
            "integration set up"
        );

        Ok(Self {
            entry_id: config.entry_id,
            coordinator,
            sensors,
        })
    }

    /// Stop polling. Returns `false` if the background task did not exit
    /// cleanly.
    pub async fn teardown(self) -> bool {
        let clean = self.coordinator.shutdown().await;
        info!(entry_id = %self.entry_id, clean, "integration torn down");
        clean
    }

    /// Apply new poll options; triggers an immediate refresh.
    pub fn on_options_changed(&self, options: PollOptions) -> Result<(), CoreError> {
        self.coordinator.set_options(options)
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn sensors(&self) -> &[Box<dyn ObservableValue>] {
        &self.sensors
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, CoreError> {
        self.coordinator.snapshot().ok_or(CoreError::NotSetUp)
    }

    /// Evaluate every observable value against one loaded snapshot.
    pub fn readings(&self) -> Result<Vec<Reading>, CoreError> {
        let snapshot = self.snapshot()?;
        let now = Utc::now();
        Ok(self
            .sensors
            .iter()
            .map(|sensor| sensor.read(&snapshot, now))
            .collect())
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("entry_id", &self.entry_id)
            .field("sensors", &self.sensors.len())
            .finish_non_exhaustive()
    }
}
