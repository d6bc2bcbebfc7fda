// ── Polling coordinator ──
//
// Runs poll cycles against the portal and publishes one immutable
// `Snapshot` per cycle. Each fetch step is isolated: a failing endpoint
// (or a failing vehicle) is logged and replaced by an empty value, never
// aborting the cycle. Only a failure that escapes the steps themselves
// fails the cycle, and then the previous snapshot stays published.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Months, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use erovinieta_api::models::DetectionQuery;
use erovinieta_api::{DEFAULT_PAGE_SIZE, SessionClient};

use crate::config::PollOptions;
use crate::error::CoreError;
use crate::model::{Country, Detection, Snapshot, Transaction, UserProfile, Vehicle};

// ── CycleState ───────────────────────────────────────────────────

/// Where the coordinator is in its current (or last) poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CycleState {
    Idle,
    Fetching,
    Merging,
    Published,
    FailedTotal,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the current snapshot and the poll schedule.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Cycles are serialized: a
/// manual [`refresh()`](Self::refresh) and a timer tick never overlap.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: Arc<SessionClient>,
    options: watch::Sender<PollOptions>,
    snapshot: ArcSwapOption<Snapshot>,
    state: watch::Sender<CycleState>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    last_update_success: AtomicBool,
    /// Held for the duration of a cycle.
    cycle: Mutex<()>,
    cancel: CancellationToken,
    timer: std::sync::Mutex<Option<Timer>>,
}

/// The running periodic refresh task and its own stop token.
struct Timer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Coordinator {
    /// Create a coordinator around an (ideally already authenticated) client.
    /// Does NOT poll: call [`refresh()`](Self::refresh) and [`start()`](Self::start).
    pub fn new(client: Arc<SessionClient>, options: PollOptions) -> Self {
        let (options, _) = watch::channel(options);
        let (state, _) = watch::channel(CycleState::Idle);
        let (last_refresh, _) = watch::channel(None);

        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                options,
                snapshot: ArcSwapOption::empty(),
                state,
                last_refresh,
                last_update_success: AtomicBool::new(false),
                cycle: Mutex::new(()),
                cancel: CancellationToken::new(),
                timer: std::sync::Mutex::new(None),
            }),
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.inner.client
    }

    /// Current poll options.
    pub fn options(&self) -> PollOptions {
        *self.inner.options.borrow()
    }

    /// The most recently published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Subscribe to the completion time of each successful cycle.
    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_refresh.subscribe()
    }

    pub fn state(&self) -> CycleState {
        *self.inner.state.borrow()
    }

    /// Whether the last cycle published a snapshot.
    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    // ── Cycles ───────────────────────────────────────────────────

    /// Run one poll cycle and publish its snapshot.
    ///
    /// Waits for any cycle already in flight. The cycle itself runs on a
    /// spawned task, so a panic inside it surfaces here as
    /// [`CoreError::UpdateFailed`] with the previous snapshot untouched.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let _cycle = self.inner.cycle.lock().await;
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let worker = self.clone();
        let mut task = tokio::spawn(async move { worker.run_cycle().await });
        let abort = task.abort_handle();

        let joined = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => {
                abort.abort();
                self.inner.state.send_replace(CycleState::Idle);
                debug!("poll cycle abandoned on shutdown");
                return Err(CoreError::Cancelled);
            }
            joined = &mut task => joined,
        };

        let outcome = match joined {
            Ok(result) => result.map_err(|e| match e {
                CoreError::UpdateFailed { .. } => e,
                other => CoreError::UpdateFailed {
                    message: other.to_string(),
                },
            }),
            Err(e) if e.is_panic() => Err(CoreError::UpdateFailed {
                message: "poll cycle panicked".into(),
            }),
            Err(e) => Err(CoreError::UpdateFailed {
                message: format!("poll cycle did not complete: {e}"),
            }),
        };

        match outcome {
            Ok(snapshot) => Ok(self.publish(snapshot)),
            Err(e) => {
                error!(error = %e, "poll cycle failed, keeping previous snapshot");
                self.inner.last_update_success.store(false, Ordering::Release);
                self.inner.state.send_replace(CycleState::FailedTotal);
                Err(e)
            }
        }
    }

    fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.inner.snapshot.store(Some(Arc::clone(&snapshot)));
        self.inner.last_update_success.store(true, Ordering::Release);
        self.inner.state.send_replace(CycleState::Published);
        self.inner.last_refresh.send_replace(Some(snapshot.fetched_at));
        info!(
            vehicles = snapshot.vehicles.len(),
            crossings = snapshot.all_crossings.len(),
            transactions = snapshot.transactions.len(),
            "snapshot published"
        );
        snapshot
    }

    /// Steps 1-6 of a cycle: sequential fetches, each isolated, then merge.
    async fn run_cycle(&self) -> Result<Snapshot, CoreError> {
        self.inner.state.send_replace(CycleState::Fetching);
        let client = &self.inner.client;
        debug!("poll cycle started");

        let user = or_empty("user data", client.get_user_data().await)
            .map(UserProfile::from)
            .unwrap_or_default();

        let vehicles: Vec<Vehicle> = or_empty(
            "vehicles",
            client.get_paginated_vehicles(DEFAULT_PAGE_SIZE, 0).await,
        )
        .map(|page| page.into_rows().into_iter().map(Vehicle::from).collect())
        .unwrap_or_default();

        let countries: Vec<Country> = or_empty("countries", client.get_countries().await)
            .map(|list| list.into_iter().map(Country::from).collect())
            .unwrap_or_default();

        let crossings_by_plate = self.fetch_crossings(&vehicles).await;

        // Read fresh so an options change applies from the next cycle on.
        let history_years = self.options().history_years;
        let (date_from, date_to) = history_window(Utc::now(), history_years)?;
        let transactions: Vec<Transaction> = or_empty(
            "transactions",
            client.get_transactions(date_from, date_to).await,
        )
        .map(|page| page.into_rows().into_iter().map(Transaction::from).collect())
        .unwrap_or_default();

        self.inner.state.send_replace(CycleState::Merging);
        Ok(Snapshot::assemble(
            user,
            vehicles,
            countries,
            transactions,
            crossings_by_plate,
            history_years,
            Utc::now(),
        ))
    }

    /// Step 4: detections for every vehicle with a complete identity.
    ///
    /// A failure for one vehicle records an empty list for that plate only.
    async fn fetch_crossings(&self, vehicles: &[Vehicle]) -> BTreeMap<String, Vec<Detection>> {
        let mut by_plate = BTreeMap::new();
        for vehicle in vehicles {
            let Some(id) = vehicle.identity() else {
                warn!(
                    vin = vehicle.vin.as_deref().unwrap_or("N/A"),
                    plate = vehicle.plate.as_deref().unwrap_or("N/A"),
                    "skipping vehicle with incomplete identity"
                );
                continue;
            };

            let query = DetectionQuery::new(&id.vin, &id.plate, &id.certificate_series);
            let detections = match self.inner.client.get_bridge_crossings(&query).await {
                Ok(list) => list
                    .detection_list
                    .unwrap_or_default()
                    .into_iter()
                    .map(Detection::from)
                    .collect(),
                Err(e) => {
                    warn!(
                        plate = %id.plate,
                        error = %e,
                        "crossings unavailable, treating as empty"
                    );
                    Vec::new()
                }
            };
            by_plate.insert(id.plate, detections);
        }
        by_plate
    }

    // ── Schedule ─────────────────────────────────────────────────

    /// Spawn the periodic refresh task at the current interval.
    ///
    /// The first tick is skipped: callers run the initial refresh themselves.
    pub fn start(&self) {
        self.spawn_timer(false);
    }

    /// Apply new options: rebuild the timer at the new interval and request
    /// an immediate refresh. The new history length is read by that cycle.
    pub fn set_options(&self, options: PollOptions) -> Result<(), CoreError> {
        options.validate()?;
        self.inner.options.send_replace(options);
        info!(
            interval_secs = options.update_interval.as_secs(),
            history_years = options.history_years,
            "poll options updated"
        );
        self.spawn_timer(true);
        Ok(())
    }

    fn spawn_timer(&self, fire_immediately: bool) {
        let period = self.options().update_interval;
        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(refresh_task(
            self.clone(),
            period,
            fire_immediately,
            cancel.clone(),
        ));

        let previous = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Timer { cancel, handle });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
    }

    /// Whether a periodic refresh task is scheduled.
    pub fn is_running(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Stop polling. An in-flight cycle is abandoned and the published
    /// snapshot is left as it was. Returns `false` if the background task
    /// did not exit cleanly.
    pub async fn shutdown(&self) -> bool {
        self.inner.cancel.cancel();
        let timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let clean = match timer {
            Some(timer) => timer.handle.await.is_ok(),
            None => true,
        };
        debug!(clean, "coordinator stopped");
        clean
    }
}

/// Periodically refresh the snapshot until cancelled.
async fn refresh_task(
    coordinator: Coordinator,
    period: Duration,
    fire_immediately: bool,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !fire_immediately {
        interval.tick().await; // consume the immediate first tick
    }

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Log a failed fetch step and hand back `None` so the caller substitutes
/// an empty value.
fn or_empty<T>(step: &str, result: Result<T, erovinieta_api::Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(step, error = %e, "fetch failed, substituting empty value");
            None
        }
    }
}

/// Transaction window `[now - years, now]` in epoch milliseconds.
///
/// The lower bound steps back `years * 12` calendar months.
pub fn history_window(now: DateTime<Utc>, years: u8) -> Result<(i64, i64), CoreError> {
    if !(PollOptions::MIN_HISTORY_YEARS..=PollOptions::MAX_HISTORY_YEARS).contains(&years) {
        return Err(CoreError::Config {
            message: format!("invalid transaction history length: {years} years"),
        });
    }
    let from = now
        .checked_sub_months(Months::new(u32::from(years) * 12))
        .ok_or_else(|| CoreError::Config {
            message: format!("transaction history of {years} years is out of range"),
        })?;
    Ok((from.timestamp_millis(), now.timestamp_millis()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use erovinieta_api::TransportConfig;

    use super::*;

    #[test]
    fn window_steps_back_calendar_years() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let (from, to) = history_window(now, 2).unwrap();
        assert_eq!(to, now.timestamp_millis());
        assert_eq!(
            from,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn window_clamps_leap_day() {
        let now = Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap();
        let (from, _) = history_window(now, 1).unwrap();
        assert_eq!(
            from,
            Utc.with_ymd_and_hms(2027, 2, 28, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn window_rejects_out_of_range_years() {
        let now = Utc::now();
        assert!(history_window(now, 0).is_err());
        assert!(history_window(now, 11).is_err());
    }

    #[test]
    fn cycle_state_renders_snake_case() {
        assert_eq!(CycleState::FailedTotal.to_string(), "failed_total");
    }

    async fn portal() -> (MockServer, Arc<SessionClient>) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/j_spring_security_check"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "JSESSIONID=abc; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/client/vehicle/getVehiclesPaginated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "view": [{ "entity": { "vin": "V1", "plateNo": "B1ABC", "certificateSeries": "C1" } }]
            })))
            .mount(&server)
            .await;
        let client = SessionClient::new(
            &server.uri(),
            "user",
            SecretString::from("pw".to_owned()),
            &TransportConfig::default(),
        )
        .unwrap();
        (server, Arc::new(client))
    }

    #[tokio::test]
    async fn invalid_history_fails_cycle_and_keeps_previous_snapshot() {
        let (_server, client) = portal().await;
        let coordinator = Coordinator::new(client, PollOptions::default());

        let first = coordinator.refresh().await.unwrap();
        assert_eq!(first.vehicles.len(), 1);
        assert_eq!(coordinator.state(), CycleState::Published);

        // Bypass validation to force the window computation to fail.
        coordinator
            .inner
            .options
            .send_replace(PollOptions::new(PollOptions::DEFAULT_INTERVAL, 0));

        let err = coordinator.refresh().await.unwrap_err();
        assert!(matches!(err, CoreError::UpdateFailed { .. }), "got: {err:?}");
        assert_eq!(coordinator.state(), CycleState::FailedTotal);
        assert!(!coordinator.last_update_success());
        assert!(Arc::ptr_eq(&coordinator.snapshot().unwrap(), &first));
    }

    #[tokio::test]
    async fn refresh_after_shutdown_is_cancelled() {
        let (_server, client) = portal().await;
        let coordinator = Coordinator::new(client, PollOptions::default());
        coordinator.start();
        assert!(coordinator.is_running());

        assert!(coordinator.shutdown().await);
        assert!(!coordinator.is_running());
        assert!(matches!(
            coordinator.refresh().await,
            Err(CoreError::Cancelled)
        ));
        assert!(coordinator.snapshot().is_none());
    }
}
