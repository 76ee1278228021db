//! Forecast/advice state machine shared by all presentation surfaces.
//!
//! The forecast ("primary") fetch and the advice ("derived") fetch are
//! independent triggers. A successful primary fetch broadcasts
//! [`CoordinatorEvent::PrimaryReady`]; [`Coordinator::spawn_advice_chain`]
//! turns that event into a derived fetch. Failures never escape a trigger,
//! they are folded into the published [`Snapshot`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use stylecast_advice::{AdviceClient, AdviceError, PromptContext};
use stylecast_core::{Config, Status};
use stylecast_weather::{ForecastClient, ForecastError, ForecastResult};

use crate::event::CoordinatorEvent;
use crate::snapshot::Snapshot;

const EVENT_CAPACITY: usize = 16;

/// Runtime knobs for a coordinator instance.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub primary_timeout: Duration,
    pub derived_timeout: Duration,
    /// Place name passed to the advice prompt
    pub location_name: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary_timeout: config.coordinator.primary_timeout(),
            derived_timeout: config.coordinator.derived_timeout(),
            location_name: config.forecast.location_name.clone(),
        }
    }
}

struct State {
    snapshot: Snapshot,
    /// Temperature keys with a derived fetch in flight
    advice_in_flight: HashSet<u64>,
    /// Temperature key the stored advice was produced for
    advice_for: Option<u64>,
    /// Most recently started derived fetch; only its completion is applied
    latest_advice_request: Option<u64>,
}

struct Inner {
    forecast: Arc<dyn ForecastClient>,
    advice: Arc<dyn AdviceClient>,
    settings: CoordinatorSettings,
    state: Mutex<State>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    events_tx: broadcast::Sender<CoordinatorEvent>,
    shutdown: CancellationToken,
}

/// Cloneable handle to one coordinator. Clones share state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Coordinator")
            .field("status", &snapshot.status)
            .field("version", &snapshot.version)
            .field("settings", &self.inner.settings)
            .finish()
    }
}

/// Dedup key for a temperature. `-0.0` and `0.0` share a key.
fn temperature_key(temperature: f64) -> u64 {
    if temperature == 0.0 {
        0.0f64.to_bits()
    } else {
        temperature.to_bits()
    }
}

impl Coordinator {
    pub fn new(
        forecast: Arc<dyn ForecastClient>,
        advice: Arc<dyn AdviceClient>,
        settings: CoordinatorSettings,
    ) -> Self {
        let snapshot = Snapshot::default();
        let (snapshot_tx, _) = watch::channel(Arc::new(snapshot.clone()));
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                forecast,
                advice,
                settings,
                state: Mutex::new(State {
                    snapshot,
                    advice_in_flight: HashSet::new(),
                    advice_for: None,
                    latest_advice_request: None,
                }),
                snapshot_tx,
                events_tx,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receiver that observes every published snapshot. All receivers see
    /// the same `Arc` after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Receiver for change notifications.
    pub fn events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Fetch the forecast. A no-op while another forecast fetch is in flight.
    pub async fn fetch_primary(&self) {
        let mut guard = {
            let mut state = self.inner.state.lock();
            if !state.snapshot.status.can_start_primary() {
                tracing::debug!("Forecast fetch already in flight, ignoring trigger");
                return;
            }
            let guard = PrimaryFetchGuard {
                coordinator: self,
                prior_status: state.snapshot.status,
                prior_error: state.snapshot.error_message.take(),
                finished: false,
            };
            state.snapshot.status = Status::LoadingPrimary;
            self.publish(&mut state);
            guard
        };

        tracing::info!("Fetching forecast");
        let timeout = self.inner.settings.primary_timeout;
        let result = match tokio::time::timeout(timeout, self.inner.forecast.get_forecast()).await {
            Ok(result) => result,
            Err(_) => Err(ForecastError::Timeout(timeout)),
        };
        guard.finished = true;

        match result {
            Ok(forecast) => self.apply_forecast(forecast),
            Err(e) => self.apply_forecast_error(&e),
        }
    }

    fn apply_forecast(&self, forecast: ForecastResult) {
        let temperature = forecast.current_temperature;
        {
            let mut state = self.inner.state.lock();
            let snapshot = &mut state.snapshot;
            snapshot.temperature = Some(temperature);
            snapshot.hourly_series = forecast.hourly_series;
            snapshot.updated_at = Some(forecast.fetched_at);
            snapshot.status = snapshot.status.on_primary_success();
            snapshot.error_message = None;
            self.publish(&mut state);
        }

        tracing::info!("Forecast ready: {}°C", temperature);
        self.emit(CoordinatorEvent::PrimaryReady { temperature });
    }

    fn apply_forecast_error(&self, error: &ForecastError) {
        tracing::error!(kind = ?error.kind(), "Failed to fetch forecast: {}", error);

        let mut state = self.inner.state.lock();
        // Last known temperature and series stay visible
        state.snapshot.status = state.snapshot.status.on_primary_failure();
        state.snapshot.error_message = Some(error.user_message().to_string());
        self.publish(&mut state);
    }

    /// Generate advice for `temperature`. A no-op if advice for the same
    /// temperature is in flight or already stored. Non-finite temperatures
    /// are ignored.
    pub async fn fetch_derived(&self, temperature: f64) {
        if !temperature.is_finite() {
            tracing::warn!("Ignoring advice request for non-finite temperature {}", temperature);
            return;
        }
        let key = temperature_key(temperature);

        {
            let mut state = self.inner.state.lock();
            if state.advice_in_flight.contains(&key) {
                tracing::debug!("Advice for {}°C already in flight", temperature);
                if state.latest_advice_request != Some(key) {
                    // Asked for again after a newer request; the pending
                    // completion becomes the one to apply.
                    self.mark_latest_advice_request(&mut state, key);
                }
                return;
            }
            if state.advice_for == Some(key) && state.snapshot.advice.is_some() {
                tracing::debug!("Advice for {}°C already available", temperature);
                return;
            }

            state.advice_in_flight.insert(key);
            self.mark_latest_advice_request(&mut state, key);
        }
        let mut guard = AdviceFetchGuard {
            coordinator: self,
            key,
            finished: false,
        };

        tracing::info!("Requesting advice for {}°C", temperature);
        let context = PromptContext::new(temperature, self.inner.settings.location_name.clone());
        let timeout = self.inner.settings.derived_timeout;
        let result = match tokio::time::timeout(timeout, self.inner.advice.generate_advice(&context)).await {
            Ok(result) => result,
            Err(_) => Err(AdviceError::Timeout(timeout)),
        };
        guard.finished = true;

        let text = match result.and_then(|text| {
            if text.trim().is_empty() {
                Err(AdviceError::EmptyResponse)
            } else {
                Ok(text)
            }
        }) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), "Advice generation failed: {}", e);
                e.fallback_message().to_string()
            }
        };

        let applied = {
            let mut state = self.inner.state.lock();
            state.advice_in_flight.remove(&key);
            if state.latest_advice_request == Some(key) {
                state.snapshot.advice = Some(text);
                state.snapshot.advice_loading = false;
                state.advice_for = Some(key);
                self.publish(&mut state);
                true
            } else {
                tracing::debug!("Discarding superseded advice for {}°C", temperature);
                false
            }
        };

        if applied {
            self.emit(CoordinatorEvent::AdviceUpdated { temperature });
        }
    }

    fn mark_latest_advice_request(&self, state: &mut State, key: u64) {
        state.latest_advice_request = Some(key);
        if state.advice_for != Some(key) {
            state.snapshot.advice = None;
            state.advice_for = None;
        }
        state.snapshot.advice_loading = true;
        self.publish(state);
    }

    /// Spawn [`fetch_primary`](Self::fetch_primary) on the current runtime.
    pub fn request_primary(&self) -> JoinHandle<()> {
        let this = self.clone();
        self.spawn_cancellable(async move { this.fetch_primary().await })
    }

    /// Spawn [`fetch_derived`](Self::fetch_derived) on the current runtime.
    pub fn request_derived(&self, temperature: f64) -> JoinHandle<()> {
        let this = self.clone();
        self.spawn_cancellable(async move { this.fetch_derived(temperature).await })
    }

    /// Listen for `PrimaryReady` and request advice for each new temperature.
    ///
    /// The listener stops on [`shutdown`](Self::shutdown) or once every
    /// coordinator handle has been dropped.
    pub fn spawn_advice_chain(&self) -> JoinHandle<()> {
        let mut events = self.events();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let token = self.inner.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => event,
                };

                let Some(inner) = weak.upgrade() else { break };
                let coordinator = Coordinator { inner };

                match event {
                    Ok(CoordinatorEvent::PrimaryReady { temperature }) => {
                        coordinator.request_derived(temperature);
                    }
                    Ok(CoordinatorEvent::AdviceUpdated { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Advice chain lagged behind coordinator events");
                        let snapshot = coordinator.snapshot();
                        if let (Status::Ready, Some(temperature)) = (snapshot.status, snapshot.temperature) {
                            coordinator.request_derived(temperature);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Advice chain stopped");
        })
    }

    /// Stop the advice chain and abandon spawned triggers.
    pub fn shutdown(&self) {
        tracing::info!("Coordinator shutdown");
        self.inner.shutdown.cancel();
    }

    fn spawn_cancellable<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.inner.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => tracing::debug!("Trigger abandoned on shutdown"),
                _ = task => {}
            }
        })
    }

    /// Publish the current state. Called with the state lock held so that
    /// publication order matches mutation order.
    fn publish(&self, state: &mut State) {
        state.snapshot.version += 1;
        self.inner
            .snapshot_tx
            .send_replace(Arc::new(state.snapshot.clone()));
    }

    fn emit(&self, event: CoordinatorEvent) {
        if self.inner.events_tx.send(event).is_err() {
            tracing::trace!("No event listeners for {:?}", event);
        }
    }
}

/// Rolls back a forecast fetch that was dropped before its client call
/// returned, so the next trigger can start a new one.
struct PrimaryFetchGuard<'a> {
    coordinator: &'a Coordinator,
    prior_status: Status,
    prior_error: Option<String>,
    finished: bool,
}

impl Drop for PrimaryFetchGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.coordinator.inner.state.lock();
        if state.snapshot.status == Status::LoadingPrimary {
            tracing::debug!("Forecast fetch abandoned, restoring {:?}", self.prior_status);
            state.snapshot.status = self.prior_status;
            state.snapshot.error_message = self.prior_error.take();
            self.coordinator.publish(&mut state);
        }
    }
}

/// Releases the dedup slot of an advice fetch that was dropped before its
/// client call returned.
struct AdviceFetchGuard<'a> {
    coordinator: &'a Coordinator,
    key: u64,
    finished: bool,
}

impl Drop for AdviceFetchGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.coordinator.inner.state.lock();
        state.advice_in_flight.remove(&self.key);
        if state.latest_advice_request == Some(self.key) && state.snapshot.advice_loading {
            tracing::debug!("Advice fetch abandoned");
            state.snapshot.advice_loading = false;
            self.coordinator.publish(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_key_merges_signed_zero() {
        assert_eq!(temperature_key(0.0), temperature_key(-0.0));
        assert_ne!(temperature_key(5.0), temperature_key(5.5));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.coordinator.primary_timeout_secs = 3;
        config.forecast.location_name = "부산".to_string();

        let settings = CoordinatorSettings::from_config(&config);
        assert_eq!(settings.primary_timeout, Duration::from_secs(3));
        assert_eq!(settings.derived_timeout, Duration::from_secs(30));
        assert_eq!(settings.location_name, "부산");
    }
}
