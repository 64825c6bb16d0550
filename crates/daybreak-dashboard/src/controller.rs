//! Dashboard orchestration: the periodic refresh cycle and the narration trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use daybreak_core::Config;
use daybreak_insight::{InsightClient, InsightProvider};
use daybreak_narration::NarrationService;
use daybreak_weather::{LocationProvider, WeatherClient, WeatherSnapshot, DEFAULT_LOCATION_TIMEOUT};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::DashboardError;
use crate::narration::{compose_narration, date_label};
use crate::state::{DashboardPhase, DashboardState};

/// Default refresh cadence: one hour
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(3_600_000);

/// Tunables for the refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub location_timeout: Duration,
    pub refresh_interval: Duration,
    pub insight_provider: InsightProvider,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            insight_provider: InsightProvider::Primary,
        }
    }
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        let insight_provider = config
            .insight
            .provider
            .parse::<InsightProvider>()
            .unwrap_or_else(|e| {
                warn!("{}, using primary insight provider", e);
                InsightProvider::Primary
            });

        Self {
            location_timeout: config.location.timeout(),
            refresh_interval: config.dashboard.refresh_interval(),
            insight_provider,
        }
    }
}

/// Clears an in-flight flag when the owning future finishes or is dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the dashboard state and the components that feed it
pub struct DashboardController {
    location: Arc<dyn LocationProvider>,
    weather: WeatherClient,
    insight: InsightClient,
    narration: Arc<NarrationService>,
    settings: DashboardSettings,
    state_tx: watch::Sender<DashboardState>,
    refreshing: AtomicBool,
    narrating: AtomicBool,
    cancel: CancellationToken,
}

impl DashboardController {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        weather: WeatherClient,
        insight: InsightClient,
        narration: Arc<NarrationService>,
        settings: DashboardSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(DashboardState::default());
        Self {
            location,
            weather,
            insight,
            narration,
            settings,
            state_tx,
            refreshing: AtomicBool::new(false),
            narrating: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Receiver that sees every published state
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    /// Stop the refresh loop. Results of work still in flight are discarded.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn publish(&self, update: impl FnOnce(&mut DashboardState)) {
        if self.cancel.is_cancelled() {
            debug!("Controller shut down, discarding state update");
            return;
        }
        self.state_tx.send_modify(update);
    }

    /// Run one refresh cycle. A call made while another refresh is in flight
    /// returns immediately.
    #[instrument(skip(self), level = "info")]
    pub async fn refresh(&self) {
        let Some(_guard) = InFlight::acquire(&self.refreshing) else {
            debug!("Refresh already in flight, skipping");
            return;
        };

        self.publish(|s| {
            s.phase = DashboardPhase::Loading;
            s.is_loading = s.weather.is_none();
            s.last_error = None;
        });

        let weather = match self.load_weather().await {
            Ok(weather) => weather,
            Err(e) => {
                warn!("Refresh failed: {}", e);
                self.publish(|s| {
                    s.phase = DashboardPhase::Error;
                    s.is_loading = false;
                    s.last_error = Some(e.user_message().to_string());
                });
                return;
            }
        };

        let condition = weather.condition_text.clone();
        info!(
            place = %weather.place_name,
            condition = %condition,
            temperature = weather.temperature_celsius,
            "Weather updated"
        );
        self.publish(|s| {
            s.weather = Some(weather);
            s.is_loading = false;
        });

        let label = date_label(&Local::now());
        let insight = self
            .insight
            .get_cultural_insight(&label, &condition, self.settings.insight_provider)
            .await;

        self.publish(|s| {
            s.insight = Some(insight);
            s.phase = DashboardPhase::Ready;
        });
    }

    async fn load_weather(&self) -> Result<WeatherSnapshot, DashboardError> {
        let coords = self
            .location
            .current_coordinates(self.settings.location_timeout)
            .await?;
        debug!("Got location: {}, {}", coords.latitude, coords.longitude);

        Ok(self.weather.fetch_snapshot(&coords).await?)
    }

    /// Speak the date, time and current weather. No-op while a narration is
    /// already playing.
    #[instrument(skip(self), level = "info")]
    pub async fn narrate(&self) {
        let Some(_guard) = InFlight::acquire(&self.narrating) else {
            debug!("Narration already in progress, ignoring trigger");
            return;
        };

        self.publish(|s| s.is_narrating = true);

        let text = compose_narration(&Local::now(), self.state_tx.borrow().weather.as_ref());
        self.narration.speak(&text).await;

        self.publish(|s| s.is_narrating = false);
    }

    /// Spawn the periodic refresh task. The first refresh runs immediately.
    pub fn start(self: &Arc<Self>) -> DashboardHandle {
        let controller = Arc::clone(self);
        let token = self.cancel.clone();
        // tokio intervals panic on a zero period
        let period = self.settings.refresh_interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = controller.refresh() => {}
                        }
                    }
                }
            }
            debug!("Dashboard refresh loop stopped");
        });

        info!(interval_ms = period.as_millis() as u64, "Dashboard refresh loop started");
        DashboardHandle {
            cancel: self.cancel.clone(),
            task: Some(task),
        }
    }
}

/// Keeps the refresh loop alive; dropping it tears the loop down
pub struct DashboardHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Cancel the loop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Dashboard refresh task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
