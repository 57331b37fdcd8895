//! Poller implementation

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::api::{ApiError, RemoteApi};
use crate::config::PollConfig;
use crate::dispatch::{DispatchReport, Dispatcher};

/// State protected by the single-flight lock
struct PollState {
    /// Start of the most recent fetch attempt
    last_fetch: Instant,
}

/// Result of a timer tick
#[derive(Debug)]
pub enum TickOutcome {
    /// Too soon after the previous attempt; nothing was sent
    Throttled { remaining: Duration },

    /// A fetch was attempted
    Ran(Result<DispatchReport, ApiError>),
}

impl TickOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, TickOutcome::Ran(_))
    }
}

/// Owns the poll state and serializes every fetch-dispatch-ack cycle
pub struct Poller {
    api: Arc<dyn RemoteApi>,
    dispatcher: Dispatcher,
    config: PollConfig,
    state: Mutex<PollState>,
}

impl Poller {
    /// Create a poller; the guard clock starts now
    pub fn new(api: Arc<dyn RemoteApi>, dispatcher: Dispatcher, config: PollConfig) -> Self {
        debug!(?config, "Poller::new: called");
        Self {
            api,
            dispatcher,
            config,
            state: Mutex::new(PollState {
                last_fetch: Instant::now(),
            }),
        }
    }

    /// Timer-driven attempt, subject to the minimum interval
    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Instant::now()).await
    }

    /// Timer-driven attempt as if the clock read `now`
    pub async fn tick_at(&self, now: Instant) -> TickOutcome {
        let mut state = self.state.lock().await;

        let elapsed = now.saturating_duration_since(state.last_fetch);
        let min_interval = self.config.min_interval();
        if elapsed < min_interval {
            debug!(?elapsed, ?min_interval, "Poller::tick_at: throttled");
            return TickOutcome::Throttled {
                remaining: min_interval - elapsed,
            };
        }

        // Stamp before the network call so a slow fetch cannot be overlapped.
        state.last_fetch = now;

        let result = self.run_cycle().await;
        if let Err(e) = &result {
            match e.status() {
                Some(code) => error!(code, "Unable to fetch data from the command API (code {})", code),
                None => error!(error = %e, "Unable to fetch data from the command API"),
            }
        }
        TickOutcome::Ran(result)
    }

    /// Operator-triggered attempt; ignores the minimum interval
    pub async fn force(&self) -> Result<DispatchReport, ApiError> {
        self.force_at(Instant::now()).await
    }

    pub async fn force_at(&self, now: Instant) -> Result<DispatchReport, ApiError> {
        debug!("Poller::force_at: called");
        let mut state = self.state.lock().await;
        state.last_fetch = now;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> Result<DispatchReport, ApiError> {
        let batch = self.api.fetch_queue().await?;
        debug!(batch_len = batch.len(), "Poller::run_cycle: fetched batch");
        Ok(self.dispatcher.dispatch(&batch).await)
    }

    /// Tick on the configured cadence until `shutdown` resolves
    ///
    /// Ticks are stamped with their scheduled instant so jitter does not trip
    /// the minimum-interval guard when both are equal.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            interval_secs = self.config.interval_secs,
            min_interval_secs = self.config.min_interval_secs,
            "Poller started"
        );

        let period = self.config.interval();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Poller stopping");
                    break;
                }
                fired = interval.tick() => {
                    self.tick_at(fired.into_std()).await;
                }
            }
        }
    }
}
