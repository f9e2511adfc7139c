//! Background refresh scheduler.
//!
//! Two periodic jobs keep the daemon warm: refreshing the default cached
//! queries, and proactively renewing the OAuth token before it expires.
//! Refreshes get jitter to avoid thundering-herd patterns and exponential
//! backoff while the backend is failing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::handler::RequestHandler;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Base interval between default-query refreshes.
    pub refresh_interval: Duration,
    /// Interval between proactive token renewals.
    pub token_renew_interval: Duration,
    /// Maximum jitter added to the refresh interval (fraction 0.0-1.0).
    pub jitter_fraction: f64,
    /// Initial backoff after a failed refresh.
    pub initial_backoff: Duration,
    /// Maximum backoff.
    pub max_backoff: Duration,
    /// Backoff multiplier per consecutive failure.
    pub backoff_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(300),
            token_renew_interval: Duration::from_secs(3000),
            jitter_fraction: 0.1,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            backoff_multiplier: 2.0,
        }
    }
}

impl SchedulerConfig {
    /// Creates a config with the given intervals and default backoff.
    pub fn new(refresh_interval: Duration, token_renew_interval: Duration) -> Self {
        Self {
            refresh_interval,
            token_renew_interval,
            ..Default::default()
        }
    }

    /// Delay until the next refresh given the failure streak.
    pub fn next_refresh_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            let base = self.refresh_interval.as_secs_f64();
            let jitter = rand_jitter(base * self.jitter_fraction);
            return Duration::from_secs_f64((base + jitter).max(1.0));
        }

        let base = self.initial_backoff.as_secs_f64();
        let multiplier = self
            .backoff_multiplier
            .powi(consecutive_failures.saturating_sub(1) as i32);
        let delay = (base * multiplier).min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(delay)
    }
}

/// Pseudo-random jitter in `[-range, range]`, seeded from the clock.
fn rand_jitter(range: f64) -> f64 {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();

    let fraction = (nanos as f64) / 1_000_000_000.0;
    (fraction * 2.0 - 1.0) * range
}

/// Scheduler bookkeeping.
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// Consecutive failed refreshes.
    pub consecutive_failures: u32,
    /// Last fully successful refresh.
    pub last_success: Option<DateTime<Utc>>,
    /// Last refresh error, if any.
    pub last_error: Option<String>,
}

impl SchedulerState {
    /// Records a fully successful refresh.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_success = Some(Utc::now());
        self.last_error = None;
    }

    /// Records a failed refresh.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.consecutive_failures += 1;
        self.last_error = Some(error.into());
    }
}

/// Runs the background refresh loops until shutdown.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SchedulerState,
}

impl Scheduler {
    /// Creates a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::default(),
        }
    }

    /// Runs until the shutdown notifier fires.
    ///
    /// The first refresh happens immediately so the cache is warm before
    /// the first client request; token renewal waits one full interval
    /// (the first request acquires a token on demand anyway).
    pub async fn run(mut self, handler: Arc<RequestHandler>, shutdown: Arc<Notify>) {
        let mut next_refresh = Instant::now();
        let mut token_timer = tokio::time::interval_at(
            Instant::now() + self.config.token_renew_interval,
            self.config.token_renew_interval,
        );
        token_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            refresh_secs = self.config.refresh_interval.as_secs(),
            token_renew_secs = self.config.token_renew_interval.as_secs(),
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("scheduler stopping");
                    break;
                }
                _ = tokio::time::sleep_until(next_refresh) => {
                    let failures = handler.refresh_defaults().await;
                    if failures == 0 {
                        self.state.record_success();
                    } else {
                        self.state.record_failure(format!("{failures} default queries failed"));
                        warn!(
                            failures,
                            streak = self.state.consecutive_failures,
                            "background refresh incomplete"
                        );
                    }
                    let delay = self.config.next_refresh_delay(self.state.consecutive_failures);
                    debug!(delay_secs = delay.as_secs(), "next refresh scheduled");
                    next_refresh = Instant::now() + delay;
                }
                _ = token_timer.tick() => {
                    if let Err(err) = handler.renew_token().await {
                        warn!(error = %err, "proactive token renewal failed");
                    } else {
                        debug!("token renewed");
                    }
                }
            }
        }
    }
}
