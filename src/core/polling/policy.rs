//! Poll cadence and stopping rules

use crate::config::PollingConfig;
use crate::domain::Job;
use rand::Rng;
use std::time::Duration;

/// Decides whether a job has reached a state that will not change again
pub type TerminalPredicate = fn(&Job) -> bool;

/// How often to ask for a job's status and when to give up
///
/// The default asks every 750 ms, never backs off, and stops after 800
/// requests (about ten minutes).
#[derive(Clone)]
pub struct PollPolicy {
    /// Delay before the second request
    pub interval: Duration,
    /// Growth applied to the delay after each non-terminal tick (1.0 = fixed)
    pub backoff_multiplier: f64,
    /// Ceiling for the grown delay
    pub max_interval: Duration,
    /// Maximum status requests per session; `None` polls until terminal
    pub max_attempts: Option<u32>,
    /// Upper bound of a random extra delay added to every wait
    pub jitter: Duration,
    pub is_terminal: TerminalPredicate,
}

impl std::fmt::Debug for PollPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollPolicy")
            .field("interval", &self.interval)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("max_interval", &self.max_interval)
            .field("max_attempts", &self.max_attempts)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl PollPolicy {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_interval: Duration::from_millis(config.max_interval_ms),
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            jitter: Duration::from_millis(config.jitter_ms),
            is_terminal: Job::is_terminal,
        }
    }

    /// Fixed cadence with no cap, no backoff and no jitter
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff_multiplier: 1.0,
            max_interval: interval,
            max_attempts: None,
            jitter: Duration::ZERO,
            is_terminal: Job::is_terminal,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self.max_interval = self.max_interval.max(interval);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_terminal(mut self, is_terminal: TerminalPredicate) -> Self {
        self.is_terminal = is_terminal;
        self
    }

    /// Wait before the next request after `attempts` completed requests
    pub fn delay_after(&self, attempts: u32) -> Duration {
        let base = self.backoff_delay(attempts);
        if self.jitter.is_zero() {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(extra)
    }

    /// True once `attempts` requests have used up the budget
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    fn backoff_delay(&self, attempts: u32) -> Duration {
        if self.backoff_multiplier <= 1.0 {
            return self.interval;
        }

        let exponent = attempts.saturating_sub(1).min(64) as i32;
        let grown_ms = self.interval.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let ceiling = self.max_interval.max(self.interval);
        if grown_ms >= ceiling.as_millis() as f64 {
            ceiling
        } else {
            Duration::from_millis(grown_ms.round() as u64)
        }
    }
}
