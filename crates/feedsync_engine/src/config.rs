//! Configuration for the sync engine and poller.

use rand::Rng;
use std::time::Duration;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Author used for new items created with a blank author.
    pub default_author: String,
    /// Publication label used for new items created with a blank label.
    pub default_published_label: String,
}

impl EngineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default author.
    pub fn with_default_author(mut self, author: impl Into<String>) -> Self {
        self.default_author = author.into();
        self
    }

    /// Sets the default publication label.
    pub fn with_default_published_label(mut self, label: impl Into<String>) -> Self {
        self.default_published_label = label.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_author: "Me".into(),
            default_published_label: "now".into(),
        }
    }
}

/// Configuration for the background poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between discovery rounds.
    pub interval: Duration,
    /// Backoff applied after consecutive network failures.
    pub retry: RetryConfig,
    /// Whether each round also retries unsynced items.
    pub retry_unsynced: bool,
}

impl PollConfig {
    /// Creates a poll configuration with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            retry: RetryConfig::default(),
            retry_unsynced: false,
        }
    }

    /// Sets the backoff configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets whether rounds also retry unsynced items.
    pub fn with_retry_unsynced(mut self, value: bool) -> Self {
        self.retry_unsynced = value;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

/// Configuration for retry backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of consecutive failures after which the delay stops growing.
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a configuration that never backs off.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets whether to add jitter.
    pub fn with_jitter(mut self, add_jitter: bool) -> Self {
        self.add_jitter = add_jitter;
        self
    }

    /// Calculates the extra delay after `attempt` consecutive failures.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = attempt.min(self.max_attempts).saturating_sub(1) as i32;
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Up to 25% jitter
            let jitter = delay_secs * 0.25 * rand::thread_rng().gen::<f64>();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_author, "Me");
        assert_eq!(config.default_published_label, "now");

        let config = EngineConfig::new()
            .with_default_author("Me myself")
            .with_default_published_label("just now");
        assert_eq!(config.default_author, "Me myself");
        assert_eq!(config.default_published_label, "just now");
    }

    #[test]
    fn poll_config_builder() {
        let config = PollConfig::new(Duration::from_secs(3))
            .with_retry(RetryConfig::no_retry())
            .with_retry_unsynced(true);

        assert_eq!(config.interval, Duration::from_secs(3));
        assert_eq!(config.retry.max_attempts, 1);
        assert!(config.retry_unsynced);
    }

    #[test]
    fn retry_delay_calculation() {
        let config = RetryConfig::new(5)
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0);

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);

        let delay1 = config.delay_for_attempt(1);
        assert!(delay1 >= Duration::from_millis(100));
        assert!(delay1 <= Duration::from_millis(125));

        let delay2 = config.delay_for_attempt(2);
        assert!(delay2 >= Duration::from_millis(200));
    }

    #[test]
    fn retry_delay_stops_growing() {
        let config = RetryConfig::new(3)
            .with_initial_delay(Duration::from_millis(100))
            .with_jitter(false);

        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(10), Duration::from_millis(400));
    }

    #[test]
    fn retry_delay_respects_max() {
        let config = RetryConfig::new(10)
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_backoff_multiplier(10.0);

        let delay = config.delay_for_attempt(5);
        assert!(delay <= Duration::from_millis(6250));
    }

    #[test]
    fn no_retry_never_delays() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.delay_for_attempt(4), Duration::ZERO);
    }
}
