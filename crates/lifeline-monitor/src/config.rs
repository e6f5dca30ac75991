//! Monitor configuration.

use std::time::Duration;

/// Monitor configuration options.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wait after a start event before trusting the reported running state.
    pub settle_delay: Duration,
    /// Capacity of the channel between the event source and the consumer.
    pub event_buffer: usize,
}

impl MonitorConfig {
    /// Default settle delay.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

    /// Set the settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the event buffer capacity (at least 1).
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            event_buffer: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(2));
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn builder_pattern() {
        let config = MonitorConfig::default()
            .with_settle_delay(Duration::from_millis(500))
            .with_event_buffer(0);

        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.event_buffer, 1);
    }
}
