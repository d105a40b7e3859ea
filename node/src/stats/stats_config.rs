use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct StatsConfig {
    /// How many sample intervals to keep in the ring buffer
    pub max_samples: usize,

    /// How often to log sample array. Default is 0 (no logging)
    pub log_samples_interval: Duration,

    /// How often to log counters. Default is 0 (no logging)
    pub log_counters_interval: Duration,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_samples: 1024 * 16,
            log_samples_interval: Duration::ZERO,
            log_counters_interval: Duration::ZERO,
        }
    }
}

impl StatsConfig {
    pub fn new() -> Self {
        Default::default()
    }
}
