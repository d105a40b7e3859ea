mod adapters;
mod stats;
mod stats_config;
mod stats_enums;

pub use adapters::LedgerStats;
pub use stats::Stats;
pub use stats_config::StatsConfig;
pub use stats_enums::{DetailType, Direction, Sample, StatType};
