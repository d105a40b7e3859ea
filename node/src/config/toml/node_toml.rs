use super::{ActiveElectionsToml, BlockProcessorToml, RequestAggregatorToml, VoteCacheToml};
use crate::{config::NodeConfig, stats::StatsConfig};
use lattice_core::Amount;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `config-node.toml` file. Missing values keep their defaults
#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct NodeToml {
    pub enable_voting: Option<bool>,
    pub vote_minimum: Option<Amount>,
    /// Milliseconds
    pub vote_generator_delay: Option<u64>,
    pub vote_generator_threshold: Option<usize>,
    pub online_weight_minimum: Option<Amount>,
    pub max_unchecked_blocks: Option<usize>,
    pub active_elections: Option<ActiveElectionsToml>,
    pub request_aggregator: Option<RequestAggregatorToml>,
    pub vote_cache: Option<VoteCacheToml>,
    pub block_processor: Option<BlockProcessorToml>,
    pub statistics: Option<StatsToml>,
}

impl From<&NodeToml> for NodeConfig {
    fn from(toml: &NodeToml) -> Self {
        let mut config = NodeConfig::default();
        if let Some(enable_voting) = toml.enable_voting {
            config.enable_voting = enable_voting;
        }
        if let Some(vote_minimum) = toml.vote_minimum {
            config.vote_minimum = vote_minimum;
        }
        if let Some(delay) = toml.vote_generator_delay {
            config.vote_generator_delay = Duration::from_millis(delay);
        }
        if let Some(threshold) = toml.vote_generator_threshold {
            config.vote_generator_threshold = threshold;
        }
        if let Some(minimum) = toml.online_weight_minimum {
            config.online_weight_minimum = minimum;
        }
        if let Some(max_unchecked) = toml.max_unchecked_blocks {
            config.max_unchecked_blocks = max_unchecked;
        }
        if let Some(active_elections) = &toml.active_elections {
            config.active_elections = active_elections.into();
        }
        if let Some(aggregator) = &toml.request_aggregator {
            config.request_aggregator = aggregator.into();
        }
        if let Some(vote_cache) = &toml.vote_cache {
            config.vote_cache = vote_cache.into();
        }
        if let Some(block_processor) = &toml.block_processor {
            config.block_processor = block_processor.into();
        }
        if let Some(stats) = &toml.statistics {
            config.stats = stats.into();
        }
        config
    }
}

impl From<&NodeConfig> for NodeToml {
    fn from(config: &NodeConfig) -> Self {
        Self {
            enable_voting: Some(config.enable_voting),
            vote_minimum: Some(config.vote_minimum),
            vote_generator_delay: Some(config.vote_generator_delay.as_millis() as u64),
            vote_generator_threshold: Some(config.vote_generator_threshold),
            online_weight_minimum: Some(config.online_weight_minimum),
            max_unchecked_blocks: Some(config.max_unchecked_blocks),
            active_elections: Some((&config.active_elections).into()),
            request_aggregator: Some((&config.request_aggregator).into()),
            vote_cache: Some((&config.vote_cache).into()),
            block_processor: Some((&config.block_processor).into()),
            statistics: Some((&config.stats).into()),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct StatsToml {
    pub max_samples: Option<usize>,
    /// Milliseconds, 0 disables logging
    pub log_counters_interval: Option<u64>,
    /// Milliseconds, 0 disables logging
    pub log_samples_interval: Option<u64>,
}

impl From<&StatsToml> for StatsConfig {
    fn from(toml: &StatsToml) -> Self {
        let mut config = StatsConfig::default();
        if let Some(max_samples) = toml.max_samples {
            config.max_samples = max_samples;
        }
        if let Some(interval) = toml.log_counters_interval {
            config.log_counters_interval = Duration::from_millis(interval);
        }
        if let Some(interval) = toml.log_samples_interval {
            config.log_samples_interval = Duration::from_millis(interval);
        }
        config
    }
}

impl From<&StatsConfig> for StatsToml {
    fn from(config: &StatsConfig) -> Self {
        Self {
            max_samples: Some(config.max_samples),
            log_counters_interval: Some(config.log_counters_interval.as_millis() as u64),
            log_samples_interval: Some(config.log_samples_interval.as_millis() as u64),
        }
    }
}
