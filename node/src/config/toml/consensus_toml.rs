use crate::{
    block_processing::BlockProcessorConfig,
    consensus::{ActiveElectionsConfig, RequestAggregatorConfig, VoteCacheConfig},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct ActiveElectionsToml {
    pub size: Option<usize>,
    pub confirmation_history_size: Option<usize>,
    pub confirmation_cache: Option<usize>,
}

impl From<&ActiveElectionsToml> for ActiveElectionsConfig {
    fn from(toml: &ActiveElectionsToml) -> Self {
        let mut config = ActiveElectionsConfig::default();
        if let Some(size) = toml.size {
            config.size = size;
        }
        if let Some(history) = toml.confirmation_history_size {
            config.confirmation_history_size = history;
        }
        if let Some(cache) = toml.confirmation_cache {
            config.confirmation_cache = cache;
        }
        config
    }
}

impl From<&ActiveElectionsConfig> for ActiveElectionsToml {
    fn from(config: &ActiveElectionsConfig) -> Self {
        Self {
            size: Some(config.size),
            confirmation_history_size: Some(config.confirmation_history_size),
            confirmation_cache: Some(config.confirmation_cache),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct RequestAggregatorToml {
    pub threads: Option<usize>,
    pub max_queue: Option<usize>,
    pub batch_size: Option<usize>,
}

impl From<&RequestAggregatorToml> for RequestAggregatorConfig {
    fn from(toml: &RequestAggregatorToml) -> Self {
        let mut config = RequestAggregatorConfig::default();
        if let Some(threads) = toml.threads {
            config.threads = threads;
        }
        if let Some(max_queue) = toml.max_queue {
            config.max_queue = max_queue;
        }
        if let Some(batch_size) = toml.batch_size {
            config.batch_size = batch_size;
        }
        config
    }
}

impl From<&RequestAggregatorConfig> for RequestAggregatorToml {
    fn from(config: &RequestAggregatorConfig) -> Self {
        Self {
            threads: Some(config.threads),
            max_queue: Some(config.max_queue),
            batch_size: Some(config.batch_size),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct VoteCacheToml {
    pub max_size: Option<usize>,
    pub max_voters: Option<usize>,
    /// Seconds
    pub age_cutoff: Option<u64>,
}

impl From<&VoteCacheToml> for VoteCacheConfig {
    fn from(toml: &VoteCacheToml) -> Self {
        let mut config = VoteCacheConfig::default();
        if let Some(max_size) = toml.max_size {
            config.max_size = max_size;
        }
        if let Some(max_voters) = toml.max_voters {
            config.max_voters = max_voters;
        }
        if let Some(age_cutoff) = toml.age_cutoff {
            config.age_cutoff = Duration::from_secs(age_cutoff);
        }
        config
    }
}

impl From<&VoteCacheConfig> for VoteCacheToml {
    fn from(config: &VoteCacheConfig) -> Self {
        Self {
            max_size: Some(config.max_size),
            max_voters: Some(config.max_voters),
            age_cutoff: Some(config.age_cutoff.as_secs()),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct BlockProcessorToml {
    pub max_queue: Option<usize>,
    pub batch_size: Option<usize>,
    /// Milliseconds
    pub batch_max_time: Option<u64>,
}

impl From<&BlockProcessorToml> for BlockProcessorConfig {
    fn from(toml: &BlockProcessorToml) -> Self {
        let mut config = BlockProcessorConfig::default();
        if let Some(max_queue) = toml.max_queue {
            config.max_queue = max_queue;
        }
        if let Some(batch_size) = toml.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(batch_max_time) = toml.batch_max_time {
            config.batch_max_time = Duration::from_millis(batch_max_time);
        }
        config
    }
}

impl From<&BlockProcessorConfig> for BlockProcessorToml {
    fn from(config: &BlockProcessorConfig) -> Self {
        Self {
            max_queue: Some(config.max_queue),
            batch_size: Some(config.batch_size),
            batch_max_time: Some(config.batch_max_time.as_millis() as u64),
        }
    }
}
