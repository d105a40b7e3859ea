use crate::{
    block_processing::BlockProcessorConfig,
    cementation::ConfirmingSetConfig,
    consensus::{ActiveElectionsConfig, RequestAggregatorConfig, VoteCacheConfig},
    stats::StatsConfig,
};
use lattice_core::Amount;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeConfig {
    /// Sign votes with the representatives of the wallet
    pub enable_voting: bool,
    /// Local representatives with less weight don't vote
    pub vote_minimum: Amount,
    pub vote_generator_delay: Duration,
    /// Candidate count at which the generator stops waiting for more hashes
    pub vote_generator_threshold: usize,
    pub online_weight_minimum: Amount,
    pub max_unchecked_blocks: usize,
    pub active_elections: ActiveElectionsConfig,
    pub request_aggregator: RequestAggregatorConfig,
    pub vote_cache: VoteCacheConfig,
    pub block_processor: BlockProcessorConfig,
    pub confirming_set: ConfirmingSetConfig,
    pub stats: StatsConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            enable_voting: false,
            vote_minimum: Amount::nano(1000),
            vote_generator_delay: Duration::from_millis(100),
            vote_generator_threshold: 3,
            online_weight_minimum: Amount::nano(60_000_000),
            max_unchecked_blocks: 65536,
            active_elections: Default::default(),
            request_aggregator: Default::default(),
            vote_cache: Default::default(),
            block_processor: Default::default(),
            confirming_set: Default::default(),
            stats: Default::default(),
        }
    }
}

impl NodeConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Every local representative votes, regardless of its weight
    pub fn new_test_instance() -> Self {
        Self {
            enable_voting: true,
            vote_minimum: Amount::zero(),
            ..Default::default()
        }
    }
}
