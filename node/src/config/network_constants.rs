use lattice_core::{work::WorkThresholds, Amount, Networks};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct NetworkConstants {
    pub current_network: Networks,
    pub work: WorkThresholds,
    /// A representative is classified as principal based on its weight and this factor
    pub principal_weight_factor: u32,
    /// How often the active elections loop runs
    pub aec_loop_interval: Duration,
    /// Time to wait before vote rebroadcasts for active elections
    pub vote_broadcast_interval: Duration,
    /// Minimum time between votes for different hashes of the same root
    pub vote_spacing_delay: Duration,
    pub max_vote_history: usize,
    /// Election timing is scaled by this latency
    pub base_latency: Duration,
    pub max_block_broadcasts: usize,
    pub max_election_requests: usize,
    pub online_weight_minimum: Amount,
    pub online_weight_period: Duration,
}

impl NetworkConstants {
    pub fn new(work: WorkThresholds, network: Networks) -> Self {
        match network {
            Networks::NanoDevNetwork => Self::dev(work),
            Networks::NanoLiveNetwork => Self::live(work),
        }
    }

    pub fn live(work: WorkThresholds) -> Self {
        Self {
            current_network: Networks::NanoLiveNetwork,
            work,
            principal_weight_factor: 1000, // 0.1%
            aec_loop_interval: Duration::from_millis(300),
            vote_broadcast_interval: Duration::from_secs(15),
            vote_spacing_delay: Duration::from_secs(15),
            max_vote_history: 1024 * 128,
            base_latency: Duration::from_millis(1000),
            max_block_broadcasts: 30,
            max_election_requests: 50,
            online_weight_minimum: Amount::nano(60_000_000),
            online_weight_period: Duration::from_secs(5 * 60),
        }
    }

    pub fn dev(work: WorkThresholds) -> Self {
        Self {
            current_network: Networks::NanoDevNetwork,
            aec_loop_interval: Duration::from_millis(20),
            vote_broadcast_interval: Duration::from_millis(500),
            vote_spacing_delay: Duration::from_secs(1),
            max_vote_history: 256,
            base_latency: Duration::from_millis(25),
            max_block_broadcasts: 4,
            ..Self::live(work)
        }
    }

    pub fn is_live_network(&self) -> bool {
        self.current_network == Networks::NanoLiveNetwork
    }

    pub fn is_dev_network(&self) -> bool {
        self.current_network == Networks::NanoDevNetwork
    }
}
