use super::{vote_generator::VoteGenerator, LocalVoteHistory};
use crate::{
    config::{NetworkParams, NodeConfig},
    consensus::VoteBroadcaster,
    stats::Stats,
    transport::{Channel, Network},
    wallets::WalletRepresentatives,
};
use lattice_core::{Block, BlockHash, Root};
use lattice_ledger::Ledger;
use std::sync::Arc;

/// The normal and the final vote generator of a node
pub struct VoteGenerators {
    non_final_vote_generator: VoteGenerator,
    final_vote_generator: VoteGenerator,
}

impl VoteGenerators {
    pub fn new(
        ledger: Arc<Ledger>,
        representatives: Arc<WalletRepresentatives>,
        history: Arc<LocalVoteHistory>,
        stats: Arc<Stats>,
        network: Arc<Network>,
        vote_broadcaster: Arc<VoteBroadcaster>,
        config: &NodeConfig,
        network_params: &NetworkParams,
    ) -> Self {
        let voting_delay = network_params.network.vote_spacing_delay;
        let non_final_vote_generator = VoteGenerator::new(
            ledger.clone(),
            representatives.clone(),
            history.clone(),
            false, //none-final
            stats.clone(),
            network.clone(),
            voting_delay,
            config.vote_generator_delay,
            config.vote_generator_threshold,
            vote_broadcaster.clone(),
        );

        let final_vote_generator = VoteGenerator::new(
            ledger,
            representatives,
            history,
            true, //final
            stats,
            network,
            voting_delay,
            config.vote_generator_delay,
            config.vote_generator_threshold,
            vote_broadcaster,
        );

        Self {
            non_final_vote_generator,
            final_vote_generator,
        }
    }

    pub fn start(&self) {
        self.non_final_vote_generator.start();
        self.final_vote_generator.start();
    }

    pub fn stop(&self) {
        self.non_final_vote_generator.stop();
        self.final_vote_generator.stop();
    }

    pub fn generate_final_vote(&self, root: &Root, hash: &BlockHash) {
        self.final_vote_generator.add(root, hash);
    }

    pub fn generate_final_votes(&self, blocks: &[Block], channel: Arc<Channel>) -> usize {
        self.final_vote_generator.generate(blocks, channel)
    }

    pub fn generate_non_final_vote(&self, root: &Root, hash: &BlockHash) {
        self.non_final_vote_generator.add(root, hash);
    }

    pub fn generate_non_final_votes(&self, blocks: &[Block], channel: Arc<Channel>) -> usize {
        self.non_final_vote_generator.generate(blocks, channel)
    }

    pub fn queued_candidates(&self) -> usize {
        self.non_final_vote_generator.candidates_len() + self.final_vote_generator.candidates_len()
    }
}
