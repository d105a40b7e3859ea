use super::{Channel, Message};
use crate::{
    block_processing::{BlockProcessor, BlockSource},
    consensus::{ActiveElections, RequestAggregator},
    stats::{DetailType, Direction, StatType, Stats},
    wallets::WalletRepresentatives,
};
use lattice_core::VoteSource;
use std::sync::Arc;
use tracing::trace;

/// Dispatches messages received from peers to the consensus components
pub struct RealtimeMessageHandler {
    stats: Arc<Stats>,
    block_processor: Arc<BlockProcessor>,
    representatives: Arc<WalletRepresentatives>,
    request_aggregator: Arc<RequestAggregator>,
    active: Arc<ActiveElections>,
}

impl RealtimeMessageHandler {
    pub fn new(
        stats: Arc<Stats>,
        block_processor: Arc<BlockProcessor>,
        representatives: Arc<WalletRepresentatives>,
        request_aggregator: Arc<RequestAggregator>,
        active: Arc<ActiveElections>,
    ) -> Self {
        Self {
            stats,
            block_processor,
            representatives,
            request_aggregator,
            active,
        }
    }

    pub fn process(&self, message: Message, channel: &Arc<Channel>) {
        self.stats
            .inc_dir(StatType::Message, message.detail_type(), Direction::In);
        trace!(?message, channel = %channel.channel_id(), "Message received");

        match message {
            Message::Publish(block) => {
                if !self.block_processor.process_active(block) {
                    self.stats
                        .inc_dir(StatType::Drop, DetailType::Publish, Direction::In);
                }
            }
            Message::ConfirmReq(req) => {
                // Don't load nodes with disabled voting
                if self.representatives.voting_reps_count() > 0 && !req.roots_hashes.is_empty() {
                    self.request_aggregator
                        .add(channel.clone(), req.roots_hashes);
                }
            }
            Message::ConfirmAck(ack) => {
                if !ack.vote().voting_account.is_zero() {
                    let source = if ack.is_rebroadcasted() {
                        VoteSource::Rebroadcast
                    } else {
                        VoteSource::Live
                    };
                    self.active.vote(ack.vote(), source);
                }
            }
        }
    }
}
