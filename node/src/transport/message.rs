use crate::stats::DetailType;
use lattice_core::{Block, BlockHash, Root, Vote};
use std::sync::Arc;

/// The realtime messages the consensus core sends and receives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Publish(Block),
    ConfirmReq(ConfirmReq),
    ConfirmAck(ConfirmAck),
}

impl Message {
    pub fn detail_type(&self) -> DetailType {
        match self {
            Message::Publish(_) => DetailType::Publish,
            Message::ConfirmReq(_) => DetailType::ConfirmReq,
            Message::ConfirmAck(_) => DetailType::ConfirmAck,
        }
    }
}

/// Requests votes for the given (hash, root) pairs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmReq {
    pub roots_hashes: Vec<(BlockHash, Root)>,
}

impl ConfirmReq {
    /// Maximum number of (hash, root) pairs a single request may carry
    pub const HASHES_MAX: usize = 7;

    pub fn new(roots_hashes: Vec<(BlockHash, Root)>) -> Self {
        debug_assert!(roots_hashes.len() <= Self::HASHES_MAX);
        Self { roots_hashes }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmAck {
    vote: Arc<Vote>,
    is_rebroadcasted: bool,
}

impl ConfirmAck {
    /// Maximum number of hashes a single ack may carry
    pub const HASHES_MAX: usize = 12;

    pub fn new_with_own_vote(vote: Arc<Vote>) -> Self {
        debug_assert!(vote.hashes.len() <= Self::HASHES_MAX);
        Self {
            vote,
            is_rebroadcasted: false,
        }
    }

    pub fn new_with_rebroadcasted_vote(vote: Arc<Vote>) -> Self {
        Self {
            vote,
            is_rebroadcasted: true,
        }
    }

    pub fn vote(&self) -> &Arc<Vote> {
        &self.vote
    }

    pub fn is_rebroadcasted(&self) -> bool {
        self.is_rebroadcasted
    }
}
