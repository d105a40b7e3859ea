use super::{Election, ElectionData};
use crate::{
    config::NetworkParams,
    transport::{Channel, ChannelId, ConfirmReq, Message, Network},
};
use lattice_core::{BlockHash, Root};
use std::{collections::HashMap, sync::Arc};
use tracing::trace;

/// Accepts elections that need further votes before they can be confirmed
/// and bundles them in to single confirm_req packets
pub struct ConfirmationSolicitor<'a> {
    network: &'a Network,
    /// Global maximum amount of block broadcasts
    max_block_broadcasts: usize,
    /// Maximum amount of requests to be sent per election
    max_election_requests: usize,
    channels: Vec<Arc<Channel>>,
    requests: HashMap<ChannelId, Vec<(BlockHash, Root)>>,
    prepared: bool,
    rebroadcasted: usize,
}

impl<'a> ConfirmationSolicitor<'a> {
    pub fn new(network_params: &NetworkParams, network: &'a Network) -> Self {
        Self {
            network,
            max_block_broadcasts: network_params.network.max_block_broadcasts,
            max_election_requests: network_params.network.max_election_requests,
            channels: Vec::new(),
            requests: HashMap::new(),
            prepared: false,
            rebroadcasted: 0,
        }
    }

    /// Prepare object for batching election confirmation requests
    pub fn prepare(&mut self, channels: Vec<Arc<Channel>>) {
        debug_assert!(!self.prepared);
        self.requests.clear();
        self.rebroadcasted = 0;
        self.channels = channels;
        self.prepared = true;
    }

    /// Broadcast the winner of an election if the broadcast limit has not been reached.
    /// Returns true if the broadcast was performed
    pub fn broadcast(&mut self, election_data: &ElectionData) -> bool {
        debug_assert!(self.prepared);
        self.rebroadcasted += 1;
        if self.rebroadcasted >= self.max_block_broadcasts {
            return false;
        }

        let winner = Message::Publish(election_data.status.winner.as_ref().clone());
        self.network.flood(&winner);
        true
    }

    /// Add an election that needs to be confirmed. Returns true if it was queued for at least one channel
    pub fn add(&mut self, election: &Election, election_data: &ElectionData) -> bool {
        debug_assert!(self.prepared);
        let winner = &election_data.status.winner;
        let root_hash = (winner.hash(), winner.root());
        let mut added = false;
        for channel in self.channels.iter().take(self.max_election_requests) {
            let queue = self.requests.entry(channel.channel_id()).or_default();
            if !queue.contains(&root_hash) {
                queue.push(root_hash);
                added = true;
            }
        }
        if added {
            trace!(qualified_root = ?election.qualified_root, "Confirmation requested");
        }
        added
    }

    /// Dispatch bundled requests to each channel
    pub fn flush(&mut self) {
        debug_assert!(self.prepared);
        for channel in &self.channels {
            let Some(requests) = self.requests.get(&channel.channel_id()) else {
                continue;
            };
            for chunk in requests.chunks(ConfirmReq::HASHES_MAX) {
                let req = Message::ConfirmReq(ConfirmReq::new(chunk.to_vec()));
                self.network.send(channel, &req);
            }
        }
        self.requests.clear();
        self.prepared = false;
    }
}
