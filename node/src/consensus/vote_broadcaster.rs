use crate::transport::{ConfirmAck, Message, Network};
use lattice_core::{Vote, VoteSource};
use std::sync::{Arc, Mutex};
use tracing::trace;

pub type VoteSink = Arc<dyn Fn(&Arc<Vote>, VoteSource) + Send + Sync>;

/// Floods locally generated votes and feeds them back into the local vote pipeline
pub struct VoteBroadcaster {
    network: Arc<Network>,
    local_sink: Mutex<Option<VoteSink>>,
}

impl VoteBroadcaster {
    pub fn new(network: Arc<Network>) -> Self {
        Self {
            network,
            local_sink: Mutex::new(None),
        }
    }

    pub fn set_local_sink(&self, sink: VoteSink) {
        *self.local_sink.lock().unwrap() = Some(sink);
    }

    pub fn broadcast(&self, vote: Arc<Vote>) {
        trace!(hashes = vote.hashes.len(), voter = %vote.voting_account, "Broadcasting vote");
        let ack = Message::ConfirmAck(ConfirmAck::new_with_own_vote(vote.clone()));
        self.network.flood(&ack);

        let sink = self.local_sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink(&vote, VoteSource::Live);
        }
    }
}
