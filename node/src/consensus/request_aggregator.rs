use super::{ActiveElections, LocalVoteHistory, VoteGenerators};
use crate::{
    stats::{DetailType, Direction, StatType, Stats},
    transport::{Channel, ChannelId, ConfirmAck, Message, Network},
};
use lattice_core::{Block, BlockHash, QualifiedRoot, Root, Vote};
use lattice_ledger::Ledger;
use lattice_store::{ReadTransaction, Transaction};
use std::{
    cmp::min,
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Condvar, Mutex, MutexGuard},
    thread::JoinHandle,
};
use tracing::{debug, error, trace};

#[derive(Clone, Debug, PartialEq)]
pub struct RequestAggregatorConfig {
    pub threads: usize,
    /// Maximum number of queued requests per channel
    pub max_queue: usize,
    /// Number of requests processed in a single batch
    pub batch_size: usize,
}

impl RequestAggregatorConfig {
    pub fn new(parallelism: usize) -> Self {
        Self {
            threads: min(parallelism, 4),
            max_queue: 128,
            batch_size: 16,
        }
    }
}

impl Default for RequestAggregatorConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        Self::new(parallelism)
    }
}

/// Requested (hash, root) pairs of one confirm_req
pub type RequestType = Vec<(BlockHash, Root)>;

/**
 * Pools together confirmation requests, separately for each channel.
 * Requests are answered with cached votes where possible, to minimize bandwidth and vote generation. Example:
 * * Two votes are cached, one for hashes {1,2,3} and another for hashes {4,5,6}
 * * A request arrives for hashes {1,4,5}. Another request arrives soon afterwards for hashes {2,3,6}
 * * The aggregator will reply with the two cached votes
 * Votes are generated for uncached hashes.
 */
pub struct RequestAggregator {
    config: RequestAggregatorConfig,
    stats: Arc<Stats>,
    vote_generators: Arc<VoteGenerators>,
    local_votes: Arc<LocalVoteHistory>,
    ledger: Arc<Ledger>,
    active_elections: Arc<ActiveElections>,
    network: Arc<Network>,
    mutex: Mutex<RequestAggregatorData>,
    condition: Condvar,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl RequestAggregator {
    pub fn new(
        config: RequestAggregatorConfig,
        stats: Arc<Stats>,
        vote_generators: Arc<VoteGenerators>,
        local_votes: Arc<LocalVoteHistory>,
        ledger: Arc<Ledger>,
        active_elections: Arc<ActiveElections>,
        network: Arc<Network>,
    ) -> Self {
        Self {
            stats,
            vote_generators,
            local_votes,
            ledger,
            active_elections,
            network,
            config,
            condition: Condvar::new(),
            mutex: Mutex::new(RequestAggregatorData {
                queue: ChannelQueues::default(),
                stopped: false,
            }),
            threads: Mutex::new(Vec::new()),
        }
    }

    /// Queues the requests of a channel. Returns false if the channel's queue is full.
    pub fn add(&self, channel: Arc<Channel>, request: RequestType) -> bool {
        // Empty requests are filtered by the caller
        debug_assert!(!request.is_empty());
        let request_len = request.len();

        let added = self
            .mutex
            .lock()
            .unwrap()
            .queue
            .push(channel.clone(), request, self.config.max_queue);

        if added {
            self.condition.notify_one();
        }

        self.stats.inc(
            StatType::Aggregator,
            if added {
                DetailType::AggregatorAccepted
            } else {
                DetailType::AggregatorDropped
            },
        );
        trace!(channel = %channel.channel_id(), hashes = request_len, added, "Confirmation request");

        added
    }

    /// Returns the number of currently queued requests
    pub fn len(&self) -> usize {
        self.mutex.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stop(&self) {
        self.mutex.lock().unwrap().stopped = true;
        self.condition.notify_all();
        let threads = std::mem::take(&mut *self.threads.lock().unwrap());
        for thread in threads {
            if thread.join().is_err() {
                error!("Request aggregator thread panicked");
            }
        }
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            if guard.queue.has_ready() {
                guard = self.run_batch(guard);
            } else {
                guard = self
                    .condition
                    .wait_while(guard, |g| !g.stopped && !g.queue.has_ready())
                    .unwrap();
            }
        }
    }

    fn run_batch<'a>(
        &'a self,
        mut state: MutexGuard<'a, RequestAggregatorData>,
    ) -> MutexGuard<'a, RequestAggregatorData> {
        let batch = state.queue.next_batch(self.config.batch_size);
        drop(state);

        let mut txn = self.ledger.read_txn();
        for (request, channel) in &batch {
            txn.refresh_if_needed(std::time::Duration::from_millis(500));
            if channel.is_alive() {
                self.process(&txn, request, channel);
            }
        }
        debug!(requests = batch.len(), "Request aggregator batch processed");

        let mut guard = self.mutex.lock().unwrap();
        let had_waiting = !guard.queue.is_empty();
        guard
            .queue
            .finish(batch.iter().map(|(_, channel)| channel.channel_id()));
        if had_waiting {
            self.condition.notify_all();
        }
        guard
    }

    fn process(&self, txn: &ReadTransaction, request: &RequestType, channel: &Arc<Channel>) {
        let remaining = self.aggregate(txn, request, channel);

        if !remaining.remaining_normal.is_empty() {
            // Generate votes for the remaining hashes
            let generated = self
                .vote_generators
                .generate_non_final_votes(&remaining.remaining_normal, channel.clone());
            self.stats.add_dir(
                StatType::Requests,
                DetailType::RequestsCannotVote,
                Direction::In,
                (remaining.remaining_normal.len() - generated) as u64,
            );
        }

        if !remaining.remaining_final.is_empty() {
            // Generate final votes for the remaining hashes
            let generated = self
                .vote_generators
                .generate_final_votes(&remaining.remaining_final, channel.clone());
            self.stats.add_dir(
                StatType::Requests,
                DetailType::RequestsCannotVote,
                Direction::In,
                (remaining.remaining_final.len() - generated) as u64,
            );
        }
    }

    fn reply_action(&self, vote: &Arc<Vote>, channel: &Channel) {
        let confirm = Message::ConfirmAck(ConfirmAck::new_with_own_vote(vote.clone()));
        self.network.send(channel, &confirm);
    }

    /// Our final vote for a root, if any. Roots of open blocks are accounts, all other roots are
    /// the previous block.
    fn final_vote_hash(&self, txn: &dyn Transaction, root: &Root) -> Option<BlockHash> {
        let previous = BlockHash::from_bytes(*root.as_bytes());
        self.ledger
            .store
            .final_vote
            .get(txn, &QualifiedRoot::new(*root, previous))
            .or_else(|| {
                self.ledger
                    .store
                    .final_vote
                    .get(txn, &QualifiedRoot::new(*root, BlockHash::zero()))
            })
    }

    /// The block that currently follows the root in the ledger
    fn successor_by_root(&self, txn: &dyn Transaction, root: &Root) -> Option<BlockHash> {
        let previous = BlockHash::from_bytes(*root.as_bytes());
        let any = self.ledger.any();
        any.block_successor_by_qualified_root(txn, &QualifiedRoot::new(*root, previous))
            .or_else(|| {
                any.block_successor_by_qualified_root(
                    txn,
                    &QualifiedRoot::new(*root, BlockHash::zero()),
                )
            })
    }

    /// Aggregate requests and send cached votes to the channel.
    /// Returns the remaining blocks that need vote generation, separately for normal and final votes
    fn aggregate(
        &self,
        txn: &dyn Transaction,
        requests: &RequestType,
        channel: &Arc<Channel>,
    ) -> AggregateResult {
        let mut to_generate: Vec<Block> = Vec::new();
        let mut to_generate_final: Vec<Block> = Vec::new();
        let mut cached_votes: Vec<Arc<Vote>> = Vec::new();
        let mut cached_hashes: HashSet<BlockHash> = HashSet::new();

        for (hash, root) in requests {
            // 0. Hashes already sent
            if cached_hashes.contains(hash) {
                continue;
            }

            // 1. Votes in cache
            let found_votes = self.local_votes.votes(root, hash, false);
            if !found_votes.is_empty() {
                for vote in found_votes {
                    cached_hashes.extend(vote.hashes.iter().copied());
                    cached_votes.push(vote);
                }
                continue;
            }

            let mut generate_vote = true;
            let mut generate_final_vote = false;
            let mut block: Option<Block> = None;

            // 2. Final votes
            if let Some(final_hash) = self.final_vote_hash(txn, root) {
                generate_final_vote = true;
                block = self
                    .ledger
                    .any()
                    .get_block(txn, &final_hash)
                    .map(Block::from);
            }

            // 3. Election winner by hash
            if block.is_none() {
                if let Some(election) = self.active_elections.election_for_block(hash) {
                    let winner = election.mutex.lock().unwrap().status.winner.clone();
                    block = Some(winner.as_ref().clone());
                }
            }

            // 4. Ledger by hash
            if block.is_none() {
                if let Some(saved) = self.ledger.any().get_block(txn, hash) {
                    // Generate final votes for confirmed blocks
                    generate_final_vote = self.ledger.confirmed().block_exists(txn, hash);
                    block = Some(saved.into());
                }
            }

            // 5. Ledger by root
            if block.is_none() && !root.is_zero() {
                if let Some(successor) = self.successor_by_root(txn, root) {
                    if let Some(saved) = self.ledger.any().get_block(txn, &successor) {
                        // Votes in cache for the successor
                        let mut successor_votes = self.local_votes.votes(root, &successor, false);
                        if !successor_votes.is_empty() {
                            cached_votes.append(&mut successor_votes);
                            generate_vote = false;
                        } else {
                            generate_final_vote =
                                self.ledger.confirmed().block_exists(txn, &successor);
                        }
                        block = Some(saved.into());
                    }
                }
            }

            let Some(block) = block else {
                self.stats.inc_dir(
                    StatType::Requests,
                    DetailType::RequestsUnknown,
                    Direction::In,
                );
                trace!(%hash, %root, "Requested block unknown");
                continue;
            };

            // Let the peer know about the alternative block
            if block.hash() != *hash {
                self.network
                    .send(channel, &Message::Publish(block.clone()));
            }

            if generate_vote {
                if generate_final_vote {
                    to_generate_final.push(block);
                } else {
                    to_generate.push(block);
                }
            }
        }

        // Unique votes
        let mut signatures = HashSet::new();
        cached_votes.retain(|vote| signatures.insert(vote.signature.clone()));

        let cached_votes_len = cached_votes.len() as u64;
        for vote in &cached_votes {
            self.reply_action(vote, channel);
        }

        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsCachedHashes,
            Direction::In,
            cached_hashes.len() as u64,
        );
        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsCachedVotes,
            Direction::In,
            cached_votes_len,
        );

        AggregateResult {
            remaining_normal: to_generate,
            remaining_final: to_generate_final,
        }
    }
}

impl Drop for RequestAggregator {
    fn drop(&mut self) {
        debug_assert!(self.threads.lock().unwrap().is_empty())
    }
}

pub trait RequestAggregatorExt {
    fn start(&self);
}

impl RequestAggregatorExt for Arc<RequestAggregator> {
    fn start(&self) {
        let mut guard = self.threads.lock().unwrap();
        for _ in 0..self.config.threads {
            let self_l = Arc::clone(self);
            match std::thread::Builder::new()
                .name("Req aggregator".to_string())
                .spawn(move || self_l.run())
            {
                Ok(handle) => guard.push(handle),
                Err(e) => error!("Could not start request aggregator thread: {e}"),
            }
        }
    }
}

struct RequestAggregatorData {
    queue: ChannelQueues,
    stopped: bool,
}

/// Bounded request queues per channel, served round robin.
/// A channel taken by a worker stays out of the rotation until the worker calls `finish`,
/// so the requests of one channel are never processed by two workers at once.
#[derive(Default)]
struct ChannelQueues {
    queues: HashMap<ChannelId, (Arc<Channel>, VecDeque<RequestType>)>,
    order: VecDeque<ChannelId>,
    in_flight: HashSet<ChannelId>,
}

impl ChannelQueues {
    fn push(&mut self, channel: Arc<Channel>, request: RequestType, max_queue: usize) -> bool {
        let channel_id = channel.channel_id();
        match self.queues.get_mut(&channel_id) {
            Some((_, queue)) => {
                if queue.len() >= max_queue {
                    return false;
                }
                queue.push_back(request);
            }
            None => {
                if max_queue == 0 {
                    return false;
                }
                self.queues
                    .insert(channel_id, (channel, VecDeque::from([request])));
                if !self.in_flight.contains(&channel_id) {
                    self.order.push_back(channel_id);
                }
            }
        }
        true
    }

    fn next_batch(&mut self, max: usize) -> Vec<(RequestType, Arc<Channel>)> {
        let mut batch = Vec::new();
        while batch.len() < max {
            let Some(channel_id) = self.order.pop_front() else {
                break;
            };
            let Some((channel, queue)) = self.queues.get_mut(&channel_id) else {
                continue;
            };
            if let Some(request) = queue.pop_front() {
                batch.push((request, channel.clone()));
            }
            self.in_flight.insert(channel_id);
            if queue.is_empty() {
                self.queues.remove(&channel_id);
            } else {
                self.order.push_back(channel_id);
            }
        }
        let in_flight = &self.in_flight;
        self.order.retain(|id| !in_flight.contains(id));
        batch
    }

    /// Puts the channels of a processed batch back into the rotation
    fn finish(&mut self, channels: impl IntoIterator<Item = ChannelId>) {
        for channel_id in channels {
            if self.in_flight.remove(&channel_id) && self.queues.contains_key(&channel_id) {
                self.order.push_back(channel_id);
            }
        }
    }

    /// There is a channel that no worker is busy with
    fn has_ready(&self) -> bool {
        !self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.queues.values().map(|(_, queue)| queue.len()).sum()
    }

    fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

struct AggregateResult {
    remaining_normal: Vec<Block>,
    remaining_final: Vec<Block>,
}
