use super::{LocalVoteHistory, VoteSpacing};
use crate::{
    consensus::VoteBroadcaster,
    stats::{DetailType, Direction, StatType, Stats},
    transport::{Channel, ConfirmAck, Message, Network},
    wallets::WalletRepresentatives,
};
use lattice_core::{utils::milliseconds_since_epoch, Block, BlockHash, Root, Vote};
use lattice_ledger::Ledger;
use lattice_store::{ReadTransaction, WriteTransaction};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, error, trace};

pub(crate) struct VoteGenerator {
    shared_state: Arc<SharedState>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl VoteGenerator {
    const MAX_REQUESTS: usize = 2048;
    /// Hashes per generated vote, bounded by what a single confirm_ack carries
    pub(crate) const MAX_HASHES: usize = ConfirmAck::HASHES_MAX;

    pub(crate) fn new(
        ledger: Arc<Ledger>,
        representatives: Arc<WalletRepresentatives>,
        history: Arc<LocalVoteHistory>,
        is_final: bool,
        stats: Arc<Stats>,
        network: Arc<Network>,
        voting_delay: Duration,
        vote_generator_delay: Duration,
        vote_generator_threshold: usize,
        vote_broadcaster: Arc<VoteBroadcaster>,
    ) -> Self {
        let shared_state = Arc::new(SharedState {
            ledger,
            history,
            representatives,
            condition: Condvar::new(),
            queues: Mutex::new(Queues::default()),
            is_final,
            stopped: AtomicBool::new(false),
            stats,
            network,
            vote_broadcaster,
            spacing: Mutex::new(VoteSpacing::new(voting_delay)),
            vote_generator_delay,
            vote_generator_threshold,
        });

        Self {
            shared_state,
            thread: Mutex::new(None),
        }
    }

    pub(crate) fn start(&self) {
        let shared_state = Arc::clone(&self.shared_state);
        let name = if self.shared_state.is_final {
            "Voting final"
        } else {
            "Voting"
        };
        match thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || shared_state.run())
        {
            Ok(handle) => *self.thread.lock().unwrap() = Some(handle),
            Err(e) => error!("Could not start vote generator thread: {e}"),
        }
    }

    pub(crate) fn stop(&self) {
        self.shared_state.stopped.store(true, Ordering::SeqCst);
        self.shared_state.condition.notify_all();
        if let Some(thread) = self.thread.lock().unwrap().take() {
            if thread.join().is_err() {
                error!("Vote generator thread panicked");
            }
        }
    }

    /// Queue items for vote generation, or broadcast votes already in cache
    pub(crate) fn add(&self, root: &Root, hash: &BlockHash) {
        let cached = self
            .shared_state
            .history
            .votes(root, hash, self.shared_state.is_final);
        if !cached.is_empty() {
            trace!(%root, %hash, votes = cached.len(), "Rebroadcasting cached votes");
            for vote in cached {
                self.shared_state.vote_broadcaster.broadcast(vote);
            }
            return;
        }

        let should_vote = if self.shared_state.is_final {
            let mut txn = self.shared_state.ledger.rw_txn();
            self.shared_state.should_vote_final(&mut txn, root, hash)
        } else {
            let txn = self.shared_state.ledger.read_txn();
            self.shared_state.should_vote_non_final(&txn, root, hash)
        };

        if should_vote {
            let should_notify = {
                let mut queues = self.shared_state.queues.lock().unwrap();
                queues.candidates.push_back((*root, *hash));
                queues.candidates.len() >= Self::MAX_HASHES
            };

            if should_notify {
                self.shared_state.condition.notify_all();
            }
        }
    }

    /// Queue blocks for vote generation, returning the number of successful candidates.
    pub(crate) fn generate(&self, blocks: &[Block], channel: Arc<Channel>) -> usize {
        let req_candidates = {
            let txn = self.shared_state.ledger.read_txn();
            blocks
                .iter()
                .filter(|block| self.shared_state.ledger.dependents_confirmed(&txn, block))
                .map(|block| (block.root(), block.hash()))
                .collect::<Vec<_>>()
        };

        let result = req_candidates.len();
        let mut guard = self.shared_state.queues.lock().unwrap();
        guard.requests.push_back((req_candidates, channel));
        while guard.requests.len() > Self::MAX_REQUESTS {
            // On a large queue of requests, erase the oldest one
            guard.requests.pop_front();
            self.shared_state.stats.inc(
                StatType::VoteGenerator,
                DetailType::GeneratorRepliesDiscarded,
            );
        }
        drop(guard);
        self.shared_state.condition.notify_all();

        result
    }

    pub(crate) fn candidates_len(&self) -> usize {
        self.shared_state.queues.lock().unwrap().candidates.len()
    }
}

impl Drop for VoteGenerator {
    fn drop(&mut self) {
        debug_assert!(self.thread.lock().unwrap().is_none())
    }
}

struct SharedState {
    ledger: Arc<Ledger>,
    representatives: Arc<WalletRepresentatives>,
    history: Arc<LocalVoteHistory>,
    is_final: bool,
    condition: Condvar,
    stopped: AtomicBool,
    queues: Mutex<Queues>,
    stats: Arc<Stats>,
    network: Arc<Network>,
    vote_broadcaster: Arc<VoteBroadcaster>,
    spacing: Mutex<VoteSpacing>,
    vote_generator_delay: Duration,
    vote_generator_threshold: usize,
}

impl SharedState {
    fn run(&self) {
        debug!(is_final = self.is_final, "Vote generator started");
        let mut queues = self.queues.lock().unwrap();
        while !self.stopped.load(Ordering::SeqCst) {
            if queues.candidates.len() >= VoteGenerator::MAX_HASHES {
                queues = self.broadcast(queues);
            } else if let Some(request) = queues.requests.pop_front() {
                drop(queues);
                self.reply(request);
                queues = self.queues.lock().unwrap();
            } else {
                queues = self
                    .condition
                    .wait_timeout_while(queues, self.vote_generator_delay, |lk| {
                        lk.candidates.len() < VoteGenerator::MAX_HASHES
                            && lk.requests.is_empty()
                            && !self.stopped.load(Ordering::SeqCst)
                    })
                    .unwrap()
                    .0;

                if queues.candidates.len() >= self.vote_generator_threshold
                    && queues.candidates.len() < VoteGenerator::MAX_HASHES
                    && !self.stopped.load(Ordering::SeqCst)
                {
                    queues = self
                        .condition
                        .wait_timeout_while(queues, self.vote_generator_delay, |lk| {
                            lk.candidates.len() < VoteGenerator::MAX_HASHES
                                && !self.stopped.load(Ordering::SeqCst)
                        })
                        .unwrap()
                        .0;
                }

                if !queues.candidates.is_empty() {
                    queues = self.broadcast(queues);
                }
            }
        }
        debug!(is_final = self.is_final, "Vote generator stopped");
    }

    fn broadcast<'a>(&'a self, mut queues: MutexGuard<'a, Queues>) -> MutexGuard<'a, Queues> {
        let mut hashes = Vec::with_capacity(VoteGenerator::MAX_HASHES);
        let mut roots = Vec::with_capacity(VoteGenerator::MAX_HASHES);
        {
            let spacing = self.spacing.lock().unwrap();
            while let Some((root, hash)) = queues.candidates.pop_front() {
                if !roots.contains(&root) {
                    if spacing.votable(&root, &hash) {
                        roots.push(root);
                        hashes.push(hash);
                    } else {
                        self.stats
                            .inc(StatType::VoteGenerator, DetailType::GeneratorSpacing);
                    }
                }
                if hashes.len() == VoteGenerator::MAX_HASHES {
                    break;
                }
            }
        }

        if !hashes.is_empty() {
            drop(queues);
            self.vote(&hashes, &roots, |vote| {
                self.vote_broadcaster.broadcast(vote);
                self.stats
                    .inc(StatType::VoteGenerator, DetailType::GeneratorBroadcasts);
            });
            queues = self.queues.lock().unwrap();
        }

        queues
    }

    fn vote<F>(&self, hashes: &[BlockHash], roots: &[Root], action: F)
    where
        F: Fn(Arc<Vote>),
    {
        debug_assert_eq!(hashes.len(), roots.len());
        let mut votes = Vec::new();
        self.representatives.foreach_representative(|key| {
            let timestamp = if self.is_final {
                Vote::TIMESTAMP_MAX
            } else {
                milliseconds_since_epoch()
            };
            let duration = if self.is_final {
                Vote::DURATION_MAX
            } else {
                0x9 /*8192ms*/
            };
            votes.push(Arc::new(Vote::new(key, timestamp, duration, hashes.to_vec())));
        });

        for vote in votes {
            {
                let mut spacing = self.spacing.lock().unwrap();
                for (root, hash) in roots.iter().zip(hashes) {
                    self.history.add(root, hash, &vote);
                    spacing.flag(root, hash);
                }
            }
            trace!(
                voter = %vote.voting_account,
                hashes = hashes.len(),
                is_final = self.is_final,
                "Generated vote"
            );
            action(vote);
        }
    }

    fn reply(&self, request: (Vec<(Root, BlockHash)>, Arc<Channel>)) {
        let (candidates, channel) = request;
        for chunk in candidates.chunks(VoteGenerator::MAX_HASHES) {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let mut hashes = Vec::with_capacity(VoteGenerator::MAX_HASHES);
            let mut roots = Vec::with_capacity(VoteGenerator::MAX_HASHES);
            {
                let spacing = self.spacing.lock().unwrap();
                for (root, hash) in chunk {
                    if !roots.contains(root) {
                        if spacing.votable(root, hash) {
                            roots.push(*root);
                            hashes.push(*hash);
                        } else {
                            self.stats
                                .inc(StatType::VoteGenerator, DetailType::GeneratorSpacing);
                        }
                    }
                }
            }
            if !hashes.is_empty() {
                self.stats.add_dir(
                    StatType::Requests,
                    DetailType::RequestsGeneratedHashes,
                    Direction::In,
                    hashes.len() as u64,
                );
                self.vote(&hashes, &roots, |vote| {
                    let confirm = Message::ConfirmAck(ConfirmAck::new_with_own_vote(vote));
                    self.network.send(&channel, &confirm);
                    self.stats.inc_dir(
                        StatType::Requests,
                        DetailType::RequestsGeneratedVotes,
                        Direction::In,
                    );
                });
            }
        }
        self.stats
            .inc(StatType::VoteGenerator, DetailType::GeneratorReplies);
    }

    fn should_vote_non_final(&self, txn: &ReadTransaction, root: &Root, hash: &BlockHash) -> bool {
        let Some(block) = self.ledger.any().get_block(txn, hash) else {
            return false;
        };
        debug_assert!(block.root() == *root);
        self.ledger.dependents_confirmed(txn, &block)
    }

    fn should_vote_final(&self, txn: &mut WriteTransaction, root: &Root, hash: &BlockHash) -> bool {
        let Some(block) = self.ledger.any().get_block(txn, hash) else {
            return false;
        };
        debug_assert!(block.root() == *root);
        self.ledger.dependents_confirmed(txn, &block)
            && self
                .ledger
                .store
                .final_vote
                .put(txn, &block.qualified_root(), hash)
    }
}

#[derive(Default)]
struct Queues {
    candidates: VecDeque<(Root, BlockHash)>,
    requests: VecDeque<(Vec<(Root, BlockHash)>, Arc<Channel>)>,
}
