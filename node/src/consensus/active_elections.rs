use super::{
    ConfirmationSolicitor, Election, ElectionBehavior, ElectionData, ElectionState,
    ElectionStatus, ElectionStatusType, LocalVoteHistory, RecentlyConfirmedCache, TallyKey,
    VoteCache, VoteGenerators, VoteInfo,
};
use crate::{
    block_processing::BlockProcessor,
    cementation::ConfirmingSet,
    config::NetworkParams,
    representatives::OnlineReps,
    stats::{DetailType, Sample, StatType, Stats},
    transport::{Message, Network},
    wallets::WalletRepresentatives,
};
use bounded_vec_deque::BoundedVecDeque;
use lattice_core::{
    Amount, Block, BlockHash, PublicKey, QualifiedRoot, SavedBlock, Vote, VoteCode, VoteSource,
};
use lattice_ledger::Ledger;
use std::{
    cmp::max,
    collections::{BTreeMap, HashMap},
    sync::{atomic::Ordering, Arc, Condvar, Mutex, MutexGuard},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, trace};

const ELECTION_MAX_BLOCKS: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveElectionsConfig {
    /// Maximum number of simultaneous elections
    pub size: usize,
    /// Number of cemented election results kept in memory
    pub confirmation_history_size: usize,
    /// Maximum number of roots in the recently confirmed cache
    pub confirmation_cache: usize,
}

impl Default for ActiveElectionsConfig {
    fn default() -> Self {
        Self {
            size: 5000,
            confirmation_history_size: 2048,
            confirmation_cache: 65536,
        }
    }
}

pub type VoteProcessedCallback =
    Box<dyn Fn(&Arc<Vote>, VoteSource, &HashMap<BlockHash, VoteCode>) + Send + Sync>;
pub type ElectionEndedCallback = Box<dyn Fn(&ElectionStatus) + Send + Sync>;
pub type BlockConfirmedCallback = Box<dyn Fn(&Arc<Block>) + Send + Sync>;
pub type ActivateSuccessorsCallback = Box<dyn Fn(&SavedBlock) + Send + Sync>;

/// The set of ongoing elections, at most one per qualified root
pub struct ActiveElections {
    mutex: Mutex<ActiveElectionsData>,
    condition: Condvar,
    network_params: NetworkParams,
    config: ActiveElectionsConfig,
    online_reps: Arc<Mutex<OnlineReps>>,
    representatives: Arc<WalletRepresentatives>,
    ledger: Arc<Ledger>,
    confirming_set: Arc<ConfirmingSet>,
    block_processor: Arc<BlockProcessor>,
    vote_generators: Arc<VoteGenerators>,
    history: Arc<LocalVoteHistory>,
    network: Arc<Network>,
    vote_cache: Arc<Mutex<VoteCache>>,
    stats: Arc<Stats>,
    recently_confirmed: Mutex<RecentlyConfirmedCache>,
    recently_cemented: Mutex<BoundedVecDeque<ElectionStatus>>,
    /// Elections that confirmed but whose winner is not cemented yet
    election_winner_details: Mutex<HashMap<BlockHash, Arc<Election>>>,
    vote_processed_observers: Mutex<Vec<VoteProcessedCallback>>,
    election_ended_observers: Mutex<Vec<ElectionEndedCallback>>,
    block_confirmed_observers: Mutex<Vec<BlockConfirmedCallback>>,
    activate_successors: Mutex<Option<ActivateSuccessorsCallback>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ActiveElections {
    pub fn new(
        network_params: NetworkParams,
        config: ActiveElectionsConfig,
        online_reps: Arc<Mutex<OnlineReps>>,
        representatives: Arc<WalletRepresentatives>,
        ledger: Arc<Ledger>,
        confirming_set: Arc<ConfirmingSet>,
        block_processor: Arc<BlockProcessor>,
        vote_generators: Arc<VoteGenerators>,
        history: Arc<LocalVoteHistory>,
        network: Arc<Network>,
        vote_cache: Arc<Mutex<VoteCache>>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            mutex: Mutex::new(ActiveElectionsData::default()),
            condition: Condvar::new(),
            recently_confirmed: Mutex::new(RecentlyConfirmedCache::new(config.confirmation_cache)),
            recently_cemented: Mutex::new(BoundedVecDeque::new(config.confirmation_history_size)),
            network_params,
            config,
            online_reps,
            representatives,
            ledger,
            confirming_set,
            block_processor,
            vote_generators,
            history,
            network,
            vote_cache,
            stats,
            election_winner_details: Mutex::new(HashMap::new()),
            vote_processed_observers: Mutex::new(Vec::new()),
            election_ended_observers: Mutex::new(Vec::new()),
            block_confirmed_observers: Mutex::new(Vec::new()),
            activate_successors: Mutex::new(None),
            thread: Mutex::new(None),
        }
    }

    pub fn add_vote_processed_observer(&self, observer: VoteProcessedCallback) {
        self.vote_processed_observers.lock().unwrap().push(observer);
    }

    /// Called for every cemented block, with or without an election
    pub fn add_election_ended_observer(&self, observer: ElectionEndedCallback) {
        self.election_ended_observers.lock().unwrap().push(observer);
    }

    /// Called once per election, when its winner reaches final quorum
    pub fn add_block_confirmed_observer(&self, observer: BlockConfirmedCallback) {
        self.block_confirmed_observers.lock().unwrap().push(observer);
    }

    pub fn set_activate_successors(&self, callback: ActivateSuccessorsCallback) {
        *self.activate_successors.lock().unwrap() = Some(callback);
    }

    pub fn stop(&self) {
        self.mutex.lock().unwrap().stopped = true;
        self.condition.notify_all();
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Request loop thread panicked");
            }
        }
        self.clear();
    }

    pub fn clear(&self) {
        let mut guard = self.mutex.lock().unwrap();
        guard.blocks.clear();
        guard.roots.clear();
        guard.normal_count = 0;
        guard.optimistic_count = 0;
    }

    pub fn len(&self) -> usize {
        self.mutex.lock().unwrap().roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_by_behavior(&self, behavior: ElectionBehavior) -> usize {
        self.mutex.lock().unwrap().count_by_behavior(behavior)
    }

    /// Free election slots, negative when overfilled
    pub fn vacancy(&self) -> i64 {
        self.config.size as i64 - self.len() as i64
    }

    /// Is there an election that contains this block?
    pub fn active(&self, hash: &BlockHash) -> bool {
        self.mutex.lock().unwrap().blocks.contains_key(hash)
    }

    pub fn active_root(&self, root: &QualifiedRoot) -> bool {
        self.mutex.lock().unwrap().roots.get(root).is_some()
    }

    pub fn election(&self, root: &QualifiedRoot) -> Option<Arc<Election>> {
        self.mutex.lock().unwrap().roots.get(root).cloned()
    }

    pub fn election_for_block(&self, hash: &BlockHash) -> Option<Arc<Election>> {
        self.mutex.lock().unwrap().blocks.get(hash).cloned()
    }

    /// Oldest elections first
    pub fn list_active(&self, max: usize) -> Vec<Arc<Election>> {
        let guard = self.mutex.lock().unwrap();
        guard
            .roots
            .iter_sequenced()
            .take(max)
            .map(|(_, election)| election.clone())
            .collect()
    }

    pub fn recently_confirmed(&self, hash: &BlockHash) -> bool {
        self.recently_confirmed.lock().unwrap().hash_exists(hash)
    }

    pub fn recently_confirmed_len(&self) -> usize {
        self.recently_confirmed.lock().unwrap().len()
    }

    pub fn recently_cemented_list(&self) -> Vec<ElectionStatus> {
        self.recently_cemented
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .collect()
    }

    pub fn erase(&self, root: &QualifiedRoot) -> bool {
        let guard = self.mutex.lock().unwrap();
        match guard.roots.get(root).cloned() {
            Some(election) => {
                self.cleanup_election(guard, &election);
                true
            }
            None => false,
        }
    }

    /// Elections of blocks that were rolled back are dropped, except for the
    /// election that caused the rollback
    pub fn block_rolled_back(&self, block: &SavedBlock, replacement_root: &QualifiedRoot) {
        let root = block.qualified_root();
        if root != *replacement_root && self.erase(&root) {
            debug!(block = %block.hash(), "Election of rolled back block erased");
        }
    }

    /// Routes the vote to the elections of its hashes.
    /// Votes for hashes without an election are cached, so they can be replayed once an election starts.
    pub fn vote(&self, vote: &Arc<Vote>, source: VoteSource) -> HashMap<BlockHash, VoteCode> {
        if vote.validate().is_err() {
            self.stats.inc(StatType::Vote, DetailType::Invalid);
            return vote
                .hashes
                .iter()
                .map(|hash| (*hash, VoteCode::Invalid))
                .collect();
        }

        let mut results = HashMap::new();
        let mut process = HashMap::new();
        {
            let guard = self.mutex.lock().unwrap();
            let recently_confirmed = self.recently_confirmed.lock().unwrap();
            for hash in &vote.hashes {
                if results.contains_key(hash) || process.contains_key(hash) {
                    continue;
                }
                if let Some(election) = guard.blocks.get(hash) {
                    process.insert(*hash, election.clone());
                } else if recently_confirmed.hash_exists(hash) {
                    results.insert(*hash, VoteCode::Replay);
                } else {
                    results.insert(*hash, VoteCode::Indeterminate);
                }
            }
        }

        for (hash, election) in process {
            let code = self.process_vote(
                &election,
                &vote.voting_account,
                vote.timestamp(),
                &hash,
                source,
            );
            results.insert(hash, code);
        }

        for code in results.values() {
            self.stats.inc(StatType::Vote, (*code).into());
        }
        self.stats.inc(StatType::ElectionVote, source.into());

        if source != VoteSource::Cache {
            let weight = self.ledger.weight(&vote.voting_account);
            self.vote_cache
                .lock()
                .unwrap()
                .insert(vote, weight, &results);
        }

        trace!(voter = %vote.voting_account, hashes = vote.hashes.len(), ?source, "Vote processed");

        for observer in self.vote_processed_observers.lock().unwrap().iter() {
            observer(vote, source, &results);
        }

        results
    }

    /// Applies a single vote to an election
    fn process_vote(
        &self,
        election: &Arc<Election>,
        rep: &PublicKey,
        timestamp: u64,
        block_hash: &BlockHash,
        source: VoteSource,
    ) -> VoteCode {
        let weight = self.ledger.weight(rep);
        if !self.network_params.network.is_dev_network()
            && weight < self.online_reps.lock().unwrap().minimum_principal_weight()
        {
            return VoteCode::Ignored;
        }
        let cooldown = self.cooldown_time(weight);

        let mut guard = election.mutex.lock().unwrap();
        if let Some(last_vote) = guard.last_votes.get(rep) {
            if (timestamp, *block_hash) <= (last_vote.timestamp, last_vote.hash) {
                return VoteCode::Replay;
            }

            let max_vote = timestamp == Vote::FINAL_TIMESTAMP && last_vote.timestamp < timestamp;
            // Only live votes are subject to the cooldown
            let past_cooldown = source != VoteSource::Live || last_vote.time.elapsed() >= cooldown;
            if !max_vote && !past_cooldown {
                return VoteCode::Replay;
            }
        }

        guard
            .last_votes
            .insert(*rep, VoteInfo::new(timestamp, *block_hash));
        if source == VoteSource::Live {
            (election.live_vote_action)(*rep);
        }

        self.stats.inc(
            StatType::Election,
            if source == VoteSource::Cache {
                DetailType::VoteCached
            } else {
                DetailType::VoteNew
            },
        );
        trace!(
            qualified_root = ?election.qualified_root,
            account = %rep,
            hash = %block_hash,
            final_vote = timestamp == Vote::FINAL_TIMESTAMP,
            %weight,
            "Vote accepted"
        );

        if !guard.is_confirmed() {
            self.confirm_if_quorum(guard, election);
        }
        VoteCode::Vote
    }

    /// Low weight representatives have to wait longer before they can switch their vote
    fn cooldown_time(&self, weight: Amount) -> Duration {
        let online_stake = self.online_reps.lock().unwrap().trended().number();
        if weight.number() >= online_stake / 20 {
            // Reps with more than 5% weight
            Duration::ZERO
        } else if weight.number() >= online_stake / 100 {
            Duration::from_secs(1)
        } else if weight.number() >= online_stake / 1000 {
            Duration::from_secs(5)
        } else {
            Duration::from_secs(15)
        }
    }

    pub fn tally(&self, election: &Election) -> BTreeMap<TallyKey, Arc<Block>> {
        let mut guard = election.mutex.lock().unwrap();
        self.tally_impl(&mut guard)
    }

    /// Sums the voting weight per block, highest weight first
    fn tally_impl(&self, guard: &mut ElectionData) -> BTreeMap<TallyKey, Arc<Block>> {
        let mut block_weights: HashMap<BlockHash, Amount> = HashMap::new();
        let mut final_weights: HashMap<BlockHash, Amount> = HashMap::new();
        for (rep, info) in &guard.last_votes {
            let weight = self.ledger.weight(rep);
            *block_weights.entry(info.hash).or_default() += weight;
            if info.timestamp == Vote::FINAL_TIMESTAMP {
                *final_weights.entry(info.hash).or_default() += weight;
            }
        }

        let result: BTreeMap<TallyKey, Arc<Block>> = block_weights
            .iter()
            .filter_map(|(hash, weight)| {
                guard
                    .last_blocks
                    .get(hash)
                    .map(|block| (TallyKey::new(*weight, *hash), block.clone()))
            })
            .collect();

        guard.final_weight = result
            .keys()
            .next()
            .and_then(|winner| final_weights.get(&winner.hash).copied())
            .unwrap_or_default();
        guard.last_tally = block_weights;
        result
    }

    /// The weight voting on this root, summed over all candidates, reaches the quorum delta
    fn have_quorum(tally: &BTreeMap<TallyKey, Arc<Block>>, delta: Amount) -> bool {
        Self::tally_sum(tally) >= delta
    }

    fn tally_sum(tally: &BTreeMap<TallyKey, Arc<Block>>) -> Amount {
        tally
            .keys()
            .fold(Amount::zero(), |sum, key| sum + key.weight)
    }

    fn confirm_if_quorum(&self, mut guard: MutexGuard<ElectionData>, election: &Arc<Election>) {
        let tally = self.tally_impl(&mut guard);
        let Some((winner_key, winner_block)) = tally.iter().next() else {
            return;
        };
        let winner_block = winner_block.clone();
        guard.status.tally = winner_key.weight;
        guard.status.final_tally = guard.final_weight;

        let delta = self.online_reps.lock().unwrap().delta();
        let sum = Self::tally_sum(&tally);
        let old_winner = guard.status.winner.hash();

        if sum >= delta && winner_block.hash() != old_winner {
            guard.status.winner = winner_block.clone();
            self.remove_votes(election, &mut guard, &old_winner);
            debug!(
                qualified_root = ?election.qualified_root,
                old_winner = %old_winner,
                new_winner = %winner_block.hash(),
                "Election winner changed"
            );
            self.block_processor.force(winner_block.as_ref().clone());
        }

        if !Self::have_quorum(&tally, delta) {
            return;
        }

        let generate_final_vote = !election.is_quorum.swap(true, Ordering::SeqCst)
            && self.representatives.voting_reps_count() > 0;
        let winner_hash = guard.status.winner.hash();

        if guard.final_weight >= delta {
            self.confirm_once(guard, election);
        } else {
            drop(guard);
        }

        if generate_final_vote {
            self.stats
                .inc(StatType::Election, DetailType::GenerateVoteFinal);
            self.vote_generators
                .generate_final_vote(&election.root, &winner_hash);
        }
    }

    /// Drops our own votes for a block that lost the election
    fn remove_votes(&self, election: &Election, guard: &mut ElectionData, hash: &BlockHash) {
        if self.representatives.voting_reps_count() == 0 {
            return;
        }
        for vote in self.history.votes(&election.root, hash, false) {
            guard.last_votes.remove(&vote.voting_account);
        }
        self.history.erase(&election.root);
    }

    fn confirm_once(&self, mut guard: MutexGuard<ElectionData>, election: &Arc<Election>) {
        let mut winners = self.election_winner_details.lock().unwrap();
        let just_confirmed = matches!(guard.state, ElectionState::Passive | ElectionState::Active);
        let winner_hash = guard.status.winner.hash();

        if !just_confirmed || winners.contains_key(&winner_hash) {
            drop(winners);
            drop(guard);
            self.stats
                .inc(StatType::Election, DetailType::ConfirmOnceFailed);
            return;
        }

        guard.state = ElectionState::Confirmed;
        winners.insert(winner_hash, election.clone());
        drop(winners);

        guard.update_status_to_confirmed(election);
        let status = guard.status.clone();
        self.recently_confirmed
            .lock()
            .unwrap()
            .put(election.qualified_root, winner_hash);
        drop(guard);

        self.stats.inc(StatType::Election, DetailType::ConfirmOnce);
        trace!(
            qualified_root = ?election.qualified_root,
            winner = %winner_hash,
            tally = %status.tally,
            final_tally = %status.final_tally,
            "Election confirmed"
        );

        self.process_confirmed(&status);
        (election.confirmation_action)(status.winner.clone());
    }

    /// Hands the winner over to be cemented
    fn process_confirmed(&self, status: &ElectionStatus) {
        self.stats
            .inc(StatType::ActiveElections, DetailType::Confirmed);
        self.confirming_set.add(status.winner.hash());
    }

    /// Confirms the election if the block is its winner
    pub fn try_confirm(&self, election: &Arc<Election>, hash: &BlockHash) {
        let guard = election.mutex.lock().unwrap();
        if guard.status.winner.hash() == *hash && !guard.is_confirmed() {
            self.confirm_once(guard, election);
        }
    }

    /// Confirms the current winner without votes. Only allowed on the dev network.
    pub fn force_confirm(&self, election: &Arc<Election>) {
        debug_assert!(self.network_params.network.is_dev_network());
        let guard = election.mutex.lock().unwrap();
        if !guard.is_confirmed() {
            self.confirm_once(guard, election);
        }
    }

    fn remove_election_winner_details(&self, hash: &BlockHash) -> Option<Arc<Election>> {
        self.election_winner_details.lock().unwrap().remove(hash)
    }

    pub fn winner_details_len(&self) -> usize {
        self.election_winner_details.lock().unwrap().len()
    }

    /// Called by the confirming set for every block that got cemented
    pub fn block_cemented(&self, block: &SavedBlock) {
        let hash = block.hash();
        if let Some(election) = self.election(&block.qualified_root()) {
            self.try_confirm(&election, &hash);
        }

        let election = self.remove_election_winner_details(&hash);
        let mut status = match &election {
            Some(election) => election.mutex.lock().unwrap().status.clone(),
            None => ElectionStatus::new(Arc::new(Block::clone(block))),
        };

        status.election_status_type = if self.confirming_set.contains(&hash) {
            ElectionStatusType::ActiveConfirmedQuorum
        } else if election.is_some() {
            ElectionStatusType::ActiveConfirmationHeight
        } else {
            ElectionStatusType::InactiveConfirmationHeight
        };

        self.recently_cemented
            .lock()
            .unwrap()
            .push_back(status.clone());
        self.stats
            .inc(StatType::ActiveElections, DetailType::Cemented);
        trace!(block = %hash, status = ?status.election_status_type, "Block cemented");

        for observer in self.election_ended_observers.lock().unwrap().iter() {
            observer(&status);
        }

        // Next-block activations are only done for blocks with previously active elections
        let was_active = matches!(
            status.election_status_type,
            ElectionStatusType::ActiveConfirmedQuorum
                | ElectionStatusType::ActiveConfirmationHeight
        );
        if was_active {
            if let Some(activate) = self.activate_successors.lock().unwrap().as_ref() {
                activate(block);
            }
        }
    }

    fn notify_block_confirmed(&self, block: &Arc<Block>) {
        for observer in self.block_confirmed_observers.lock().unwrap().iter() {
            observer(block);
        }
    }

    /// Replays cached votes for a block that just became part of an election
    fn trigger_vote_cache(&self, hash: &BlockHash) -> bool {
        let cached = self.vote_cache.lock().unwrap().find(hash);
        for vote in &cached {
            self.vote(vote, VoteSource::Cache);
        }
        !cached.is_empty()
    }

    /// Adds a fork to the election of its root.
    /// Returns true if the block was not added.
    pub fn publish_block(&self, block: &Block) -> bool {
        let root = block.qualified_root();
        let Some(election) = self.election(&root) else {
            return true;
        };

        let block = Arc::new(block.clone());
        let (rejected, replaced) = self.publish(&block, &election);

        if let Some(replaced) = replaced {
            self.mutex.lock().unwrap().blocks.remove(&replaced);
            self.stats.inc(StatType::Election, DetailType::Replaced);
            debug!(qualified_root = ?root, replaced = %replaced, by = %block.hash(), "Election block replaced");
        }

        if !rejected {
            self.mutex
                .lock()
                .unwrap()
                .blocks
                .insert(block.hash(), election.clone());
            self.trigger_vote_cache(&block.hash());
            self.stats
                .inc(StatType::ActiveElections, DetailType::ElectionBlockConflict);
            debug!(qualified_root = ?root, block = %block.hash(), "Fork added to election");
        }

        rejected
    }

    /// Returns true if the block was rejected, and the block that was evicted to make room for it
    fn publish(&self, block: &Arc<Block>, election: &Election) -> (bool, Option<BlockHash>) {
        let mut guard = election.mutex.lock().unwrap();

        // Do not insert new blocks if already confirmed
        if guard.is_confirmed() {
            return (true, None);
        }

        let hash = block.hash();
        if guard.last_blocks.contains_key(&hash) {
            guard.last_blocks.insert(hash, block.clone());
            let is_winner = guard.status.winner.hash() == hash;
            if is_winner {
                guard.status.winner = block.clone();
            }
            drop(guard);
            if is_winner {
                self.network.flood(&Message::Publish(block.as_ref().clone()));
            }
            return (true, None);
        }

        let mut replaced = None;
        if guard.last_blocks.len() >= ELECTION_MAX_BLOCKS {
            match self.replace_by_weight(&mut guard, &hash) {
                Some(evicted) => replaced = Some(evicted),
                None => return (true, None),
            }
        }

        guard.last_blocks.insert(hash, block.clone());
        (false, replaced)
    }

    /// Evicts a block of a full election, if the new block has more cached vote weight.
    /// The current winner is never evicted.
    fn replace_by_weight(&self, guard: &mut ElectionData, hash: &BlockHash) -> Option<BlockHash> {
        let inactive_tally = self.vote_cache.lock().unwrap().tally(hash);
        if inactive_tally.is_zero() {
            return None;
        }

        let winner_hash = guard.status.winner.hash();
        let mut candidates: Vec<(BlockHash, Amount)> = guard
            .last_blocks
            .keys()
            .filter(|candidate| **candidate != winner_hash)
            .map(|candidate| {
                let tally = guard.last_tally.get(candidate).copied().unwrap_or_default();
                (*candidate, tally)
            })
            .collect();
        candidates.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        let replaced = match candidates.first() {
            Some((candidate, tally)) if tally.is_zero() => *candidate,
            Some((candidate, tally)) if inactive_tally > *tally => *candidate,
            _ => return None,
        };

        guard.last_blocks.remove(&replaced);
        guard.last_votes.retain(|_, info| info.hash != replaced);
        guard.last_tally.remove(&replaced);
        Some(replaced)
    }

    /// Erases all blocks of the election from the container
    fn cleanup_election(&self, mut guard: MutexGuard<ActiveElectionsData>, election: &Arc<Election>) {
        debug_assert!(guard.count_by_behavior(election.behavior) > 0);
        let count = guard.count_by_behavior_mut(election.behavior);
        *count = count.saturating_sub(1);

        let blocks: Vec<BlockHash> = election
            .mutex
            .lock()
            .unwrap()
            .last_blocks
            .keys()
            .cloned()
            .collect();
        for hash in &blocks {
            guard.blocks.remove(hash);
        }
        guard.roots.erase(&election.qualified_root);
        drop(guard);

        let completion = if election.is_confirmed() {
            DetailType::Confirmed
        } else if election.failed() {
            DetailType::ExpiredUnconfirmed
        } else {
            DetailType::Erase
        };
        self.stats.inc(StatType::ActiveElections, completion);
        self.stats.sample(
            Sample::ActiveElectionDuration,
            election.age().as_millis() as i64,
            (0, 1000 * 60 * 10),
        );
        trace!(election = ?election, blocks = blocks.len(), "Election stopped");
    }

    fn erase_oldest(&self) {
        let guard = self.mutex.lock().unwrap();
        let oldest = guard
            .roots
            .iter_sequenced()
            .next()
            .map(|(_, election)| election.clone());
        if let Some(election) = oldest {
            self.cleanup_election(guard, &election);
        }
    }

    /// Erases the oldest elections while over capacity
    fn trim(&self) {
        while self.vacancy() < 0 {
            self.stats.inc(StatType::ActiveElections, DetailType::Overfill);
            self.erase_oldest();
        }
    }

    fn confirm_req_time(&self, election: &Election) -> Duration {
        let base_latency = self.network_params.network.base_latency;
        match election.behavior {
            ElectionBehavior::Normal => base_latency * 5,
            ElectionBehavior::Optimistic => base_latency * 2,
        }
    }

    fn block_broadcast_interval(&self) -> Duration {
        self.network_params.network.base_latency * 15
    }

    /// Decides which vote to generate for the current winner.
    /// Final votes are generated once the election reached quorum or confirmed.
    fn vote_to_broadcast(&self, guard: &mut ElectionData) -> Option<(bool, BlockHash)> {
        if guard.last_vote_elapsed() < self.network_params.network.vote_broadcast_interval {
            return None;
        }
        guard.set_last_vote();
        if self.representatives.voting_reps_count() == 0 {
            return None;
        }
        let is_final = guard.is_confirmed() || {
            let tally = self.tally_impl(guard);
            Self::have_quorum(&tally, self.online_reps.lock().unwrap().delta())
        };
        Some((is_final, guard.status.winner.hash()))
    }

    fn generate_vote(&self, election: &Election, is_final: bool, hash: &BlockHash) {
        if is_final {
            self.stats
                .inc(StatType::Election, DetailType::GenerateVoteFinal);
            trace!(qualified_root = ?election.qualified_root, winner = %hash, "type" = "final", "Broadcast vote");
            self.vote_generators.generate_final_vote(&election.root, hash);
        } else {
            self.stats
                .inc(StatType::Election, DetailType::GenerateVoteNormal);
            trace!(qualified_root = ?election.qualified_root, winner = %hash, "type" = "normal", "Broadcast vote");
            self.vote_generators
                .generate_non_final_vote(&election.root, hash);
        }
    }

    fn broadcast_vote(&self, election: &Election) {
        let vote = {
            let mut guard = election.mutex.lock().unwrap();
            self.vote_to_broadcast(&mut guard)
        };
        if let Some((is_final, hash)) = vote {
            self.generate_vote(election, is_final, &hash);
        }
    }

    fn broadcast_block(&self, solicitor: &mut ConfirmationSolicitor, guard: &mut ElectionData) {
        let winner = guard.status.winner.hash();
        let due = guard.last_block_elapsed() >= self.block_broadcast_interval()
            || guard.last_block_hash != winner;
        if due && solicitor.broadcast(guard) {
            self.stats
                .inc(StatType::Election, DetailType::BroadcastBlock);
            guard.set_last_block();
            guard.last_block_hash = winner;
        }
    }

    fn send_confirm_req(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        election: &Election,
        guard: &mut ElectionData,
    ) {
        if guard.last_req_elapsed() > self.confirm_req_time(election)
            && solicitor.add(election, guard)
        {
            guard.set_last_req();
            election
                .confirmation_request_count
                .fetch_add(1, Ordering::SeqCst);
            self.stats
                .inc(StatType::Election, DetailType::ConfirmationRequest);
        }
    }

    /// Advances the election state machine. Returns true if the election is done and can be erased.
    fn transition_time(&self, solicitor: &mut ConfirmationSolicitor, election: &Election) -> bool {
        let mut guard = election.mutex.lock().unwrap();
        let mut result = false;
        let mut vote = None;

        match guard.state {
            ElectionState::Passive => {
                let passive_duration =
                    self.network_params.network.base_latency * Election::PASSIVE_DURATION_FACTOR;
                if election.age() > passive_duration {
                    let _ = guard.state_change(ElectionState::Passive, ElectionState::Active);
                }
            }
            ElectionState::Active => {
                vote = self.vote_to_broadcast(&mut guard);
                self.broadcast_block(solicitor, &mut guard);
                self.send_confirm_req(solicitor, election, &mut guard);
            }
            ElectionState::Confirmed => {
                result = true;
                let _ = guard.state_change(ElectionState::Confirmed, ElectionState::ExpiredConfirmed);
            }
            ElectionState::ExpiredConfirmed | ElectionState::ExpiredUnconfirmed => {
                result = true;
            }
        }

        if !guard.is_confirmed() && election.age() > election.time_to_live() {
            let state = guard.state;
            if guard
                .state_change(state, ElectionState::ExpiredUnconfirmed)
                .is_ok()
            {
                result = true;
                guard.status.election_status_type = ElectionStatusType::Stopped;
                self.stats
                    .inc(StatType::Election, DetailType::ElectionExpired);
                debug!(election = ?election, "Election expired");
            }
        }
        drop(guard);

        if let Some((is_final, hash)) = vote {
            self.generate_vote(election, is_final, &hash);
        }
        result
    }

    /// Runs one round of the state machine over all elections
    fn request_confirm(&self) {
        let elections: Vec<Arc<Election>> = {
            let guard = self.mutex.lock().unwrap();
            guard
                .roots
                .iter_sequenced()
                .map(|(_, election)| election.clone())
                .collect()
        };

        let mut solicitor = ConfirmationSolicitor::new(&self.network_params, &self.network);
        solicitor.prepare(self.network.list());

        for election in elections {
            if self.transition_time(&mut solicitor, &election) {
                self.erase(&election.qualified_root);
            }
        }

        solicitor.flush();
    }

    fn run(&self) {
        let interval = self.network_params.network.aec_loop_interval;
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            let stamp = Instant::now();
            drop(guard);

            self.stats.inc(StatType::ActiveElections, DetailType::Loop);
            self.request_confirm();

            guard = self.mutex.lock().unwrap();
            let min_sleep = interval / 2;
            let wait = max(
                min_sleep,
                (stamp + interval).saturating_duration_since(Instant::now()),
            );
            guard = self
                .condition
                .wait_timeout_while(guard, wait, |data| !data.stopped)
                .unwrap()
                .0;
        }
    }
}

impl Drop for ActiveElections {
    fn drop(&mut self) {
        debug_assert!(self.thread.lock().unwrap().is_none());
    }
}

pub trait ActiveElectionsExt {
    fn start(&self);
    /// Starts an election for the block, unless its root was recently confirmed.
    /// Returns whether a new election was inserted, and the election of the root.
    fn insert(
        &self,
        block: &Arc<Block>,
        behavior: ElectionBehavior,
    ) -> (bool, Option<Arc<Election>>);
}

impl ActiveElectionsExt for Arc<ActiveElections> {
    fn start(&self) {
        debug_assert!(self.thread.lock().unwrap().is_none());
        let self_l = Arc::clone(self);
        match std::thread::Builder::new()
            .name("Request loop".to_string())
            .spawn(move || self_l.run())
        {
            Ok(handle) => *self.thread.lock().unwrap() = Some(handle),
            Err(e) => error!("Could not start request loop: {e}"),
        }
        info!("Active elections started");
    }

    fn insert(
        &self,
        block: &Arc<Block>,
        behavior: ElectionBehavior,
    ) -> (bool, Option<Arc<Election>>) {
        let mut guard = self.mutex.lock().unwrap();
        if guard.stopped {
            return (false, None);
        }

        let root = block.qualified_root();
        let hash = block.hash();
        let mut inserted = false;

        let election = if let Some(existing) = guard.roots.get(&root) {
            Some(existing.clone())
        } else if !self.recently_confirmed.lock().unwrap().root_exists(&root) {
            let online_reps = self.online_reps.clone();
            let live_vote_action: Box<dyn Fn(PublicKey) + Send + Sync> =
                Box::new(move |rep| online_reps.lock().unwrap().observe(rep));
            let self_w = Arc::downgrade(self);
            let confirmation_action: Box<dyn Fn(Arc<Block>) + Send + Sync> =
                Box::new(move |block| {
                    if let Some(active) = self_w.upgrade() {
                        active.notify_block_confirmed(&block);
                    }
                });

            let election = Arc::new(Election::new(
                block.clone(),
                behavior,
                live_vote_action,
                confirmation_action,
            ));
            guard.roots.insert(root, election.clone());
            guard.blocks.insert(hash, election.clone());
            *guard.count_by_behavior_mut(behavior) += 1;
            inserted = true;

            self.stats
                .inc(StatType::ActiveElections, DetailType::ElectionStart);
            trace!(?behavior, election = ?election, "Election started");
            Some(election)
        } else {
            None
        };
        drop(guard);

        if inserted {
            self.trigger_vote_cache(&hash);
        }

        // Votes are generated for inserted or ongoing elections
        if let Some(election) = &election {
            self.broadcast_vote(election);
        }

        if inserted {
            self.trim();
        }

        (inserted, election)
    }
}

#[derive(Default)]
struct ActiveElectionsData {
    roots: OrderedRoots,
    blocks: HashMap<BlockHash, Arc<Election>>,
    stopped: bool,
    normal_count: usize,
    optimistic_count: usize,
}

impl ActiveElectionsData {
    fn count_by_behavior(&self, behavior: ElectionBehavior) -> usize {
        match behavior {
            ElectionBehavior::Normal => self.normal_count,
            ElectionBehavior::Optimistic => self.optimistic_count,
        }
    }

    fn count_by_behavior_mut(&mut self, behavior: ElectionBehavior) -> &mut usize {
        match behavior {
            ElectionBehavior::Normal => &mut self.normal_count,
            ElectionBehavior::Optimistic => &mut self.optimistic_count,
        }
    }
}

/// Elections by root, in insertion order
#[derive(Default)]
struct OrderedRoots {
    by_root: HashMap<QualifiedRoot, Arc<Election>>,
    sequenced: Vec<QualifiedRoot>,
}

impl OrderedRoots {
    fn insert(&mut self, root: QualifiedRoot, election: Arc<Election>) {
        if self.by_root.insert(root, election).is_none() {
            self.sequenced.push(root);
        }
    }

    fn get(&self, root: &QualifiedRoot) -> Option<&Arc<Election>> {
        self.by_root.get(root)
    }

    fn erase(&mut self, root: &QualifiedRoot) {
        if self.by_root.remove(root).is_some() {
            self.sequenced.retain(|x| x != root)
        }
    }

    fn clear(&mut self) {
        self.sequenced.clear();
        self.by_root.clear();
    }

    fn len(&self) -> usize {
        self.sequenced.len()
    }

    fn iter_sequenced(&self) -> impl Iterator<Item = (&QualifiedRoot, &Arc<Election>)> {
        self.sequenced
            .iter()
            .filter_map(|root| self.by_root.get(root).map(|election| (root, election)))
    }
}

impl From<VoteCode> for DetailType {
    fn from(value: VoteCode) -> Self {
        match value {
            VoteCode::Invalid => DetailType::Invalid,
            VoteCode::Replay => DetailType::Replay,
            VoteCode::Vote => DetailType::Vote,
            VoteCode::Indeterminate => DetailType::Indeterminate,
            VoteCode::Ignored => DetailType::Ignored,
        }
    }
}

impl From<VoteSource> for DetailType {
    fn from(value: VoteSource) -> Self {
        match value {
            VoteSource::Live => DetailType::Live,
            VoteSource::Rebroadcast => DetailType::Rebroadcast,
            VoteSource::Cache => DetailType::Cache,
        }
    }
}
