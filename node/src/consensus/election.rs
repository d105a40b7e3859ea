use lattice_core::{Amount, Block, BlockHash, PublicKey, QualifiedRoot, Root};
#[cfg(test)]
use mock_instant::thread_local::Instant;
#[cfg(not(test))]
use std::time::Instant;
use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicUsize},
        Arc, Mutex,
    },
    time::{Duration, SystemTime},
};

static NEXT_ELECTION_ID: AtomicUsize = AtomicUsize::new(1);

pub type LiveVoteAction = Box<dyn Fn(PublicKey) + Send + Sync>;
pub type ConfirmationAction = Box<dyn Fn(Arc<Block>) + Send + Sync>;

/// Contest between the competing blocks of one qualified root
pub struct Election {
    pub id: usize,
    pub mutex: Mutex<ElectionData>,
    pub root: Root,
    pub qualified_root: QualifiedRoot,
    pub behavior: ElectionBehavior,
    pub election_start: Instant,
    pub is_quorum: AtomicBool,
    pub confirmation_request_count: AtomicU32,
    /// Called for every accepted live vote, with the voting representative
    pub live_vote_action: LiveVoteAction,
    /// Called once the election confirmed, with the winner
    pub confirmation_action: ConfirmationAction,
}

impl Election {
    pub const PASSIVE_DURATION_FACTOR: u32 = 5;

    pub fn new(
        block: Arc<Block>,
        behavior: ElectionBehavior,
        live_vote_action: LiveVoteAction,
        confirmation_action: ConfirmationAction,
    ) -> Self {
        let root = block.root();
        let qualified_root = block.qualified_root();
        let hash = block.hash();

        let data = ElectionData {
            status: ElectionStatus::new(block.clone()),
            state: ElectionState::Passive,
            // The null account vote makes sure the initial block is always part of the tally
            last_votes: HashMap::from([(PublicKey::zero(), VoteInfo::new(0, hash))]),
            last_blocks: HashMap::from([(hash, block)]),
            last_tally: HashMap::new(),
            final_weight: Amount::zero(),
            last_vote: None,
            last_block: None,
            last_block_hash: BlockHash::zero(),
            last_req: None,
        };

        Self {
            id: NEXT_ELECTION_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            mutex: Mutex::new(data),
            root,
            qualified_root,
            behavior,
            election_start: Instant::now(),
            is_quorum: AtomicBool::new(false),
            confirmation_request_count: AtomicU32::new(0),
            live_vote_action,
            confirmation_action,
        }
    }

    pub fn new_test_instance() -> Self {
        Self::new(
            Arc::new(Block::new_test_instance()),
            ElectionBehavior::Normal,
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
    }

    /// Elections that don't confirm in this time are dropped
    pub fn time_to_live(&self) -> Duration {
        match self.behavior {
            ElectionBehavior::Normal => Duration::from_secs(5 * 60),
            ElectionBehavior::Optimistic => Duration::from_secs(60),
        }
    }

    pub fn age(&self) -> Duration {
        self.election_start.elapsed()
    }

    pub fn winner_hash(&self) -> BlockHash {
        self.mutex.lock().unwrap().status.winner.hash()
    }

    pub fn state(&self) -> ElectionState {
        self.mutex.lock().unwrap().state
    }

    pub fn is_confirmed(&self) -> bool {
        self.mutex.lock().unwrap().is_confirmed()
    }

    pub fn failed(&self) -> bool {
        self.state() == ElectionState::ExpiredUnconfirmed
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.mutex.lock().unwrap().last_blocks.contains_key(hash)
    }

    pub fn vote_count(&self) -> usize {
        self.mutex.lock().unwrap().last_votes.len()
    }
}

impl Debug for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Election")
            .field("id", &self.id)
            .field("qualified_root", &self.qualified_root)
            .field("behavior", &self.behavior)
            .finish()
    }
}

pub struct ElectionData {
    pub status: ElectionStatus,
    pub state: ElectionState,
    pub last_votes: HashMap<PublicKey, VoteInfo>,
    pub last_blocks: HashMap<BlockHash, Arc<Block>>,
    pub last_tally: HashMap<BlockHash, Amount>,
    /// Final vote weight of the current winner
    pub final_weight: Amount,
    last_vote: Option<Instant>,
    last_block: Option<Instant>,
    pub last_block_hash: BlockHash,
    last_req: Option<Instant>,
}

impl ElectionData {
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.state,
            ElectionState::Confirmed | ElectionState::ExpiredConfirmed
        )
    }

    /// Compare-and-swap of the election state
    pub fn state_change(
        &mut self,
        expected: ElectionState,
        desired: ElectionState,
    ) -> anyhow::Result<()> {
        if Self::valid_change(expected, desired) && self.state == expected {
            self.state = desired;
            Ok(())
        } else {
            Err(anyhow!(
                "invalid election state change from {:?} to {:?}",
                self.state,
                desired
            ))
        }
    }

    fn valid_change(expected: ElectionState, desired: ElectionState) -> bool {
        match expected {
            ElectionState::Passive => matches!(
                desired,
                ElectionState::Active
                    | ElectionState::Confirmed
                    | ElectionState::ExpiredUnconfirmed
            ),
            ElectionState::Active => matches!(
                desired,
                ElectionState::Confirmed | ElectionState::ExpiredUnconfirmed
            ),
            ElectionState::Confirmed => matches!(desired, ElectionState::ExpiredConfirmed),
            ElectionState::ExpiredConfirmed | ElectionState::ExpiredUnconfirmed => false,
        }
    }

    pub fn last_vote_elapsed(&self) -> Duration {
        elapsed_or_max(self.last_vote)
    }

    pub fn set_last_vote(&mut self) {
        self.last_vote = Some(Instant::now());
    }

    pub fn last_block_elapsed(&self) -> Duration {
        elapsed_or_max(self.last_block)
    }

    pub fn set_last_block(&mut self) {
        self.last_block = Some(Instant::now());
    }

    pub fn last_req_elapsed(&self) -> Duration {
        elapsed_or_max(self.last_req)
    }

    pub fn set_last_req(&mut self) {
        self.last_req = Some(Instant::now());
    }

    pub(crate) fn update_status_to_confirmed(&mut self, election: &Election) {
        self.status.election_end = SystemTime::now();
        self.status.election_duration = election.election_start.elapsed();
        self.status.confirmation_request_count = election
            .confirmation_request_count
            .load(std::sync::atomic::Ordering::SeqCst);
        self.status.block_count = self.last_blocks.len() as u32;
        self.status.voter_count = self.last_votes.len() as u32;
        self.status.election_status_type = ElectionStatusType::ActiveConfirmedQuorum;
    }
}

fn elapsed_or_max(instant: Option<Instant>) -> Duration {
    match instant {
        Some(i) => i.elapsed(),
        None => Duration::MAX,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ElectionState {
    /// Only listening for incoming votes
    Passive,
    /// Actively request confirmations
    Active,
    Confirmed,
    ExpiredConfirmed,
    ExpiredUnconfirmed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ElectionBehavior {
    Normal,
    /// Started for blocks that are expected to confirm quickly, with a shorter lifetime
    Optimistic,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ElectionStatusType {
    Ongoing,
    ActiveConfirmedQuorum,
    ActiveConfirmationHeight,
    InactiveConfirmationHeight,
    Stopped,
}

/// Summary of an election, filled in when it ends
#[derive(Clone, Debug)]
pub struct ElectionStatus {
    pub winner: Arc<Block>,
    pub tally: Amount,
    pub final_tally: Amount,
    pub confirmation_request_count: u32,
    pub block_count: u32,
    pub voter_count: u32,
    pub election_end: SystemTime,
    pub election_duration: Duration,
    pub election_status_type: ElectionStatusType,
}

impl ElectionStatus {
    pub fn new(winner: Arc<Block>) -> Self {
        Self {
            winner,
            tally: Amount::zero(),
            final_tally: Amount::zero(),
            confirmation_request_count: 0,
            block_count: 1,
            voter_count: 0,
            election_end: SystemTime::now(),
            election_duration: Duration::ZERO,
            election_status_type: ElectionStatusType::Ongoing,
        }
    }
}

#[derive(Clone, Debug)]
pub struct VoteInfo {
    pub time: Instant,
    pub timestamp: u64,
    pub hash: BlockHash,
}

impl VoteInfo {
    pub fn new(timestamp: u64, hash: BlockHash) -> Self {
        Self {
            time: Instant::now(),
            timestamp,
            hash,
        }
    }
}

/// Sort key of a tally. Higher weights come first, equal weights are ordered by hash
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TallyKey {
    pub weight: Amount,
    pub hash: BlockHash,
}

impl TallyKey {
    pub fn new(weight: Amount, hash: BlockHash) -> Self {
        Self { weight, hash }
    }
}

impl Ord for TallyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

impl PartialOrd for TallyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
