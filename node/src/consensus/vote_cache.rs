use crate::stats::{DetailType, StatType, Stats};
use lattice_core::{Amount, BlockHash, PublicKey, Vote, VoteCode};
#[cfg(test)]
use mock_instant::thread_local::Instant;
#[cfg(not(test))]
use std::time::Instant;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

#[derive(Clone, Debug, PartialEq)]
pub struct VoteCacheConfig {
    pub max_size: usize,
    pub max_voters: usize,
    pub age_cutoff: Duration,
}

impl Default for VoteCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1024 * 64,
            max_voters: 64,
            age_cutoff: Duration::from_secs(15 * 60),
        }
    }
}

/// Votes for blocks that have no election (yet). When an election for such a
/// block starts, the cached votes are replayed into it.
/// The oldest entries are evicted first once `max_size` is reached.
pub struct VoteCache {
    config: VoteCacheConfig,
    stats: Arc<Stats>,
    by_hash: HashMap<BlockHash, CacheEntry>,
    sequenced: BTreeMap<u64, BlockHash>,
    next_id: u64,
    last_cleanup: Instant,
}

impl VoteCache {
    pub fn new(config: VoteCacheConfig, stats: Arc<Stats>) -> Self {
        Self {
            config,
            stats,
            by_hash: HashMap::new(),
            sequenced: BTreeMap::new(),
            next_id: 0,
            last_cleanup: Instant::now(),
        }
    }

    /// Caches the vote for every hash that was not processed by an election.
    /// An empty `results` map caches all hashes of the vote.
    pub fn insert(
        &mut self,
        vote: &Arc<Vote>,
        rep_weight: Amount,
        results: &HashMap<BlockHash, VoteCode>,
    ) {
        for hash in &vote.hashes {
            let cache = match results.get(hash) {
                None => results.is_empty(),
                Some(code) => matches!(code, VoteCode::Vote | VoteCode::Indeterminate),
            };
            if cache {
                self.insert_impl(vote, *hash, rep_weight);
            }
        }

        if self.last_cleanup.elapsed() >= self.config.age_cutoff / 2 {
            self.cleanup();
            self.last_cleanup = Instant::now();
        }
    }

    fn insert_impl(&mut self, vote: &Arc<Vote>, hash: BlockHash, rep_weight: Amount) {
        if let Some(entry) = self.by_hash.get_mut(&hash) {
            self.stats.inc(StatType::VoteCache, DetailType::Vote);
            entry.vote(vote, rep_weight, self.config.max_voters);
            return;
        }

        self.stats.inc(StatType::VoteCache, DetailType::Insert);
        let id = self.next_id;
        self.next_id += 1;
        let mut entry = CacheEntry::new(id, hash);
        entry.vote(vote, rep_weight, self.config.max_voters);
        self.by_hash.insert(hash, entry);
        self.sequenced.insert(id, hash);

        while self.by_hash.len() > self.config.max_size {
            match self.sequenced.pop_first() {
                Some((_, oldest)) => {
                    self.by_hash.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Cached votes for the given block
    pub fn find(&self, hash: &BlockHash) -> Vec<Arc<Vote>> {
        self.by_hash
            .get(hash)
            .map(|entry| entry.votes())
            .unwrap_or_default()
    }

    /// Weight of all representatives that voted for the block
    pub fn tally(&self, hash: &BlockHash) -> Amount {
        self.by_hash
            .get(hash)
            .map(|entry| entry.tally())
            .unwrap_or_default()
    }

    pub fn final_tally(&self, hash: &BlockHash) -> Amount {
        self.by_hash
            .get(hash)
            .map(|entry| entry.final_tally())
            .unwrap_or_default()
    }

    /// Returns true if the hash was cached
    pub fn erase(&mut self, hash: &BlockHash) -> bool {
        match self.by_hash.remove(hash) {
            Some(entry) => {
                self.sequenced.remove(&entry.id);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.by_hash.clear();
        self.sequenced.clear();
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    fn cleanup(&mut self) {
        let cutoff = self.config.age_cutoff;
        let expired: Vec<BlockHash> = self
            .by_hash
            .values()
            .filter(|entry| entry.last_vote.elapsed() >= cutoff)
            .map(|entry| entry.hash)
            .collect();
        for hash in expired {
            self.erase(&hash);
        }
    }
}

/// Votes of all representatives for a single block
struct CacheEntry {
    id: u64,
    hash: BlockHash,
    voters: Vec<VoterEntry>,
    last_vote: Instant,
}

struct VoterEntry {
    representative: PublicKey,
    weight: Amount,
    vote: Arc<Vote>,
}

impl CacheEntry {
    fn new(id: u64, hash: BlockHash) -> Self {
        Self {
            id,
            hash,
            voters: Vec::new(),
            last_vote: Instant::now(),
        }
    }

    fn tally(&self) -> Amount {
        self.voters.iter().map(|v| v.weight).sum()
    }

    fn final_tally(&self) -> Amount {
        self.voters
            .iter()
            .filter(|v| v.vote.is_final())
            .map(|v| v.weight)
            .sum()
    }

    fn votes(&self) -> Vec<Arc<Vote>> {
        self.voters.iter().map(|v| Arc::clone(&v.vote)).collect()
    }

    /// Returns true if the vote was added or replaced an older one
    fn vote(&mut self, vote: &Arc<Vote>, rep_weight: Amount, max_voters: usize) -> bool {
        let representative = vote.voting_account;
        if let Some(existing) = self
            .voters
            .iter_mut()
            .find(|v| v.representative == representative)
        {
            if vote.timestamp() <= existing.vote.timestamp() {
                return false;
            }
            existing.vote = Arc::clone(vote);
            existing.weight = rep_weight;
            self.last_vote = Instant::now();
            return true;
        }

        if self.voters.len() >= max_voters {
            // only heavier representatives displace the lightest voter
            let Some((lowest_index, lowest)) = self
                .voters
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.weight)
            else {
                return false;
            };
            if rep_weight <= lowest.weight {
                return false;
            }
            self.voters.swap_remove(lowest_index);
        }

        self.voters.push(VoterEntry {
            representative,
            weight: rep_weight,
            vote: Arc::clone(vote),
        });
        self.last_vote = Instant::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::PrivateKey;
    use mock_instant::thread_local::MockClock;

    fn create_cache() -> VoteCache {
        VoteCache::new(VoteCacheConfig::default(), Arc::new(Stats::default()))
    }

    fn create_vote(key: &PrivateKey, hash: BlockHash, timestamp: u64) -> Arc<Vote> {
        Arc::new(Vote::new(key, timestamp, 0, vec![hash]))
    }

    #[test]
    fn empty() {
        let cache = create_cache();
        assert!(cache.is_empty());
        assert!(cache.find(&BlockHash::from(1)).is_empty());
        assert_eq!(cache.tally(&BlockHash::from(1)), Amount::zero());
    }

    #[test]
    fn insert_one_hash() {
        let mut cache = create_cache();
        let hash = BlockHash::from(1);
        let vote = create_vote(&PrivateKey::from(1), hash, 16);

        cache.insert(&vote, Amount::raw(7), &HashMap::new());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find(&hash), vec![vote]);
        assert_eq!(cache.tally(&hash), Amount::raw(7));
        assert_eq!(cache.final_tally(&hash), Amount::zero());
    }

    #[test]
    fn tally_of_multiple_reps() {
        let mut cache = create_cache();
        let hash = BlockHash::from(1);
        cache.insert(
            &create_vote(&PrivateKey::from(1), hash, 16),
            Amount::raw(7),
            &HashMap::new(),
        );
        cache.insert(
            &Arc::new(Vote::new_final(&PrivateKey::from(2), vec![hash])),
            Amount::raw(9),
            &HashMap::new(),
        );

        assert_eq!(cache.tally(&hash), Amount::raw(16));
        assert_eq!(cache.final_tally(&hash), Amount::raw(9));
        assert_eq!(cache.find(&hash).len(), 2);
    }

    #[test]
    fn newer_vote_replaces_older() {
        let mut cache = create_cache();
        let key = PrivateKey::from(1);
        let hash = BlockHash::from(1);
        cache.insert(&create_vote(&key, hash, 16), Amount::raw(7), &HashMap::new());
        let newer = create_vote(&key, hash, 32);
        cache.insert(&newer, Amount::raw(7), &HashMap::new());

        assert_eq!(cache.find(&hash), vec![newer]);
        assert_eq!(cache.tally(&hash), Amount::raw(7));
    }

    #[test]
    fn older_vote_is_ignored() {
        let mut cache = create_cache();
        let key = PrivateKey::from(1);
        let hash = BlockHash::from(1);
        let newer = create_vote(&key, hash, 32);
        cache.insert(&newer, Amount::raw(7), &HashMap::new());
        cache.insert(&create_vote(&key, hash, 16), Amount::raw(7), &HashMap::new());

        assert_eq!(cache.find(&hash), vec![newer]);
    }

    #[test]
    fn only_cache_votes_without_election() {
        let mut cache = create_cache();
        let key = PrivateKey::from(1);
        let vote = Arc::new(Vote::new(
            &key,
            16,
            0,
            vec![BlockHash::from(1), BlockHash::from(2), BlockHash::from(3)],
        ));
        let results = HashMap::from([
            (BlockHash::from(1), VoteCode::Indeterminate),
            (BlockHash::from(2), VoteCode::Replay),
            (BlockHash::from(3), VoteCode::Vote),
        ]);

        cache.insert(&vote, Amount::raw(1), &results);

        assert_eq!(cache.len(), 2);
        assert!(cache.find(&BlockHash::from(2)).is_empty());
    }

    #[test]
    fn max_voters_keeps_heaviest() {
        let mut cache = VoteCache::new(
            VoteCacheConfig {
                max_voters: 2,
                ..Default::default()
            },
            Arc::new(Stats::default()),
        );
        let hash = BlockHash::from(1);
        for (key, weight) in [(1, 10), (2, 20), (3, 5), (4, 30)] {
            cache.insert(
                &create_vote(&PrivateKey::from(key), hash, 16),
                Amount::raw(weight),
                &HashMap::new(),
            );
        }

        assert_eq!(cache.tally(&hash), Amount::raw(50));
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let mut cache = VoteCache::new(
            VoteCacheConfig {
                max_size: 2,
                ..Default::default()
            },
            Arc::new(Stats::default()),
        );
        let key = PrivateKey::from(1);
        for i in 1..=3 {
            cache.insert(
                &create_vote(&key, BlockHash::from(i), 16),
                Amount::raw(1),
                &HashMap::new(),
            );
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.find(&BlockHash::from(1)).is_empty());
    }

    #[test]
    fn erase() {
        let mut cache = create_cache();
        let hash = BlockHash::from(1);
        cache.insert(
            &create_vote(&PrivateKey::from(1), hash, 16),
            Amount::raw(1),
            &HashMap::new(),
        );

        assert!(cache.erase(&hash));
        assert!(!cache.erase(&hash));
        assert!(cache.is_empty());
    }

    #[test]
    fn old_entries_are_cleaned_up() {
        let mut cache = VoteCache::new(
            VoteCacheConfig {
                age_cutoff: Duration::from_secs(10),
                ..Default::default()
            },
            Arc::new(Stats::default()),
        );
        let key = PrivateKey::from(1);
        cache.insert(&create_vote(&key, BlockHash::from(1), 16), Amount::raw(1), &HashMap::new());
        MockClock::advance(Duration::from_secs(10));

        cache.insert(&create_vote(&key, BlockHash::from(2), 16), Amount::raw(1), &HashMap::new());

        assert!(cache.find(&BlockHash::from(1)).is_empty());
        assert_eq!(cache.len(), 1);
    }
}
