#[cfg(test)]
use mock_instant::thread_local::Instant;
use lattice_core::{BlockHash, Root};
#[cfg(not(test))]
use std::time::Instant;
use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

/// Prevents a representative from switching its vote for a root too quickly.
/// Voting again for the same hash is always allowed.
pub struct VoteSpacing {
    delay: Duration,
    by_root: HashMap<Root, SpacingEntry>,
    by_time: BTreeSet<(Instant, Root)>,
}

struct SpacingEntry {
    hash: BlockHash,
    time: Instant,
}

impl VoteSpacing {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            by_root: HashMap::new(),
            by_time: BTreeSet::new(),
        }
    }

    pub fn votable(&self, root: &Root, hash: &BlockHash) -> bool {
        match self.by_root.get(root) {
            Some(entry) => entry.hash == *hash || entry.time.elapsed() >= self.delay,
            None => true,
        }
    }

    pub fn flag(&mut self, root: &Root, hash: &BlockHash) {
        self.trim();
        let time = Instant::now();
        let old = self.by_root.insert(*root, SpacingEntry { hash: *hash, time });
        if let Some(old) = old {
            self.by_time.remove(&(old.time, *root));
        }
        self.by_time.insert((time, *root));
    }

    pub fn len(&self) -> usize {
        self.by_root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_root.is_empty()
    }

    fn trim(&mut self) {
        while let Some(&(time, root)) = self.by_time.first() {
            if time.elapsed() < self.delay {
                break;
            }
            self.by_time.pop_first();
            self.by_root.remove(&root);
        }
    }
}
