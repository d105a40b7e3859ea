use lattice_core::{BlockHash, Root, Vote};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

/// Votes this node has generated recently, so that requests can be answered
/// from the cache instead of signing again
pub struct LocalVoteHistory {
    data: Mutex<HistoryData>,
    max_size: usize,
}

#[derive(Default)]
struct HistoryData {
    /// Ordered by insertion, the first entry is evicted first
    sequenced: BTreeMap<u64, CachedVote>,
    by_root: HashMap<Root, Vec<u64>>,
    next_id: u64,
}

struct CachedVote {
    root: Root,
    hash: BlockHash,
    vote: Arc<Vote>,
}

impl LocalVoteHistory {
    pub fn new(max_size: usize) -> Self {
        debug_assert!(max_size > 0);
        Self {
            data: Mutex::new(HistoryData::default()),
            max_size,
        }
    }

    pub fn add(&self, root: &Root, hash: &BlockHash, vote: &Arc<Vote>) {
        let mut data = self.data.lock().unwrap();

        let existing = data.by_root.get(root).cloned().unwrap_or_default();
        let mut add_vote = true;
        let mut outdated = Vec::new();
        for id in existing {
            let cached = &data.sequenced[&id];
            let same_account = cached.vote.voting_account == vote.voting_account;
            if cached.hash != *hash
                || (same_account && cached.vote.timestamp() <= vote.timestamp())
            {
                outdated.push(id);
            } else if same_account {
                // a newer vote of this representative for the same hash is already known
                add_vote = false;
            }
        }
        for id in outdated {
            data.remove(id);
        }
        if !add_vote {
            return;
        }

        let id = data.next_id;
        data.next_id += 1;
        data.sequenced.insert(
            id,
            CachedVote {
                root: *root,
                hash: *hash,
                vote: Arc::clone(vote),
            },
        );
        data.by_root.entry(*root).or_default().push(id);

        while data.sequenced.len() > self.max_size {
            if let Some((&oldest, _)) = data.sequenced.first_key_value() {
                data.remove(oldest);
            }
        }
    }

    pub fn erase(&self, root: &Root) {
        let mut data = self.data.lock().unwrap();
        if let Some(ids) = data.by_root.remove(root) {
            for id in ids {
                data.sequenced.remove(&id);
            }
        }
    }

    /// Cached votes for the root that cover `hash`. With `is_final` only final votes are returned
    pub fn votes(&self, root: &Root, hash: &BlockHash, is_final: bool) -> Vec<Arc<Vote>> {
        let data = self.data.lock().unwrap();
        let Some(ids) = data.by_root.get(root) else {
            return Vec::new();
        };
        ids.iter()
            .map(|id| &data.sequenced[id])
            .filter(|cached| cached.hash == *hash && (!is_final || cached.vote.is_final()))
            .map(|cached| Arc::clone(&cached.vote))
            .collect()
    }

    pub fn exists(&self, root: &Root) -> bool {
        self.data.lock().unwrap().by_root.contains_key(root)
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().sequenced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryData {
    fn remove(&mut self, id: u64) {
        let Some(cached) = self.sequenced.remove(&id) else {
            return;
        };
        if let Some(ids) = self.by_root.get_mut(&cached.root) {
            ids.retain(|i| *i != id);
            if ids.is_empty() {
                self.by_root.remove(&cached.root);
            }
        }
    }
}
