use lattice_core::{BlockHash, QualifiedRoot};
use std::collections::{HashMap, VecDeque};

/// Elections that finished recently. Votes for them are replays.
pub struct RecentlyConfirmedCache {
    sequential: VecDeque<BlockHash>,
    by_root: HashMap<QualifiedRoot, BlockHash>,
    by_hash: HashMap<BlockHash, QualifiedRoot>,
    max_len: usize,
}

impl RecentlyConfirmedCache {
    pub fn new(max_len: usize) -> Self {
        Self {
            sequential: VecDeque::new(),
            by_root: HashMap::new(),
            by_hash: HashMap::new(),
            max_len,
        }
    }

    /// Returns false if the root or the hash is already known
    pub fn put(&mut self, root: QualifiedRoot, hash: BlockHash) -> bool {
        if self.by_root.contains_key(&root) || self.by_hash.contains_key(&hash) {
            return false;
        }
        self.sequential.push_back(hash);
        self.by_root.insert(root, hash);
        self.by_hash.insert(hash, root);
        if self.sequential.len() > self.max_len {
            if let Some(oldest) = self.sequential.pop_front() {
                if let Some(old_root) = self.by_hash.remove(&oldest) {
                    self.by_root.remove(&old_root);
                }
            }
        }
        true
    }

    pub fn erase(&mut self, hash: &BlockHash) {
        if let Some(root) = self.by_hash.remove(hash) {
            self.by_root.remove(&root);
            self.sequential.retain(|h| h != hash);
        }
    }

    pub fn root_exists(&self, root: &QualifiedRoot) -> bool {
        self.by_root.contains_key(root)
    }

    pub fn hash_exists(&self, hash: &BlockHash) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn clear(&mut self) {
        self.sequential.clear();
        self.by_root.clear();
        self.by_hash.clear();
    }

    pub fn back(&self) -> Option<(QualifiedRoot, BlockHash)> {
        self.sequential
            .back()
            .and_then(|hash| self.by_hash.get(hash).map(|root| (*root, *hash)))
    }

    pub fn len(&self) -> usize {
        self.sequential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequential.is_empty()
    }
}
