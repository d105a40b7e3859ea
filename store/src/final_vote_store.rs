use crate::{Transaction, WriteTransaction};
use lattice_core::{BlockHash, QualifiedRoot};

/// Remembers which block this node cast a final vote for, per qualified root
pub struct FinalVoteStore;

impl FinalVoteStore {
    /// Stores the hash if the root has no final vote yet.
    /// Returns true if the stored hash equals the given one.
    pub fn put(&self, txn: &mut WriteTransaction, root: &QualifiedRoot, hash: &BlockHash) -> bool {
        match txn.tables().final_votes.get(root) {
            Some(existing) => existing == hash,
            None => {
                txn.tables_mut().final_votes_mut().insert(*root, *hash);
                true
            }
        }
    }

    pub fn get(&self, txn: &dyn Transaction, root: &QualifiedRoot) -> Option<BlockHash> {
        txn.tables().final_votes.get(root).copied()
    }

    pub fn del(&self, txn: &mut WriteTransaction, root: &QualifiedRoot) {
        txn.tables_mut().final_votes_mut().remove(root);
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().final_votes.len() as u64
    }

    pub fn clear(&self, txn: &mut WriteTransaction) {
        txn.tables_mut().final_votes_mut().clear();
    }
}
