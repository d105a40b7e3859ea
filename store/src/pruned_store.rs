use crate::{Transaction, WriteTransaction};
use lattice_core::BlockHash;
use rand::{thread_rng, Rng};
use std::ops::Bound;

/// Hashes of blocks that were removed from the block table after confirmation
pub struct PrunedStore;

impl PrunedStore {
    pub fn put(&self, txn: &mut WriteTransaction, hash: &BlockHash) {
        txn.tables_mut().pruned_mut().insert(*hash);
    }

    pub fn del(&self, txn: &mut WriteTransaction, hash: &BlockHash) {
        txn.tables_mut().pruned_mut().remove(hash);
    }

    pub fn exists(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        txn.tables().pruned.contains(hash)
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().pruned.len() as u64
    }

    pub fn clear(&self, txn: &mut WriteTransaction) {
        txn.tables_mut().pruned_mut().clear();
    }

    pub fn iter<'txn>(
        &self,
        txn: &'txn dyn Transaction,
    ) -> impl Iterator<Item = &'txn BlockHash> + 'txn {
        txn.tables().pruned.iter()
    }

    /// First pruned hash at or after a random position, wrapping around
    pub fn random(&self, txn: &dyn Transaction) -> Option<BlockHash> {
        let start = BlockHash::from_bytes(thread_rng().gen());
        let pruned = &txn.tables().pruned;
        pruned
            .range((Bound::Included(start), Bound::Unbounded))
            .next()
            .or_else(|| pruned.iter().next())
            .copied()
    }
}
