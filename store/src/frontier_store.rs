use crate::{Transaction, WriteTransaction};
use lattice_core::{Account, BlockHash};

/// Maps the head block of legacy chains to its account
pub struct FrontierStore;

impl FrontierStore {
    pub fn put(&self, txn: &mut WriteTransaction, hash: &BlockHash, account: &Account) {
        txn.tables_mut().frontiers_mut().insert(*hash, *account);
    }

    pub fn get(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        txn.tables().frontiers.get(hash).copied()
    }

    pub fn del(&self, txn: &mut WriteTransaction, hash: &BlockHash) {
        txn.tables_mut().frontiers_mut().remove(hash);
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().frontiers.len() as u64
    }
}
