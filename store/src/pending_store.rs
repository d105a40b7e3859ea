use crate::{Transaction, WriteTransaction};
use lattice_core::{Account, BlockHash, PendingInfo, PendingKey};
use std::ops::Bound;

/// Receivable amounts, keyed by receiving account and send block hash
pub struct PendingStore;

impl PendingStore {
    pub fn put(&self, txn: &mut WriteTransaction, key: &PendingKey, pending: &PendingInfo) {
        txn.tables_mut().pending_mut().insert(key.clone(), pending.clone());
    }

    pub fn del(&self, txn: &mut WriteTransaction, key: &PendingKey) {
        txn.tables_mut().pending_mut().remove(key);
    }

    pub fn get(&self, txn: &dyn Transaction, key: &PendingKey) -> Option<PendingInfo> {
        txn.tables().pending.get(key).cloned()
    }

    pub fn exists(&self, txn: &dyn Transaction, key: &PendingKey) -> bool {
        txn.tables().pending.contains_key(key)
    }

    /// Returns true if the account has at least one receivable entry
    pub fn any(&self, txn: &dyn Transaction, account: &Account) -> bool {
        self.iter_account(txn, account).next().is_some()
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().pending.len() as u64
    }

    pub fn iter<'txn>(
        &self,
        txn: &'txn dyn Transaction,
    ) -> impl Iterator<Item = (&'txn PendingKey, &'txn PendingInfo)> + 'txn {
        txn.tables().pending.iter()
    }

    /// Entries strictly after the given key
    pub fn iter_after<'txn>(
        &self,
        txn: &'txn dyn Transaction,
        key: &PendingKey,
    ) -> impl Iterator<Item = (&'txn PendingKey, &'txn PendingInfo)> + 'txn {
        txn.tables()
            .pending
            .range((Bound::Excluded(key.clone()), Bound::Unbounded))
    }

    /// All receivables of a single account, ordered by send block hash
    pub fn iter_account<'txn>(
        &self,
        txn: &'txn dyn Transaction,
        account: &Account,
    ) -> impl Iterator<Item = (&'txn PendingKey, &'txn PendingInfo)> + 'txn {
        let account = *account;
        let start = PendingKey::new(account, BlockHash::zero());
        txn.tables()
            .pending
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(move |(key, _)| key.receiving_account == account)
    }
}
