use crate::{Transaction, WriteTransaction};
use lattice_core::{Account, AccountInfo};
use std::ops::Bound;

pub struct AccountStore;

impl AccountStore {
    pub fn put(&self, txn: &mut WriteTransaction, account: &Account, info: &AccountInfo) {
        txn.tables_mut().accounts_mut().insert(*account, info.clone());
    }

    pub fn get(&self, txn: &dyn Transaction, account: &Account) -> Option<AccountInfo> {
        txn.tables().accounts.get(account).cloned()
    }

    pub fn del(&self, txn: &mut WriteTransaction, account: &Account) {
        txn.tables_mut().accounts_mut().remove(account);
    }

    pub fn exists(&self, txn: &dyn Transaction, account: &Account) -> bool {
        txn.tables().accounts.contains_key(account)
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().accounts.len() as u64
    }

    pub fn iter<'txn>(
        &self,
        txn: &'txn dyn Transaction,
    ) -> impl Iterator<Item = (&'txn Account, &'txn AccountInfo)> + 'txn {
        txn.tables().accounts.iter()
    }

    /// Iterates accounts starting at the given one (inclusive)
    pub fn iter_from<'txn>(
        &self,
        txn: &'txn dyn Transaction,
        start: &Account,
    ) -> impl Iterator<Item = (&'txn Account, &'txn AccountInfo)> + 'txn {
        txn.tables()
            .accounts
            .range((Bound::Included(*start), Bound::Unbounded))
    }
}
