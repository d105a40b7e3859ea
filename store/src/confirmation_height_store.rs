use crate::{Transaction, WriteTransaction};
use lattice_core::{Account, ConfirmationHeightInfo};

pub struct ConfirmationHeightStore;

impl ConfirmationHeightStore {
    pub fn put(&self, txn: &mut WriteTransaction, account: &Account, info: &ConfirmationHeightInfo) {
        txn.tables_mut()
            .confirmation_height_mut()
            .insert(*account, info.clone());
    }

    pub fn get(&self, txn: &dyn Transaction, account: &Account) -> Option<ConfirmationHeightInfo> {
        txn.tables().confirmation_height.get(account).cloned()
    }

    pub fn exists(&self, txn: &dyn Transaction, account: &Account) -> bool {
        txn.tables().confirmation_height.contains_key(account)
    }

    pub fn del(&self, txn: &mut WriteTransaction, account: &Account) {
        txn.tables_mut().confirmation_height_mut().remove(account);
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().confirmation_height.len() as u64
    }

    pub fn clear(&self, txn: &mut WriteTransaction) {
        txn.tables_mut().confirmation_height_mut().clear();
    }

    pub fn iter<'txn>(
        &self,
        txn: &'txn dyn Transaction,
    ) -> impl Iterator<Item = (&'txn Account, &'txn ConfirmationHeightInfo)> + 'txn {
        txn.tables().confirmation_height.iter()
    }
}
