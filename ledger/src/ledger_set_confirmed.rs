use lattice_core::{Account, Amount, BlockHash, SavedBlock};
use lattice_store::{Store, Transaction};

/// View on the blocks at or below the confirmation height of their account
pub struct LedgerSetConfirmed<'a> {
    store: &'a Store,
}

impl<'a> LedgerSetConfirmed<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn get_block(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        let block = self.store.block.get(tx, hash)?;
        let info = self.store.confirmation_height.get(tx, &block.account())?;
        if block.height() <= info.height {
            Some(block)
        } else {
            None
        }
    }

    pub fn account_head(&self, tx: &dyn Transaction, account: &Account) -> Option<BlockHash> {
        self.store
            .confirmation_height
            .get(tx, account)
            .map(|i| i.frontier)
    }

    pub fn account_height(&self, tx: &dyn Transaction, account: &Account) -> u64 {
        self.store
            .confirmation_height
            .get(tx, account)
            .map(|i| i.height)
            .unwrap_or_default()
    }

    pub fn block_balance(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<Amount> {
        if hash.is_zero() {
            return None;
        }

        self.get_block(tx, hash).map(|b| b.balance())
    }

    pub fn block_exists(&self, tx: &dyn Transaction, hash: &BlockHash) -> bool {
        self.get_block(tx, hash).is_some()
    }

    pub fn block_exists_or_pruned(&self, tx: &dyn Transaction, hash: &BlockHash) -> bool {
        if self.store.pruned.exists(tx, hash) {
            true
        } else {
            self.block_exists(tx, hash)
        }
    }
}
