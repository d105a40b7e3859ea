use lattice_core::{
    Account, AccountInfo, Amount, BlockHash, PendingInfo, PendingKey, QualifiedRoot, SavedBlock,
};
use lattice_store::{Store, Transaction};

/// View on all blocks in the ledger, confirmed or not
pub struct LedgerSetAny<'a> {
    store: &'a Store,
}

impl<'a> LedgerSetAny<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn get_block(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        self.store.block.get(tx, hash)
    }

    pub fn get_account(&self, tx: &dyn Transaction, account: &Account) -> Option<AccountInfo> {
        self.store.account.get(tx, account)
    }

    pub fn account_head(&self, tx: &dyn Transaction, account: &Account) -> Option<BlockHash> {
        self.get_account(tx, account).map(|i| i.head)
    }

    pub fn account_balance(&self, tx: &dyn Transaction, account: &Account) -> Option<Amount> {
        let head = self.account_head(tx, account)?;
        self.get_block(tx, &head).map(|b| b.balance())
    }

    pub fn account_height(&self, tx: &dyn Transaction, account: &Account) -> u64 {
        self.get_account(tx, account)
            .map(|i| i.block_count)
            .unwrap_or_default()
    }

    pub fn block_account(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        self.get_block(tx, hash).map(|b| b.account())
    }

    /// The amount that was sent or received by the given block
    pub fn block_amount(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<Amount> {
        let block = self.get_block(tx, hash)?;
        let block_balance = block.balance();
        if block.previous().is_zero() {
            Some(block_balance)
        } else {
            let previous_balance = self.block_balance(tx, &block.previous())?;
            if block_balance > previous_balance {
                Some(block_balance - previous_balance)
            } else {
                Some(previous_balance - block_balance)
            }
        }
    }

    pub fn block_balance(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<Amount> {
        if hash.is_zero() {
            return None;
        }

        self.get_block(tx, hash).map(|b| b.balance())
    }

    pub fn block_exists(&self, tx: &dyn Transaction, hash: &BlockHash) -> bool {
        self.store.block.exists(tx, hash)
    }

    pub fn block_exists_or_pruned(&self, tx: &dyn Transaction, hash: &BlockHash) -> bool {
        if self.store.pruned.exists(tx, hash) {
            true
        } else {
            self.store.block.exists(tx, hash)
        }
    }

    pub fn block_height(&self, tx: &dyn Transaction, hash: &BlockHash) -> u64 {
        self.get_block(tx, hash)
            .map(|b| b.height())
            .unwrap_or_default()
    }

    pub fn block_successor(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<BlockHash> {
        self.block_successor_by_qualified_root(tx, &QualifiedRoot::new(hash.into(), *hash))
    }

    /// The block that currently occupies the slot of the given root
    pub fn block_successor_by_qualified_root(
        &self,
        tx: &dyn Transaction,
        root: &QualifiedRoot,
    ) -> Option<BlockHash> {
        if !root.previous.is_zero() {
            self.store.block.successor(tx, &root.previous)
        } else {
            self.get_account(tx, &root.root.into())
                .map(|i| i.open_block)
        }
    }

    pub fn get_pending(&self, tx: &dyn Transaction, key: &PendingKey) -> Option<PendingInfo> {
        self.store.pending.get(tx, key)
    }

    pub fn receivable_exists(&self, tx: &dyn Transaction, account: Account) -> bool {
        self.store.pending.any(tx, &account)
    }

    /// Receivables of `account` with a send hash greater than `hash`
    pub fn account_receivable_upper_bound<'txn>(
        &self,
        tx: &'txn dyn Transaction,
        account: Account,
        hash: BlockHash,
    ) -> impl Iterator<Item = (PendingKey, PendingInfo)> + 'txn {
        self.store
            .pending
            .iter_after(tx, &PendingKey::new(account, hash))
            .take_while(move |(key, _)| key.receiving_account == account)
            .map(|(key, info)| (key.clone(), info.clone()))
    }

    /// Receivables of the first account after `account` that has any
    pub fn receivable_upper_bound<'txn>(
        &self,
        tx: &'txn dyn Transaction,
        account: Account,
    ) -> impl Iterator<Item = (PendingKey, PendingInfo)> + 'txn {
        let last_key_of_account = PendingKey::new(account, BlockHash::from_bytes([0xFF; 32]));
        let mut next_account = None;
        self.store
            .pending
            .iter_after(tx, &last_key_of_account)
            .take_while(move |(key, _)| {
                *next_account.get_or_insert(key.receiving_account) == key.receiving_account
            })
            .map(|(key, info)| (key.clone(), info.clone()))
    }
}
