use crate::Ledger;
use lattice_core::{
    Account, AccountInfo, Block, BlockSideband, PendingInfo, PendingKey, SavedBlock,
};
use lattice_store::WriteTransaction;
use std::sync::atomic::Ordering;

#[derive(Debug, PartialEq)]
pub(crate) struct BlockInsertInstructions {
    pub account: Account,
    pub old_account_info: AccountInfo,
    pub set_account_info: AccountInfo,
    pub delete_pending: Option<PendingKey>,
    pub insert_pending: Option<(PendingKey, PendingInfo)>,
    pub set_sideband: BlockSideband,
    pub is_epoch_block: bool,
}

/// Inserts a new block into the ledger
pub(crate) struct BlockInserter<'a> {
    ledger: &'a Ledger,
    txn: &'a mut WriteTransaction,
    block: &'a Block,
    instructions: &'a BlockInsertInstructions,
}

impl<'a> BlockInserter<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a mut WriteTransaction,
        block: &'a Block,
        instructions: &'a BlockInsertInstructions,
    ) -> Self {
        Self {
            ledger,
            txn,
            block,
            instructions,
        }
    }

    pub(crate) fn insert(&mut self) -> SavedBlock {
        let saved_block = SavedBlock::new(self.block.clone(), self.instructions.set_sideband.clone());
        self.ledger.store.block.put(self.txn, &saved_block);
        self.update_account();
        self.delete_old_pending_info();
        self.insert_new_pending_info();
        self.update_frontier();
        self.update_representative_cache();
        self.ledger
            .store
            .cache
            .block_count
            .fetch_add(1, Ordering::SeqCst);
        self.ledger.observer.block_added(saved_block.subtype());
        saved_block
    }

    fn update_account(&mut self) {
        self.ledger.update_account(
            self.txn,
            &self.instructions.account,
            &self.instructions.old_account_info,
            &self.instructions.set_account_info,
        );
    }

    fn delete_old_pending_info(&mut self) {
        if let Some(key) = &self.instructions.delete_pending {
            self.ledger.store.pending.del(self.txn, key);
        }
    }

    fn insert_new_pending_info(&mut self) {
        if let Some((key, info)) = &self.instructions.insert_pending {
            self.ledger.store.pending.put(self.txn, key, info);
        }
    }

    /// Only legacy blocks are indexed in the frontier table
    fn update_frontier(&mut self) {
        let old_head = self.instructions.old_account_info.head;
        if !old_head.is_zero() {
            self.ledger.store.frontier.del(self.txn, &old_head);
        }
        if self.block.is_legacy() {
            self.ledger
                .store
                .frontier
                .put(self.txn, &self.block.hash(), &self.instructions.account);
        }
    }

    fn update_representative_cache(&mut self) {
        let old = &self.instructions.old_account_info;
        let new = &self.instructions.set_account_info;
        self.ledger
            .rep_weights
            .apply_delta(old.representative, old.balance, new.representative, new.balance);
    }
}
