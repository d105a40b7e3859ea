use super::rollback_planner::RollbackInstructions;
use crate::Ledger;
use lattice_store::WriteTransaction;
use std::sync::atomic::Ordering;

/// Updates the ledger according to the RollbackInstructions
pub(crate) struct RollbackInstructionsExecutor<'a> {
    ledger: &'a Ledger,
    txn: &'a mut WriteTransaction,
    instructions: &'a RollbackInstructions,
}

impl<'a> RollbackInstructionsExecutor<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a mut WriteTransaction,
        instructions: &'a RollbackInstructions,
    ) -> Self {
        Self {
            ledger,
            txn,
            instructions,
        }
    }

    pub(crate) fn execute(&mut self) {
        self.update_pending_table();
        self.update_account_table();
        self.update_block_table();
        self.update_frontier_table();
        self.roll_back_representative_cache();
        self.ledger
            .store
            .cache
            .block_count
            .fetch_sub(1, Ordering::SeqCst);

        self.ledger
            .observer
            .block_rolled_back(self.instructions.block_sub_type);
    }

    fn update_block_table(&mut self) {
        self.ledger
            .store
            .block
            .del(self.txn, &self.instructions.block_hash);

        if let Some(hash) = self.instructions.clear_successor {
            self.ledger.store.block.successor_clear(self.txn, &hash);
        }
    }

    fn update_frontier_table(&mut self) {
        self.ledger
            .store
            .frontier
            .del(self.txn, &self.instructions.block_hash);

        if let Some(previous) = &self.instructions.restore_frontier {
            self.ledger
                .store
                .frontier
                .put(self.txn, previous, &self.instructions.account);
        }
    }

    fn update_account_table(&mut self) {
        self.ledger.update_account(
            self.txn,
            &self.instructions.account,
            &self.instructions.old_account_info,
            &self.instructions.set_account_info,
        );
    }

    fn update_pending_table(&mut self) {
        if let Some(pending_key) = &self.instructions.remove_pending {
            self.ledger.store.pending.del(self.txn, pending_key);
        }
        if let Some((key, info)) = &self.instructions.add_pending {
            self.ledger.store.pending.put(self.txn, key, info);
        }
    }

    fn roll_back_representative_cache(&mut self) {
        let current = &self.instructions.old_account_info;
        let previous = &self.instructions.set_account_info;
        self.ledger.rep_weights.apply_delta(
            current.representative,
            current.balance,
            previous.representative,
            previous.balance,
        );
    }
}
