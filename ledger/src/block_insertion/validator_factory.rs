use super::validation::BlockValidator;
use crate::{Ledger, SignatureVerification};
use lattice_core::{utils::seconds_since_epoch, Block, PendingKey};
use lattice_store::Transaction;

/// Loads everything from the store that is needed to validate a block
pub(crate) struct BlockValidatorFactory<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
    block: &'a Block,
}

impl<'a> BlockValidatorFactory<'a> {
    pub(crate) fn new(ledger: &'a Ledger, txn: &'a dyn Transaction, block: &'a Block) -> Self {
        Self { ledger, txn, block }
    }

    pub(crate) fn create_validator(&self) -> BlockValidator<'a> {
        let previous_block = if self.block.previous().is_zero() {
            None
        } else {
            self.ledger.any().get_block(self.txn, &self.block.previous())
        };

        let account = self
            .block
            .account_field()
            .or_else(|| previous_block.as_ref().map(|b| b.account()))
            .unwrap_or_default();

        let old_account_info = self.ledger.account_info(self.txn, &account);

        let source = self.block.source_or_link();
        let pending_receive_info = if source.is_zero() {
            None
        } else {
            self.ledger
                .store
                .pending
                .get(self.txn, &PendingKey::new(account, source))
        };

        BlockValidator {
            block: self.block,
            epochs: &self.ledger.constants.epochs,
            work: &self.ledger.constants.work,
            burn_account: self.ledger.constants.burn_account,
            block_exists: self.ledger.any().block_exists_or_pruned(self.txn, &self.block.hash()),
            account,
            previous_block,
            old_account_info,
            pending_receive_info,
            any_pending_exists: self.ledger.store.pending.any(self.txn, &account),
            source_block_exists: !source.is_zero()
                && self.ledger.any().block_exists_or_pruned(self.txn, &source),
            seconds_since_epoch: seconds_since_epoch(),
            verification: SignatureVerification::Unknown,
        }
    }
}
