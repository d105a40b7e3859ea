use crate::Ledger;
use lattice_core::{Block, BlockBase, BlockHash, DependentBlocks, SavedBlock, StateBlock};
use lattice_store::Transaction;

/// Finds the blocks a block depends on: its previous block and,
/// for receives, the send block it receives.
pub struct DependentBlocksFinder<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
}

impl<'a> DependentBlocksFinder<'a> {
    pub fn new(ledger: &'a Ledger, txn: &'a dyn Transaction) -> Self {
        Self { ledger, txn }
    }

    /// Uses the sideband if the block is already in the ledger
    pub fn find_dependent_blocks(&self, block: &Block) -> DependentBlocks {
        match self.ledger.any().get_block(self.txn, &block.hash()) {
            Some(saved) => self.saved_block_dependencies(&saved),
            None => self.unsaved_block_dependencies(block),
        }
    }

    fn saved_block_dependencies(&self, block: &SavedBlock) -> DependentBlocks {
        block.dependent_blocks(
            &self.ledger.constants.epochs,
            &self.ledger.constants.genesis_account,
        )
    }

    fn unsaved_block_dependencies(&self, block: &Block) -> DependentBlocks {
        match block {
            Block::LegacySend(b) => b.dependent_blocks(),
            Block::LegacyChange(b) => b.dependent_blocks(),
            Block::LegacyReceive(b) => b.dependent_blocks(),
            Block::LegacyOpen(b) => b.dependent_blocks(&self.ledger.constants.genesis_account),
            Block::State(state) => {
                let linked_block = if self.is_receive(state) {
                    state.link().into()
                } else {
                    BlockHash::zero()
                };
                DependentBlocks::new(block.previous(), linked_block)
            }
        }
    }

    fn is_receive(&self, state: &StateBlock) -> bool {
        !state.link().is_zero() && !self.ledger.is_epoch_link(&state.link()) && !self.is_send(state)
    }

    // Without a sideband the previous balance decides
    fn is_send(&self, block: &StateBlock) -> bool {
        if block.previous().is_zero() {
            return false;
        }

        let previous_balance = self
            .ledger
            .any()
            .block_balance(self.txn, &block.previous())
            .unwrap_or_default();

        block.balance() < previous_balance
    }
}
