use super::{
    instructions_executor::RollbackInstructionsExecutor,
    planner_factory::RollbackPlannerFactory,
    rollback_planner::{RollbackInstructions, RollbackStep},
};
use crate::Ledger;
use lattice_core::{BlockHash, SavedBlock};
use lattice_store::WriteTransaction;
use tracing::debug;

/// Rolls back a block and all of its successors.
/// Receives of rolled back sends are rolled back first.
pub(crate) struct BlockRollbackPerformer<'a> {
    ledger: &'a Ledger,
    txn: &'a mut WriteTransaction,
    pub rolled_back: Vec<SavedBlock>,
}

impl<'a> BlockRollbackPerformer<'a> {
    pub(crate) fn new(ledger: &'a Ledger, txn: &'a mut WriteTransaction) -> Self {
        Self {
            ledger,
            txn,
            rolled_back: Vec::new(),
        }
    }

    pub(crate) fn roll_back(mut self, block_hash: &BlockHash) -> anyhow::Result<Vec<SavedBlock>> {
        self.roll_back_block_and_successors(block_hash)?;
        Ok(self.rolled_back)
    }

    fn roll_back_block_and_successors(&mut self, block_hash: &BlockHash) -> anyhow::Result<()> {
        let block = self.load_block(block_hash)?;
        while self.block_exists(block_hash) {
            let head_block = self.load_account_head(&block)?;
            match self.plan(&head_block)? {
                RollbackStep::RollBackBlock(instructions) => {
                    self.execute(&instructions);
                    debug!(hash = %head_block.hash(), "block rolled back");
                    self.rolled_back.push(head_block);
                }
                RollbackStep::RequestDependencyRollback(dependency_hash) => {
                    self.roll_back_block_and_successors(&dependency_hash)?;
                }
            }
        }
        Ok(())
    }

    fn plan(&self, head_block: &SavedBlock) -> anyhow::Result<RollbackStep> {
        let planner = RollbackPlannerFactory::new(self.ledger, self.txn, head_block).create_planner()?;
        planner.roll_back_head_block()
    }

    fn execute(&mut self, instructions: &RollbackInstructions) {
        RollbackInstructionsExecutor::new(self.ledger, self.txn, instructions).execute();
    }

    fn block_exists(&self, block_hash: &BlockHash) -> bool {
        self.ledger.store.block.exists(self.txn, block_hash)
    }

    fn load_account_head(&self, block: &SavedBlock) -> anyhow::Result<SavedBlock> {
        let info = self
            .ledger
            .account_info(self.txn, &block.account())
            .ok_or_else(|| anyhow!("account not found"))?;
        self.load_block(&info.head)
    }

    fn load_block(&self, block_hash: &BlockHash) -> anyhow::Result<SavedBlock> {
        self.ledger
            .any()
            .get_block(self.txn, block_hash)
            .ok_or_else(|| anyhow!("block not found"))
    }
}
