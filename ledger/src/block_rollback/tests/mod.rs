
use super::rollback_planner::{RollbackInstructions, RollbackPlanner, RollbackStep};
use crate::ledger_constants::LEDGER_CONSTANTS_STUB;
use lattice_core::{
    Account, BlockHash, ConfirmationHeightInfo, PendingInfo, SavedAccountChain,
};

/// Runs the RollbackPlanner against a chain that was never written to a store
pub(crate) struct RollbackTest<'a> {
    chain: &'a SavedAccountChain,
    linked_account: Account,
    pending_receive: Option<PendingInfo>,
    latest_block_for_destination: Option<BlockHash>,
    confirmation_height: ConfirmationHeightInfo,
}

impl<'a> RollbackTest<'a> {
    pub(crate) fn for_chain(chain: &'a SavedAccountChain) -> Self {
        Self {
            chain,
            linked_account: Account::zero(),
            pending_receive: Some(PendingInfo::default()),
            latest_block_for_destination: None,
            confirmation_height: ConfirmationHeightInfo::default(),
        }
    }

    pub(crate) fn with_linked_account(mut self, account: impl Into<Account>) -> Self {
        self.linked_account = account.into();
        self
    }

    /// The send block was already received by the destination
    pub(crate) fn with_received_send(mut self, destination_head: BlockHash) -> Self {
        self.pending_receive = None;
        self.latest_block_for_destination = Some(destination_head);
        self
    }

    pub(crate) fn with_confirmation_height(mut self, height: u64) -> Self {
        self.confirmation_height =
            ConfirmationHeightInfo::new(height, self.chain.block(height).hash());
        self
    }

    fn planner(&self) -> RollbackPlanner<'static> {
        let head_block = self.chain.latest_block().clone();
        let previous = if self.chain.height() > 1 {
            Some(self.chain.block(self.chain.height() - 1).clone())
        } else {
            None
        };
        let previous_representative = if head_block.representative_field().is_some() {
            self.chain.blocks()[..self.chain.height() as usize - 1]
                .iter()
                .rev()
                .find_map(|b| b.representative_field())
        } else {
            None
        };
        RollbackPlanner {
            epochs: &LEDGER_CONSTANTS_STUB.epochs,
            head_block,
            account: self.chain.account(),
            current_account_info: self.chain.account_info(),
            previous_representative,
            previous,
            linked_account: self.linked_account,
            pending_receive: self.pending_receive.clone(),
            latest_block_for_destination: self.latest_block_for_destination,
            confirmation_height: self.confirmation_height.clone(),
        }
    }

    pub(crate) fn assert_rollback_succeeds(self) -> RollbackInstructions {
        match self.planner().roll_back_head_block() {
            Ok(RollbackStep::RollBackBlock(instructions)) => instructions,
            Ok(RollbackStep::RequestDependencyRollback(_)) => {
                panic!("expected RollBackBlock, got RequestDependencyRollback")
            }
            Err(e) => panic!("rollback failed: {e}"),
        }
    }

    pub(crate) fn assert_dependency_rollback(self) -> BlockHash {
        match self.planner().roll_back_head_block() {
            Ok(RollbackStep::RequestDependencyRollback(hash)) => hash,
            Ok(RollbackStep::RollBackBlock(_)) => {
                panic!("expected RequestDependencyRollback, got RollBackBlock")
            }
            Err(e) => panic!("rollback failed: {e}"),
        }
    }

    pub(crate) fn assert_rollback_fails(self) -> anyhow::Error {
        match self.planner().roll_back_head_block() {
            Ok(_) => panic!("rollback should fail"),
            Err(e) => e,
        }
    }
}
