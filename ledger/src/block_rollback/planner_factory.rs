use super::rollback_planner::RollbackPlanner;
use crate::Ledger;
use lattice_core::{
    Account, AccountInfo, BlockHash, ConfirmationHeightInfo, PendingInfo, PendingKey,
    PublicKey, SavedBlock,
};
use lattice_store::Transaction;

/// Loads everything the RollbackPlanner needs from the ledger
pub(crate) struct RollbackPlannerFactory<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
    head_block: &'a SavedBlock,
}

impl<'a> RollbackPlannerFactory<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a dyn Transaction,
        head_block: &'a SavedBlock,
    ) -> Self {
        Self {
            ledger,
            txn,
            head_block,
        }
    }

    pub(crate) fn create_planner(&self) -> anyhow::Result<RollbackPlanner<'a>> {
        let account = self.head_block.account();
        let current_account_info = self.load_account(&account)?;
        let previous = self.load_previous_block()?;
        let planner = RollbackPlanner {
            epochs: &self.ledger.constants.epochs,
            head_block: self.head_block.clone(),
            account,
            current_account_info,
            previous_representative: self.get_previous_representative(previous.as_ref()),
            linked_account: self.load_linked_account(),
            pending_receive: self.load_pending_receive(),
            latest_block_for_destination: self.latest_block_for_destination(),
            confirmation_height: self.account_confirmation_height(&account),
            previous,
        };
        Ok(planner)
    }

    fn latest_block_for_destination(&self) -> Option<BlockHash> {
        self.ledger
            .any()
            .account_head(self.txn, &self.head_block.destination_or_link())
    }

    fn load_pending_receive(&self) -> Option<PendingInfo> {
        self.ledger.store.pending.get(
            self.txn,
            &PendingKey::new(
                self.head_block.destination_or_link(),
                self.head_block.hash(),
            ),
        )
    }

    fn load_linked_account(&self) -> Account {
        self.ledger
            .any()
            .block_account(self.txn, &self.head_block.source_or_link())
            .unwrap_or_default()
    }

    /// Walks back from the previous block to the last block that set a representative
    fn get_previous_representative(&self, previous: Option<&SavedBlock>) -> Option<PublicKey> {
        self.head_block.representative_field()?;
        let mut current = previous.cloned();
        while let Some(block) = current {
            if let Some(rep) = block.representative_field() {
                return Some(rep);
            }
            current = self.ledger.any().get_block(self.txn, &block.previous());
        }
        None
    }

    fn account_confirmation_height(&self, account: &Account) -> ConfirmationHeightInfo {
        self.ledger
            .store
            .confirmation_height
            .get(self.txn, account)
            .unwrap_or_default()
    }

    fn load_account(&self, account: &Account) -> anyhow::Result<AccountInfo> {
        self.ledger
            .account_info(self.txn, account)
            .ok_or_else(|| anyhow!("account not found"))
    }

    fn load_previous_block(&self) -> anyhow::Result<Option<SavedBlock>> {
        let previous = self.head_block.previous();
        Ok(if previous.is_zero() {
            None
        } else {
            Some(
                self.ledger
                    .any()
                    .get_block(self.txn, &previous)
                    .ok_or_else(|| anyhow!("previous block not found"))?,
            )
        })
    }
}
