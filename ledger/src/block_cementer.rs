use crate::{LedgerConstants, LedgerObserver, LedgerSetAny, LedgerSetConfirmed};
use lattice_core::{BlockHash, ConfirmationHeightInfo, SavedBlock};
use lattice_store::{Store, WriteTransaction};
use std::{collections::VecDeque, sync::atomic::Ordering};
use tracing::{error, trace};

/// Cements blocks in the ledger, dependencies first
pub(crate) struct BlockCementer<'a> {
    constants: &'a LedgerConstants,
    store: &'a Store,
    observer: &'a dyn LedgerObserver,
    any: LedgerSetAny<'a>,
    confirmed: LedgerSetConfirmed<'a>,
}

impl<'a> BlockCementer<'a> {
    pub(crate) fn new(
        store: &'a Store,
        observer: &'a dyn LedgerObserver,
        constants: &'a LedgerConstants,
    ) -> Self {
        Self {
            store,
            observer,
            constants,
            any: LedgerSetAny::new(store),
            confirmed: LedgerSetConfirmed::new(store),
        }
    }

    pub(crate) fn confirm(
        &self,
        txn: &mut WriteTransaction,
        target_hash: BlockHash,
        max_blocks: usize,
    ) -> Vec<SavedBlock> {
        let mut result = Vec::new();

        let mut stack = VecDeque::new();
        stack.push_back(target_hash);
        while let Some(&hash) = stack.back() {
            let Some(block) = self.any.get_block(txn, &hash) else {
                error!(%hash, "block to cement not found");
                break;
            };

            let dependents =
                block.dependent_blocks(&self.constants.epochs, &self.constants.genesis_account);
            for dependent in dependents.iter() {
                if !dependent.is_zero() && !self.confirmed.block_exists_or_pruned(txn, dependent) {
                    self.observer.dependent_unconfirmed();

                    stack.push_back(*dependent);

                    // Forget the bottom of the dependency tree when the stack gets too large
                    if stack.len() > max_blocks {
                        stack.pop_front();
                    }
                }
            }

            if stack.back() == Some(&hash) {
                stack.pop_back();
                // Only blocks with confirmed dependencies get here
                if !self.confirmed.block_exists_or_pruned(txn, &hash) {
                    let conf_height = ConfirmationHeightInfo::new(block.height(), block.hash());

                    self.store
                        .confirmation_height
                        .put(txn, &block.account(), &conf_height);
                    self.store
                        .cache
                        .cemented_count
                        .fetch_add(1, Ordering::SeqCst);

                    self.observer.blocks_cemented(1);
                    trace!(hash = %block.hash(), height = block.height(), "block cemented");

                    result.push(block);
                }
            }

            // A refresh lets other writers in, which could roll back the target
            if txn.refresh_if_needed() && !self.any.block_exists(txn, &target_hash) {
                break;
            }

            // Early return might leave parts of the dependency tree unconfirmed
            if result.len() >= max_blocks {
                break;
            }
        }
        result
    }
}
