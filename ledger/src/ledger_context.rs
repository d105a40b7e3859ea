use crate::{ledger_constants::LEDGER_CONSTANTS_STUB, Ledger, RepWeightCache};
use lattice_core::{Account, ConfirmationHeightInfo};
use lattice_store::{Store, WriteTransaction};
use std::sync::Arc;

#[cfg(test)]
use crate::ledger_tests::helpers::AccountBlockFactory;

/// An in-memory ledger that accepts stub work, for tests
pub struct LedgerContext {
    pub ledger: Arc<Ledger>,
}

impl LedgerContext {
    pub fn empty() -> Self {
        let store = Arc::new(Store::new());
        let rep_weights = Arc::new(RepWeightCache::new());
        let ledger = match Ledger::new(store, LEDGER_CONSTANTS_STUB.clone(), rep_weights) {
            Ok(ledger) => ledger,
            Err(e) => panic!("could not create ledger: {e}"),
        };

        LedgerContext {
            ledger: Arc::new(ledger),
        }
    }

    #[cfg(test)]
    pub(crate) fn genesis_block_factory(&self) -> AccountBlockFactory {
        AccountBlockFactory::genesis(&self.ledger)
    }

    #[cfg(test)]
    pub(crate) fn block_factory(&self) -> AccountBlockFactory {
        AccountBlockFactory::new(&self.ledger)
    }

    /// Marks the next block of the account as confirmed, without checking dependencies
    pub fn inc_confirmation_height(&self, txn: &mut WriteTransaction, account: &Account) {
        let mut height = self
            .ledger
            .store
            .confirmation_height
            .get(txn, account)
            .unwrap_or_else(|| ConfirmationHeightInfo {
                height: 0,
                frontier: self
                    .ledger
                    .account_info(txn, account)
                    .map(|i| i.head)
                    .unwrap_or_default(),
            });
        height.height += 1;
        self.ledger
            .store
            .confirmation_height
            .put(txn, account, &height);
    }
}
