mod account_store;
mod block_store;
mod confirmation_height_store;
mod final_vote_store;
mod frontier_store;
mod pending_store;
mod pruned_store;
mod transaction;

pub use account_store::AccountStore;
pub use block_store::BlockStore;
pub use confirmation_height_store::ConfirmationHeightStore;
pub use final_vote_store::FinalVoteStore;
pub use frontier_store::FrontierStore;
pub use pending_store::PendingStore;
pub use pruned_store::PrunedStore;
pub use transaction::{ReadTransaction, StoreEnv, Tables, Transaction, WriteTransaction};

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Counters that would be too expensive to compute from the tables on every request
#[derive(Default)]
pub struct LedgerCache {
    pub cemented_count: AtomicU64,
    pub block_count: AtomicU64,
    pub pruned_count: AtomicU64,
    pub account_count: AtomicU64,
}

impl LedgerCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn reset(&self) {
        self.cemented_count.store(0, Ordering::SeqCst);
        self.block_count.store(0, Ordering::SeqCst);
        self.pruned_count.store(0, Ordering::SeqCst);
        self.account_count.store(0, Ordering::SeqCst);
    }
}

/// Transactional key value store holding the ledger tables in memory
pub struct Store {
    env: Arc<StoreEnv>,
    pub cache: Arc<LedgerCache>,
    pub account: AccountStore,
    pub block: BlockStore,
    pub frontier: FrontierStore,
    pub pending: PendingStore,
    pub confirmation_height: ConfirmationHeightStore,
    pub pruned: PrunedStore,
    pub final_vote: FinalVoteStore,
}

impl Store {
    pub fn new() -> Self {
        Self {
            env: Arc::new(StoreEnv::new()),
            cache: Arc::new(LedgerCache::new()),
            account: AccountStore,
            block: BlockStore::new(),
            frontier: FrontierStore,
            pending: PendingStore,
            confirmation_height: ConfirmationHeightStore,
            pruned: PrunedStore,
            final_vote: FinalVoteStore,
        }
    }

    pub fn tx_begin_read(&self) -> ReadTransaction {
        self.env.tx_begin_read()
    }

    pub fn tx_begin_write(&self) -> WriteTransaction {
        self.env.tx_begin_write()
    }

    pub fn env(&self) -> &Arc<StoreEnv> {
        &self.env
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
