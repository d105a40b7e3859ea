use crate::stats::{DetailType, Direction, StatType, Stats};
use lattice_core::BlockSubType;
use lattice_ledger::LedgerObserver;
use std::sync::Arc;

/// Counts ledger events
pub struct LedgerStats {
    stats: Arc<Stats>,
}

impl LedgerStats {
    pub fn new(stats: Arc<Stats>) -> Self {
        Self { stats }
    }
}

impl LedgerObserver for LedgerStats {
    fn blocks_cemented(&self, cemented_count: u64) {
        self.stats.add_dir(
            StatType::ConfirmationHeight,
            DetailType::BlocksConfirmed,
            Direction::In,
            cemented_count,
        );
    }

    fn block_rolled_back(&self, block_type: BlockSubType) {
        self.stats.inc(StatType::Rollback, block_type.into());
    }

    fn block_added(&self, block_type: BlockSubType) {
        self.stats.inc(StatType::Ledger, block_type.into());
    }

    fn dependent_unconfirmed(&self) {
        self.stats.inc(
            StatType::ConfirmationHeight,
            DetailType::DependentUnconfirmed,
        );
    }
}

impl From<BlockSubType> for DetailType {
    fn from(block_type: BlockSubType) -> Self {
        match block_type {
            BlockSubType::Send => DetailType::Send,
            BlockSubType::Receive => DetailType::Receive,
            BlockSubType::Open => DetailType::Open,
            BlockSubType::Change => DetailType::Change,
            BlockSubType::Epoch => DetailType::EpochBlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Amount, PublicKey, UnsavedBlockLatticeBuilder};
    use lattice_ledger::{Ledger, RepWeightCache, LEDGER_CONSTANTS_STUB};
    use lattice_store::Store;

    #[test]
    fn counts_added_and_rolled_back_blocks() {
        let stats = Arc::new(Stats::default());
        let mut ledger = Ledger::new(
            Arc::new(Store::new()),
            LEDGER_CONSTANTS_STUB.clone(),
            Arc::new(RepWeightCache::new()),
        )
        .unwrap();
        ledger.set_observer(Arc::new(LedgerStats::new(stats.clone())));

        let mut lattice = UnsavedBlockLatticeBuilder::new();
        let send = lattice
            .genesis()
            .send(PublicKey::from(1), Amount::raw(1));
        let mut txn = ledger.rw_txn();
        ledger.process(&mut txn, &send).unwrap();
        ledger.rollback(&mut txn, &send.hash()).unwrap();

        assert_eq!(stats.count(StatType::Ledger, DetailType::Send, Direction::In), 1);
        assert_eq!(stats.count(StatType::Rollback, DetailType::Send, Direction::In), 1);
    }
}
