#[macro_use]
extern crate anyhow;

mod block_cementer;
mod block_insertion;
mod block_rollback;
mod dependent_blocks_finder;
mod ledger;
mod ledger_constants;
mod ledger_context;
mod ledger_set_any;
mod ledger_set_confirmed;
mod rep_weight_cache;

#[cfg(test)]
mod ledger_tests;

pub use dependent_blocks_finder::DependentBlocksFinder;
pub use ledger::{
    BlockStatus, Ledger, LedgerObserver, NullLedgerObserver, ProcessedBlock, SignatureVerification,
};
pub use ledger_constants::{
    LedgerConstants, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH, DEV_GENESIS_PUB_KEY,
    LEDGER_CONSTANTS_STUB,
};
pub use ledger_context::LedgerContext;
pub use ledger_set_any::LedgerSetAny;
pub use ledger_set_confirmed::LedgerSetConfirmed;
pub use rep_weight_cache::RepWeightCache;
