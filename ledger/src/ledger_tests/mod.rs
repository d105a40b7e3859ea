pub(crate) mod helpers;

mod confirmation;
mod empty_ledger;
mod epochs;
mod process_blocks;
mod receivable_iteration;
mod rollback_legacy_change;
mod rollback_legacy_send;
mod rollback_state;

pub(crate) use crate::LedgerContext;
