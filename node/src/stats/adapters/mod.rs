mod ledger_stats;

pub use ledger_stats::LedgerStats;
