use super::NetworkConstants;
use lattice_core::{work::WorkThresholds, Networks};
use lattice_ledger::LedgerConstants;

/// Everything that differs between networks
#[derive(Clone)]
pub struct NetworkParams {
    pub network: NetworkConstants,
    pub ledger: LedgerConstants,
}

impl NetworkParams {
    pub fn new(network: Networks) -> anyhow::Result<Self> {
        let ledger = LedgerConstants::for_network(network)?;
        Ok(Self {
            network: NetworkConstants::new(ledger.work.clone(), network),
            ledger,
        })
    }

    pub fn dev() -> Self {
        let ledger = LedgerConstants::dev();
        Self {
            network: NetworkConstants::dev(ledger.work.clone()),
            ledger,
        }
    }

    /// Dev network that accepts stub work
    pub fn unit_test() -> Self {
        let ledger = LedgerConstants::unit_test();
        Self {
            network: NetworkConstants::dev(ledger.work.clone()),
            ledger,
        }
    }

    pub fn work(&self) -> &WorkThresholds {
        &self.network.work
    }
}
