use bounded_vec_deque::BoundedVecDeque;
use lattice_core::{Amount, PublicKey};
use lattice_ledger::RepWeightCache;
#[cfg(test)]
use mock_instant::thread_local::Instant;
use primitive_types::U256;
#[cfg(not(test))]
use std::time::Instant;
use std::{cmp::max, collections::HashMap, sync::Arc, time::Duration};

/// Percentage of the online weight that is needed for quorum
pub const ONLINE_WEIGHT_QUORUM: u8 = 67;

const MAX_TREND_SAMPLES: usize = 4032;

/// Track online representatives and trend online weight
pub struct OnlineReps {
    rep_weights: Arc<RepWeightCache>,
    /// Last time each representative was seen voting
    reps: HashMap<PublicKey, Instant>,
    samples: BoundedVecDeque<Amount>,
    trended: Amount,
    online: Amount,
    weight_period: Duration,
    online_weight_minimum: Amount,
    principal_weight_factor: u32,
}

impl OnlineReps {
    pub const DEFAULT_ONLINE_WEIGHT_MINIMUM: Amount = Amount::nano(60_000_000);

    pub fn new(rep_weights: Arc<RepWeightCache>) -> Self {
        Self {
            rep_weights,
            reps: HashMap::new(),
            samples: BoundedVecDeque::new(MAX_TREND_SAMPLES),
            trended: Amount::zero(),
            online: Amount::zero(),
            weight_period: Duration::from_secs(5 * 60),
            online_weight_minimum: Self::DEFAULT_ONLINE_WEIGHT_MINIMUM,
            principal_weight_factor: 1000,
        }
    }

    pub fn set_weight_period(&mut self, period: Duration) {
        self.weight_period = period;
    }

    pub fn set_online_weight_minimum(&mut self, minimum: Amount) {
        self.online_weight_minimum = minimum;
    }

    pub fn set_principal_weight_factor(&mut self, factor: u32) {
        self.principal_weight_factor = factor;
    }

    /// Adds a voting representative to the set of online representatives
    pub fn observe(&mut self, rep: PublicKey) {
        if self.rep_weights.weight(&rep).is_zero() {
            return;
        }
        let new_insert = self.reps.insert(rep, Instant::now()).is_none();
        let trimmed = self.trim();
        if new_insert || trimmed {
            self.calculate_online();
        }
    }

    /// Records the current online weight and recalculates the trend
    pub fn sample(&mut self) {
        if self.trim() {
            self.calculate_online();
        }
        self.samples.push_back(self.online);
        self.trended = self.calculate_trended();
    }

    /// Median of the sampled online weights
    pub fn trended(&self) -> Amount {
        self.trended
    }

    pub fn set_trended(&mut self, trended: Amount) {
        self.trended = trended;
    }

    /// Weight of the representatives seen during the last period
    pub fn online(&self) -> Amount {
        self.online
    }

    pub fn set_online(&mut self, amount: Amount) {
        self.online = amount;
    }

    /// Representatives with at least this weight are principal representatives
    pub fn minimum_principal_weight(&self) -> Amount {
        Amount::raw(self.trended.number() / self.principal_weight_factor as u128)
    }

    /// Weight needed for quorum
    pub fn delta(&self) -> Amount {
        // U256 because weight * 67 can overflow u128
        let weight = max(max(self.online, self.trended), self.online_weight_minimum);
        let delta =
            U256::from(weight.number()) * U256::from(ONLINE_WEIGHT_QUORUM) / U256::from(100);
        Amount::raw(delta.as_u128())
    }

    pub fn list(&self) -> Vec<PublicKey> {
        self.reps.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.reps.len()
    }

    pub fn clear(&mut self) {
        self.reps.clear();
        self.online = Amount::zero();
    }

    fn trim(&mut self) -> bool {
        let before = self.reps.len();
        let period = self.weight_period;
        self.reps.retain(|_, last_seen| last_seen.elapsed() < period);
        self.reps.len() != before
    }

    fn calculate_online(&mut self) {
        self.online = self
            .reps
            .keys()
            .map(|rep| self.rep_weights.weight(rep))
            .sum();
    }

    fn calculate_trended(&self) -> Amount {
        let mut sorted: Vec<Amount> = self.samples.iter().cloned().collect();
        sorted.sort();
        sorted.get(sorted.len() / 2).cloned().unwrap_or_default()
    }
}
