use lattice_core::{AccountInfo, Amount, PublicKey};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard},
};

/// Returns the cached vote weight for the given representative.
/// All weight changes of a single block are applied under one lock,
/// so readers never observe a half applied representative switch.
pub struct RepWeightCache {
    weights: RwLock<HashMap<PublicKey, Amount>>,
}

impl RepWeightCache {
    pub fn new() -> Self {
        Self {
            weights: RwLock::new(HashMap::new()),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<HashMap<PublicKey, Amount>> {
        self.weights.read().unwrap()
    }

    pub fn weight(&self, rep: &PublicKey) -> Amount {
        self.weights
            .read()
            .unwrap()
            .get(rep)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.weights.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> Amount {
        self.weights
            .read()
            .unwrap()
            .values()
            .fold(Amount::zero(), |acc, w| acc.wrapping_add(*w))
    }

    pub fn set(&self, rep: PublicKey, weight: Amount) {
        let mut weights = self.weights.write().unwrap();
        if weight.is_zero() {
            weights.remove(&rep);
        } else {
            weights.insert(rep, weight);
        }
    }

    /// Moves `old_amount` away from `old_rep` and adds `new_amount` to `new_rep`.
    /// Both representatives can be the same account.
    pub fn apply_delta(
        &self,
        old_rep: PublicKey,
        old_amount: Amount,
        new_rep: PublicKey,
        new_amount: Amount,
    ) {
        let mut weights = self.weights.write().unwrap();
        Self::add_to(&mut weights, old_rep, Amount::zero().wrapping_sub(old_amount));
        Self::add_to(&mut weights, new_rep, new_amount);
    }

    /// Recomputes all weights from the given account infos
    pub fn rebuild<'a>(&self, accounts: impl Iterator<Item = &'a AccountInfo>) {
        let mut weights = HashMap::new();
        for info in accounts {
            Self::add_to(&mut weights, info.representative, info.balance);
        }
        *self.weights.write().unwrap() = weights;
    }

    fn add_to(weights: &mut HashMap<PublicKey, Amount>, rep: PublicKey, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let current = weights.get(&rep).cloned().unwrap_or_default();
        let new_weight = current.wrapping_add(amount);
        if new_weight.is_zero() {
            weights.remove(&rep);
        } else {
            weights.insert(rep, new_weight);
        }
    }
}

impl Default for RepWeightCache {
    fn default() -> Self {
        Self::new()
    }
}
