use lattice_core::{Amount, PrivateKey, PublicKey};
use lattice_ledger::RepWeightCache;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::info;

/// The representative keys this node holds and may vote with
pub struct WalletRepresentatives {
    enable_voting: bool,
    vote_minimum: Amount,
    rep_weights: Arc<RepWeightCache>,
    keys: Mutex<HashMap<PublicKey, PrivateKey>>,
}

impl WalletRepresentatives {
    pub fn new(enable_voting: bool, vote_minimum: Amount, rep_weights: Arc<RepWeightCache>) -> Self {
        Self {
            enable_voting,
            vote_minimum,
            rep_weights,
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// Returns false if the key was already present
    pub fn insert(&self, key: PrivateKey) -> bool {
        let public_key = key.public_key();
        let inserted = self
            .keys
            .lock()
            .unwrap()
            .insert(public_key, key)
            .is_none();
        if inserted {
            info!(representative = %public_key, "Representative key added");
        }
        inserted
    }

    pub fn remove(&self, representative: &PublicKey) -> bool {
        self.keys.lock().unwrap().remove(representative).is_some()
    }

    pub fn exists(&self, representative: &PublicKey) -> bool {
        self.keys.lock().unwrap().contains_key(representative)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn voting_enabled(&self) -> bool {
        self.enable_voting
    }

    /// Keys whose representative weight reaches the vote minimum
    pub fn voting_reps(&self) -> Vec<PrivateKey> {
        if !self.enable_voting {
            return Vec::new();
        }
        self.keys
            .lock()
            .unwrap()
            .values()
            .filter(|key| {
                let weight = self.rep_weights.weight(&key.public_key());
                !weight.is_zero() && weight >= self.vote_minimum
            })
            .cloned()
            .collect()
    }

    pub fn voting_reps_count(&self) -> usize {
        self.voting_reps().len()
    }

    pub fn foreach_representative(&self, mut action: impl FnMut(&PrivateKey)) {
        for key in self.voting_reps() {
            action(&key);
        }
    }
}
