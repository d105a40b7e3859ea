use crate::stats::{DetailType, StatType, Stats};
use lattice_core::{BlockHash, UncheckedInfo, UncheckedKey};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};
use tracing::trace;

pub type SatisfiedCallback = Box<dyn Fn(&UncheckedInfo) + Send + Sync>;

/// Blocks whose dependency is missing, keyed by that dependency
pub struct UncheckedMap {
    max_unchecked_blocks: usize,
    stats: Arc<Stats>,
    disable_delete: bool,
    entries: Mutex<EntriesContainer>,
    satisfied_observers: Mutex<Vec<SatisfiedCallback>>,
}

impl UncheckedMap {
    pub fn new(max_unchecked_blocks: usize, stats: Arc<Stats>, disable_delete: bool) -> Self {
        Self {
            max_unchecked_blocks,
            stats,
            disable_delete,
            entries: Mutex::new(EntriesContainer::default()),
            satisfied_observers: Mutex::new(Vec::new()),
        }
    }

    /// Called for every block whose dependency arrived
    pub fn add_satisfied_observer(&self, callback: SatisfiedCallback) {
        self.satisfied_observers.lock().unwrap().push(callback);
    }

    pub fn put(&self, dependency: BlockHash, info: UncheckedInfo) {
        let key = UncheckedKey::new(dependency, info.block.hash());
        let mut entries = self.entries.lock().unwrap();
        if entries.insert(key, info) {
            self.stats.inc(StatType::Unchecked, DetailType::Put);
            trace!(%dependency, hash = %key.hash, "Unchecked block added");
        } else {
            self.stats.inc(StatType::Unchecked, DetailType::Duplicate);
        }
        while entries.len() > self.max_unchecked_blocks {
            entries.pop_front();
            self.stats.inc(StatType::Unchecked, DetailType::Trim);
        }
    }

    pub fn get(&self, dependency: &BlockHash) -> Vec<UncheckedInfo> {
        self.entries
            .lock()
            .unwrap()
            .by_dependency(dependency)
            .map(|(_, info)| info.clone())
            .collect()
    }

    pub fn exists(&self, key: &UncheckedKey) -> bool {
        self.entries.lock().unwrap().by_key.contains_key(key)
    }

    pub fn remove(&self, key: &UncheckedKey) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Visits entries in key order until `predicate` returns false
    pub fn for_each(
        &self,
        mut action: impl FnMut(&UncheckedKey, &UncheckedInfo),
        predicate: impl Fn() -> bool,
    ) {
        let entries = self.entries.lock().unwrap();
        for (key, info) in entries.by_key.iter() {
            if !predicate() {
                break;
            }
            action(key, info);
        }
    }

    /// Hands all blocks that waited for `dependency` to the satisfied observers
    pub fn trigger(&self, dependency: &BlockHash) {
        let satisfied: Vec<(UncheckedKey, UncheckedInfo)> = {
            let entries = self.entries.lock().unwrap();
            entries
                .by_dependency(dependency)
                .map(|(key, info)| (*key, info.clone()))
                .collect()
        };
        if satisfied.is_empty() {
            return;
        }

        if !self.disable_delete {
            let mut entries = self.entries.lock().unwrap();
            for (key, _) in &satisfied {
                entries.remove(key);
            }
        }

        let observers = self.satisfied_observers.lock().unwrap();
        for (_, info) in &satisfied {
            self.stats.inc(StatType::Unchecked, DetailType::Satisfied);
            for observer in observers.iter() {
                observer(info);
            }
        }
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct EntriesContainer {
    by_key: BTreeMap<UncheckedKey, UncheckedInfo>,
    sequenced: VecDeque<UncheckedKey>,
}

impl EntriesContainer {
    fn insert(&mut self, key: UncheckedKey, info: UncheckedInfo) -> bool {
        if self.by_key.contains_key(&key) {
            return false;
        }
        self.by_key.insert(key, info);
        self.sequenced.push_back(key);
        true
    }

    fn by_dependency<'a>(
        &'a self,
        dependency: &BlockHash,
    ) -> impl Iterator<Item = (&'a UncheckedKey, &'a UncheckedInfo)> + 'a {
        let start = UncheckedKey::new(*dependency, BlockHash::zero());
        let dependency = *dependency;
        self.by_key
            .range(start..)
            .take_while(move |(key, _)| key.dependency == dependency)
    }

    fn remove(&mut self, key: &UncheckedKey) -> Option<UncheckedInfo> {
        let removed = self.by_key.remove(key);
        if removed.is_some() {
            self.sequenced.retain(|k| k != key);
        }
        removed
    }

    fn pop_front(&mut self) {
        if let Some(key) = self.sequenced.pop_front() {
            self.by_key.remove(&key);
        }
    }

    fn clear(&mut self) {
        self.by_key.clear();
        self.sequenced.clear();
    }

    fn len(&self) -> usize {
        self.by_key.len()
    }
}
