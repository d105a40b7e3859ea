use super::{AlreadyCementedCallback, BlockCallback};
use crate::stats::{DetailType, StatType, Stats};
use lattice_core::{BlockHash, SavedBlock};
use lattice_ledger::Ledger;
use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};
use tracing::{debug, error, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmingSetConfig {
    pub batch_size: usize,
    /// Maximum number of dependent blocks to be stored in memory during processing
    pub max_blocks: usize,
}

impl Default for ConfirmingSetConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            max_blocks: 128 * 128,
        }
    }
}

/// Set of blocks to be durably confirmed
pub struct ConfirmingSet {
    thread: Arc<ConfirmingSetThread>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConfirmingSet {
    /// How often a block that is not in the ledger yet is retried
    const MAX_MISSING_ATTEMPTS: u32 = 40;
    const MISSING_RETRY_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(config: ConfirmingSetConfig, ledger: Arc<Ledger>, stats: Arc<Stats>) -> Self {
        Self {
            join_handle: Mutex::new(None),
            thread: Arc::new(ConfirmingSetThread {
                mutex: Mutex::new(ConfirmingSetImpl::default()),
                stopped: AtomicBool::new(false),
                condition: Condvar::new(),
                ledger,
                stats,
                config,
                observers: Mutex::new(Observers::default()),
            }),
        }
    }

    pub fn on_cemented(&self, callback: BlockCallback) {
        self.thread
            .observers
            .lock()
            .unwrap()
            .cemented
            .push(callback);
    }

    pub fn on_already_cemented(&self, callback: AlreadyCementedCallback) {
        self.thread
            .observers
            .lock()
            .unwrap()
            .already_cemented
            .push(callback);
    }

    /// Adds a block to the set of blocks to be confirmed
    pub fn add(&self, hash: BlockHash) {
        self.thread.add(Entry { hash, attempts: 0 });
    }

    pub fn start(&self) {
        debug_assert!(self.join_handle.lock().unwrap().is_none());

        let thread = Arc::clone(&self.thread);
        match std::thread::Builder::new()
            .name("Conf height".to_string())
            .spawn(move || thread.run())
        {
            Ok(handle) => *self.join_handle.lock().unwrap() = Some(handle),
            Err(e) => error!("Could not start confirming set thread: {e}"),
        }
    }

    pub fn stop(&self) {
        self.thread.stop();
        let handle = self.join_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Confirming set thread panicked");
            }
        }
    }

    /// Added blocks will remain in this set until after ledger has them marked as confirmed.
    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.thread.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.thread.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ConfirmingSet {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ConfirmingSetThread {
    mutex: Mutex<ConfirmingSetImpl>,
    stopped: AtomicBool,
    condition: Condvar,
    ledger: Arc<Ledger>,
    stats: Arc<Stats>,
    config: ConfirmingSetConfig,
    observers: Mutex<Observers>,
}

impl ConfirmingSetThread {
    fn stop(&self) {
        {
            let _guard = self.mutex.lock().unwrap();
            self.stopped.store(true, Ordering::SeqCst);
        }
        self.condition.notify_all();
    }

    fn add(&self, entry: Entry) {
        let added = {
            let mut guard = self.mutex.lock().unwrap();
            guard.insert(entry)
        };

        if added {
            self.condition.notify_all();
            self.stats.inc(StatType::ConfirmingSet, DetailType::Insert);
        } else {
            self.stats
                .inc(StatType::ConfirmingSet, DetailType::Duplicate);
        }
    }

    fn contains(&self, hash: &BlockHash) -> bool {
        let guard = self.mutex.lock().unwrap();
        guard.hashes.contains(hash) || guard.current.contains(hash)
    }

    fn len(&self) -> usize {
        let guard = self.mutex.lock().unwrap();
        guard.set.len() + guard.deferred.len()
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !self.stopped.load(Ordering::SeqCst) {
            if !guard.set.is_empty() {
                let batch = guard.next_batch(self.config.batch_size);

                // Keep track of the blocks we're currently cementing, so that the .contains (...) check is accurate
                debug_assert!(guard.current.is_empty());
                for entry in &batch {
                    guard.current.insert(entry.hash);
                }

                drop(guard);

                self.run_batch(batch);
                guard = self.mutex.lock().unwrap();
            } else if !guard.deferred.is_empty() {
                guard = self
                    .condition
                    .wait_timeout_while(guard, ConfirmingSet::MISSING_RETRY_INTERVAL, |i| {
                        i.set.is_empty() && !self.stopped.load(Ordering::SeqCst)
                    })
                    .unwrap()
                    .0;
                guard.retry_deferred();
            } else {
                guard = self
                    .condition
                    .wait_while(guard, |i| {
                        i.set.is_empty()
                            && i.deferred.is_empty()
                            && !self.stopped.load(Ordering::SeqCst)
                    })
                    .unwrap();
            }
        }
    }

    fn run_batch(&self, batch: VecDeque<Entry>) {
        let mut cemented = VecDeque::new();
        let mut already_cemented = VecDeque::new();
        let mut missing = Vec::new();

        {
            let mut tx = self.ledger.rw_txn();

            for entry in batch {
                let hash = entry.hash;
                let mut cemented_count = 0;
                let mut success = false;
                loop {
                    tx.refresh_if_needed();

                    // Cementing deep dependency chains might take a long time, allow for graceful shutdown, ignore notifications
                    if self.stopped.load(Ordering::Relaxed) {
                        return;
                    }

                    self.stats
                        .inc(StatType::ConfirmingSet, DetailType::Cementing);

                    // The block might be rolled back before it's fully cemented, or not be processed yet
                    if !self.ledger.any().block_exists(&tx, &hash) {
                        self.stats
                            .inc(StatType::ConfirmingSet, DetailType::MissingBlock);
                        missing.push(entry);
                        break;
                    }

                    let added = self
                        .ledger
                        .confirm_max(&mut tx, hash, self.config.max_blocks);
                    if !added.is_empty() {
                        // Confirming this block may implicitly confirm more
                        self.stats.add(
                            StatType::ConfirmingSet,
                            DetailType::Cemented,
                            added.len() as u64,
                        );
                        cemented_count += added.len();
                        cemented.extend(added);
                    } else {
                        self.stats
                            .inc(StatType::ConfirmingSet, DetailType::AlreadyCemented);
                        already_cemented.push_back(hash);
                    }

                    success = self.ledger.confirmed().block_exists(&tx, &hash);
                    if success || already_cemented.back() == Some(&hash) {
                        break;
                    }
                }

                if success {
                    debug!(%hash, cemented_count, "Cemented block");
                }
            }

            tx.commit();
        }

        self.notify(&cemented, &already_cemented);

        let mut guard = self.mutex.lock().unwrap();
        guard.current.clear();
        for entry in missing {
            guard.hashes.remove(&entry.hash);
            if entry.attempts < ConfirmingSet::MAX_MISSING_ATTEMPTS {
                guard.defer(entry);
            } else {
                warn!(hash = %entry.hash, "Block to confirm never appeared in the ledger, giving up");
            }
        }
    }

    fn notify(&self, cemented: &VecDeque<SavedBlock>, already_cemented: &VecDeque<BlockHash>) {
        if cemented.is_empty() && already_cemented.is_empty() {
            return;
        }
        let mut observers = self.observers.lock().unwrap();
        for block in cemented {
            for observer in &mut observers.cemented {
                observer(block);
            }
        }
        for hash in already_cemented {
            for observer in &mut observers.already_cemented {
                observer(hash);
            }
        }
    }
}

struct Entry {
    hash: BlockHash,
    attempts: u32,
}

#[derive(Default)]
struct ConfirmingSetImpl {
    set: VecDeque<Entry>,
    hashes: HashSet<BlockHash>,
    deferred: Vec<Entry>,
    current: HashSet<BlockHash>,
}

impl ConfirmingSetImpl {
    fn insert(&mut self, entry: Entry) -> bool {
        if !self.hashes.insert(entry.hash) {
            return false;
        }
        self.set.push_back(entry);
        true
    }

    fn next_batch(&mut self, max_count: usize) -> VecDeque<Entry> {
        let count = max_count.min(self.set.len());
        let batch: VecDeque<_> = self.set.drain(..count).collect();
        for entry in &batch {
            self.hashes.remove(&entry.hash);
        }
        batch
    }

    fn defer(&mut self, mut entry: Entry) {
        entry.attempts += 1;
        self.deferred.push(entry);
    }

    fn retry_deferred(&mut self) {
        for entry in std::mem::take(&mut self.deferred) {
            self.insert(entry);
        }
    }
}

#[derive(Default)]
struct Observers {
    cemented: Vec<BlockCallback>,
    already_cemented: Vec<AlreadyCementedCallback>,
}
