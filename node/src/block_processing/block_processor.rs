use super::UncheckedMap;
use crate::stats::{DetailType, Direction, StatType, Stats};
use lattice_core::{Block, BlockHash, QualifiedRoot, SavedBlock, UncheckedInfo};
use lattice_ledger::{BlockStatus, Ledger};
use lattice_store::WriteTransaction;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Condvar, Mutex,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, trace, warn};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BlockSource {
    Unknown,
    /// Published by a peer
    Live,
    /// Created by this node
    Local,
    /// Must replace whatever block occupies its slot in the ledger
    Forced,
}

impl From<BlockSource> for DetailType {
    fn from(source: BlockSource) -> Self {
        match source {
            BlockSource::Unknown => DetailType::Unknown,
            BlockSource::Live => DetailType::Live,
            BlockSource::Local => DetailType::Local,
            BlockSource::Forced => DetailType::Forced,
        }
    }
}

impl From<BlockStatus> for DetailType {
    fn from(status: BlockStatus) -> Self {
        match status {
            BlockStatus::Progress => DetailType::Progress,
            BlockStatus::BadSignature => DetailType::BadSignature,
            BlockStatus::Old => DetailType::Old,
            BlockStatus::NegativeSpend => DetailType::NegativeSpend,
            BlockStatus::Fork => DetailType::Fork,
            BlockStatus::Unreceivable => DetailType::Unreceivable,
            BlockStatus::GapPrevious => DetailType::GapPrevious,
            BlockStatus::GapSource => DetailType::GapSource,
            BlockStatus::GapEpochOpenPending => DetailType::GapEpochOpenPending,
            BlockStatus::OpenedBurnAccount => DetailType::OpenedBurnAccount,
            BlockStatus::BalanceMismatch => DetailType::BalanceMismatch,
            BlockStatus::RepresentativeMismatch => DetailType::RepresentativeMismatch,
            BlockStatus::BlockPosition => DetailType::BlockPosition,
            BlockStatus::InsufficientWork => DetailType::InsufficientWork,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockProcessorConfig {
    /// Maximum number of queued blocks per source
    pub max_queue: usize,
    pub batch_size: usize,
    /// Maximum time a write transaction is held for one batch
    pub batch_max_time: Duration,
}

impl Default for BlockProcessorConfig {
    fn default() -> Self {
        Self {
            max_queue: 16 * 1024,
            batch_size: 256,
            batch_max_time: Duration::from_millis(500),
        }
    }
}

/// A queued block together with where it came from
pub struct BlockContext {
    pub block: Block,
    pub source: BlockSource,
    pub arrival: Instant,
    /// Set once the block was inserted into the ledger
    pub saved_block: Option<SavedBlock>,
    waiter: Option<mpsc::SyncSender<BlockStatus>>,
}

impl BlockContext {
    pub fn new(block: Block, source: BlockSource) -> Self {
        Self {
            block,
            source,
            arrival: Instant::now(),
            saved_block: None,
            waiter: None,
        }
    }

    fn notify_waiter(&mut self, status: BlockStatus) {
        if let Some(waiter) = self.waiter.take() {
            // The waiting thread may have given up already
            let _ = waiter.send(status);
        }
    }
}

pub type BlockProcessedCallback = Box<dyn Fn(BlockStatus, &BlockContext) + Send + Sync>;
/// Receives the rolled back blocks and the root of the block that replaced them
pub type RolledBackCallback = Box<dyn Fn(&[SavedBlock], QualifiedRoot) + Send + Sync>;

/// Inserts queued blocks into the ledger on a dedicated thread
pub struct BlockProcessor {
    processor_loop: Arc<BlockProcessorLoop>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl BlockProcessor {
    pub fn new(
        config: BlockProcessorConfig,
        ledger: Arc<Ledger>,
        unchecked: Arc<UncheckedMap>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            processor_loop: Arc::new(BlockProcessorLoop {
                mutex: Mutex::new(BlockProcessorImpl::default()),
                condition: Condvar::new(),
                stopped: AtomicBool::new(false),
                config,
                ledger,
                unchecked,
                stats,
                processed_observers: Mutex::new(Vec::new()),
                rolled_back_observers: Mutex::new(Vec::new()),
            }),
            thread: Mutex::new(None),
        }
    }

    pub fn new_test_instance(ledger: Arc<Ledger>) -> Self {
        let stats = Arc::new(Stats::default());
        let unchecked = Arc::new(UncheckedMap::new(65536, stats.clone(), false));
        Self::new(BlockProcessorConfig::default(), ledger, unchecked, stats)
    }

    pub fn start(&self) {
        debug_assert!(self.thread.lock().unwrap().is_none());
        let processor_loop = Arc::clone(&self.processor_loop);
        match std::thread::Builder::new()
            .name("Blck processing".to_string())
            .spawn(move || processor_loop.run())
        {
            Ok(handle) => *self.thread.lock().unwrap() = Some(handle),
            Err(e) => error!("Could not start block processor thread: {e}"),
        }
    }

    pub fn stop(&self) {
        self.processor_loop.stop();
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Block processor thread panicked");
            }
        }
    }

    pub fn add_processed_observer(&self, observer: BlockProcessedCallback) {
        self.processor_loop
            .processed_observers
            .lock()
            .unwrap()
            .push(observer);
    }

    pub fn add_rolled_back_observer(&self, observer: RolledBackCallback) {
        self.processor_loop
            .rolled_back_observers
            .lock()
            .unwrap()
            .push(observer);
    }

    /// Queues a block. Returns false if the queue for its source is full
    pub fn add(&self, block: Block, source: BlockSource) -> bool {
        self.processor_loop.add(BlockContext::new(block, source))
    }

    /// Queues a block that was published by a peer
    pub fn process_active(&self, block: Block) -> bool {
        self.add(block, BlockSource::Live)
    }

    /// Queues a block and waits until it was processed.
    /// Returns None if the block was dropped or the processor stopped
    pub fn add_blocking(&self, block: Block, source: BlockSource) -> Option<BlockStatus> {
        let (tx, rx) = mpsc::sync_channel(1);
        let mut context = BlockContext::new(block, source);
        context.waiter = Some(tx);
        if !self.processor_loop.add(context) {
            return None;
        }
        match rx.recv() {
            Ok(status) => Some(status),
            Err(_) => {
                warn!("Block dropped while waiting for its processing result");
                None
            }
        }
    }

    /// Replaces the block that currently occupies the slot of `block` in the ledger
    pub fn force(&self, block: Block) {
        self.processor_loop
            .stats
            .inc(StatType::Blockprocessor, DetailType::Forced);
        trace!(hash = %block.hash(), "Block forced");
        self.add(block, BlockSource::Forced);
    }

    pub fn queue_len(&self, source: BlockSource) -> usize {
        self.processor_loop.mutex.lock().unwrap().queue_len(source)
    }

    pub fn total_queue_len(&self) -> usize {
        self.processor_loop.mutex.lock().unwrap().total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_queue_len() == 0
    }
}

impl Drop for BlockProcessor {
    fn drop(&mut self) {
        // Thread must be stopped before destruction
        debug_assert!(self.thread.lock().unwrap().is_none());
    }
}

struct BlockProcessorLoop {
    mutex: Mutex<BlockProcessorImpl>,
    condition: Condvar,
    stopped: AtomicBool,
    config: BlockProcessorConfig,
    ledger: Arc<Ledger>,
    unchecked: Arc<UncheckedMap>,
    stats: Arc<Stats>,
    processed_observers: Mutex<Vec<BlockProcessedCallback>>,
    rolled_back_observers: Mutex<Vec<RolledBackCallback>>,
}

impl BlockProcessorLoop {
    fn stop(&self) {
        {
            let _guard = self.mutex.lock().unwrap();
            self.stopped.store(true, Ordering::SeqCst);
        }
        self.condition.notify_all();
    }

    fn add(&self, context: BlockContext) -> bool {
        let source = context.source;
        let hash = context.block.hash();
        let added = {
            let mut guard = self.mutex.lock().unwrap();
            if source != BlockSource::Forced
                && guard.queue_len(source) >= self.config.max_queue
            {
                false
            } else {
                guard.push(context);
                true
            }
        };

        if added {
            self.stats
                .inc_dir(StatType::BlockprocessorSource, source.into(), Direction::In);
            self.condition.notify_all();
        } else {
            self.stats.inc(StatType::Blockprocessor, DetailType::Overfill);
            debug!(%hash, ?source, "Block processor queue full, block dropped");
        }
        added
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !self.stopped.load(Ordering::SeqCst) {
            if guard.total_len() > 0 {
                let batch = guard.next_batch(self.config.batch_size);
                drop(guard);

                self.stats.inc(StatType::Blockprocessor, DetailType::Loop);
                let processed = self.process_batch(batch);
                self.notify_processed(processed);

                guard = self.mutex.lock().unwrap();
            } else {
                guard = self
                    .condition
                    .wait_while(guard, |i| {
                        i.total_len() == 0 && !self.stopped.load(Ordering::SeqCst)
                    })
                    .unwrap();
            }
        }
    }

    fn process_batch(
        &self,
        batch: VecDeque<BlockContext>,
    ) -> Vec<(BlockStatus, BlockContext)> {
        let mut processed = Vec::with_capacity(batch.len());
        let mut rolled_back = Vec::new();
        let mut txn = self.ledger.rw_txn();
        let start = Instant::now();
        let mut timer = Instant::now();

        for mut context in batch {
            if timer.elapsed() > self.config.batch_max_time {
                txn.refresh();
                timer = Instant::now();
            }

            if context.source == BlockSource::Forced {
                if let Some(blocks) = self.rollback_competitor(&mut txn, &context.block) {
                    rolled_back.push((blocks, context.block.qualified_root()));
                }
            }

            let status = self.process_one(&mut txn, &mut context);
            processed.push((status, context));
        }

        txn.commit();

        if processed.len() > 1 {
            debug!(
                "Processed {} blocks in {} ms",
                processed.len(),
                start.elapsed().as_millis()
            );
        }

        if !rolled_back.is_empty() {
            let observers = self.rolled_back_observers.lock().unwrap();
            for (blocks, root) in &rolled_back {
                for observer in observers.iter() {
                    observer(blocks, *root);
                }
            }
        }
        processed
    }

    fn process_one(&self, txn: &mut WriteTransaction, context: &mut BlockContext) -> BlockStatus {
        let block = &context.block;
        let hash = block.hash();

        let status = match self.ledger.process(txn, block) {
            Ok(saved_block) => {
                context.saved_block = Some(saved_block);
                BlockStatus::Progress
            }
            Err(status) => status,
        };

        self.stats
            .inc_dir(StatType::BlockprocessorResult, status.into(), Direction::In);
        self.stats.inc_dir(
            StatType::BlockprocessorSource,
            context.source.into(),
            Direction::Out,
        );
        trace!(%hash, ?status, source = ?context.source, "Block processed");
        if context.source == BlockSource::Forced && status != BlockStatus::Progress {
            warn!(%hash, status = status.as_str(), "Forced block could not be processed");
        }

        match status {
            BlockStatus::Progress => {
                self.unchecked.trigger(&hash);
            }
            BlockStatus::GapPrevious => {
                self.unchecked
                    .put(block.previous(), UncheckedInfo::new(block.clone()));
            }
            BlockStatus::GapSource => {
                self.unchecked
                    .put(block.source_or_link(), UncheckedInfo::new(block.clone()));
            }
            BlockStatus::GapEpochOpenPending => {
                // The account is used as dependency, so that the block is retried once
                // a receivable for it arrives
                let account = block.account_field().unwrap_or_default();
                self.unchecked.put(
                    BlockHash::from_bytes(*account.as_bytes()),
                    UncheckedInfo::new(block.clone()),
                );
            }
            BlockStatus::Fork => {
                debug!(%hash, root = %block.root(), "Fork detected");
            }
            _ => {}
        }

        status
    }

    /// Rolls back the block that occupies the slot of `block`, unless it is `block` itself
    fn rollback_competitor(
        &self,
        txn: &mut WriteTransaction,
        block: &Block,
    ) -> Option<Vec<SavedBlock>> {
        let hash = block.hash();
        let successor = self
            .ledger
            .any()
            .block_successor_by_qualified_root(txn, &block.qualified_root())?;
        if successor == hash {
            return None;
        }

        debug!(%successor, replacement = %hash, "Rolling back block");
        match self.ledger.rollback(txn, &successor) {
            Ok(rolled_back) => {
                self.stats.inc(StatType::Blockprocessor, DetailType::Rollback);
                info!(
                    "Rolled back {} blocks to make room for {}",
                    rolled_back.len(),
                    hash
                );
                Some(rolled_back)
            }
            Err(e) => {
                self.stats
                    .inc(StatType::Blockprocessor, DetailType::RollbackFailed);
                warn!("Failed to roll back {successor} in favour of {hash}: {e}");
                None
            }
        }
    }

    fn notify_processed(&self, processed: Vec<(BlockStatus, BlockContext)>) {
        let observers = self.processed_observers.lock().unwrap();
        for (status, mut context) in processed {
            for observer in observers.iter() {
                observer(status, &context);
            }
            context.notify_waiter(status);
        }
    }
}

#[derive(Default)]
struct BlockProcessorImpl {
    forced: VecDeque<BlockContext>,
    live: VecDeque<BlockContext>,
    local: VecDeque<BlockContext>,
    unknown: VecDeque<BlockContext>,
    /// Alternates between the live and local queues
    prefer_local: bool,
}

impl BlockProcessorImpl {
    fn queue(&mut self, source: BlockSource) -> &mut VecDeque<BlockContext> {
        match source {
            BlockSource::Forced => &mut self.forced,
            BlockSource::Live => &mut self.live,
            BlockSource::Local => &mut self.local,
            BlockSource::Unknown => &mut self.unknown,
        }
    }

    fn push(&mut self, context: BlockContext) {
        self.queue(context.source).push_back(context);
    }

    fn queue_len(&self, source: BlockSource) -> usize {
        match source {
            BlockSource::Forced => self.forced.len(),
            BlockSource::Live => self.live.len(),
            BlockSource::Local => self.local.len(),
            BlockSource::Unknown => self.unknown.len(),
        }
    }

    fn total_len(&self) -> usize {
        self.forced.len() + self.live.len() + self.local.len() + self.unknown.len()
    }

    fn next(&mut self) -> Option<BlockContext> {
        if let Some(forced) = self.forced.pop_front() {
            return Some(forced);
        }
        self.prefer_local = !self.prefer_local;
        let (first, second) = if self.prefer_local {
            (BlockSource::Local, BlockSource::Live)
        } else {
            (BlockSource::Live, BlockSource::Local)
        };
        self.queue(first)
            .pop_front()
            .or_else(|| self.queue(second).pop_front())
            .or_else(|| self.unknown.pop_front())
    }

    fn next_batch(&mut self, max_count: usize) -> VecDeque<BlockContext> {
        let mut batch = VecDeque::new();
        while batch.len() < max_count {
            match self.next() {
                Some(context) => batch.push_back(context),
                None => break,
            }
        }
        batch
    }
}
