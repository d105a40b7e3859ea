use super::{DetailType, Direction, Sample, StatType, StatsConfig};
use bounded_vec_deque::BoundedVecDeque;
use std::{
    collections::BTreeMap,
    sync::{atomic::AtomicU64, Arc, Condvar, Mutex, RwLock},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Event counters and value samples of all node components
pub struct Stats {
    config: StatsConfig,
    mutables: Arc<RwLock<StatMutables>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    stats_loop: Arc<StatsLoop>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

impl Stats {
    pub fn new(config: StatsConfig) -> Self {
        let mutables = Arc::new(RwLock::new(StatMutables {
            counters: BTreeMap::new(),
            samplers: BTreeMap::new(),
            timestamp: Instant::now(),
        }));
        Self {
            config: config.clone(),
            thread: Mutex::new(None),
            stats_loop: Arc::new(StatsLoop {
                condition: Condvar::new(),
                mutables: Arc::clone(&mutables),
                config,
                loop_state: Mutex::new(StatsLoopState {
                    stopped: false,
                    log_last_count_writeout: Instant::now(),
                    log_last_sample_writeout: Instant::now(),
                }),
            }),
            mutables,
        }
    }

    pub fn start(&self) {
        if !self.should_run() {
            return;
        };

        let stats_loop = Arc::clone(&self.stats_loop);
        let spawned = std::thread::Builder::new()
            .name("Stats".to_string())
            .spawn(move || stats_loop.run());
        match spawned {
            Ok(handle) => *self.thread.lock().unwrap() = Some(handle),
            Err(e) => tracing::error!("Could not spawn stats thread: {e}"),
        }
    }

    fn should_run(&self) -> bool {
        !self.config.log_counters_interval.is_zero() || !self.config.log_samples_interval.is_zero()
    }

    pub fn stop(&self) {
        self.stats_loop.loop_state.lock().unwrap().stopped = true;
        self.stats_loop.condition.notify_all();
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Add `value` to given counter
    pub fn add(&self, stat_type: StatType, detail: DetailType, value: u64) {
        self.add_dir(stat_type, detail, Direction::In, value)
    }

    /// Add `value` to given counter
    pub fn add_dir(&self, stat_type: StatType, detail: DetailType, dir: Direction, value: u64) {
        if value == 0 {
            return;
        }

        let key = CounterKey::new(stat_type, detail, dir);

        // Two steps, so that the common case only needs the read lock
        {
            let lock = self.mutables.read().unwrap();
            if let Some(counter) = lock.counters.get(&key) {
                counter.add(value);
                return;
            }
        }
        {
            let mut lock = self.mutables.write().unwrap();
            let counter = lock.counters.entry(key).or_insert(CounterEntry::new());
            counter.add(value);

            let all_key = CounterKey::new(stat_type, DetailType::All, dir);
            if key != all_key {
                lock.counters.entry(all_key).or_insert(CounterEntry::new());
            }
        }
    }

    /// Adds `value` to the given counter and to the type level counter
    pub fn add_dir_aggregate(
        &self,
        stat_type: StatType,
        detail: DetailType,
        dir: Direction,
        value: u64,
    ) {
        if value == 0 {
            return;
        }

        let key = CounterKey::new(stat_type, detail, dir);
        let all_key = CounterKey::new(stat_type, DetailType::All, dir);

        {
            let lock = self.mutables.read().unwrap();
            if let (Some(counter), Some(all_counter)) =
                (lock.counters.get(&key), lock.counters.get(&all_key))
            {
                counter.add(value);
                if key != all_key {
                    all_counter.add(value);
                }
                return;
            }
        }
        {
            let mut lock = self.mutables.write().unwrap();
            lock.counters
                .entry(key)
                .or_insert(CounterEntry::new())
                .add(value);
            if key != all_key {
                lock.counters
                    .entry(all_key)
                    .or_insert(CounterEntry::new())
                    .add(value);
            }
        }
    }

    pub fn inc(&self, stat_type: StatType, detail: DetailType) {
        self.add_dir(stat_type, detail, Direction::In, 1)
    }

    pub fn inc_dir(&self, stat_type: StatType, detail: DetailType, dir: Direction) {
        self.add_dir(stat_type, detail, dir, 1)
    }

    pub fn inc_dir_aggregate(&self, stat_type: StatType, detail: DetailType, dir: Direction) {
        self.add_dir_aggregate(stat_type, detail, dir, 1)
    }

    pub fn sample(&self, sample: Sample, value: i64, expected_min_max: (i64, i64)) {
        let key = SamplerKey::new(sample);
        {
            let lock = self.mutables.read().unwrap();
            if let Some(sampler) = lock.samplers.get(&key) {
                sampler.add(value);
                return;
            }
        }
        {
            let mut lock = self.mutables.write().unwrap();
            let sampler = lock
                .samplers
                .entry(key)
                .or_insert(SamplerEntry::new(self.config.max_samples, expected_min_max));
            sampler.add(value)
        }
    }

    /// Drains the collected samples
    pub fn samples(&self, sample: Sample) -> Vec<i64> {
        let key = SamplerKey::new(sample);
        let lock = self.mutables.read().unwrap();
        if let Some(sampler) = lock.samplers.get(&key) {
            sampler.collect()
        } else {
            Vec::new()
        }
    }

    /// Writes all counters to the log
    pub fn log_counters(&self) {
        self.mutables.read().unwrap().log_counters();
    }

    /// Returns the duration since `clear()` was last called, or node startup if it's never called.
    pub fn last_reset(&self) -> Duration {
        let lock = self.mutables.read().unwrap();
        lock.timestamp.elapsed()
    }

    /// Clear all stats
    pub fn clear(&self) {
        let mut lock = self.mutables.write().unwrap();
        lock.counters.clear();
        lock.samplers.clear();
        lock.timestamp = Instant::now();
    }

    /// Sum of all detail counters of the given type
    pub fn count_all(&self, stat_type: StatType, dir: Direction) -> u64 {
        let guard = self.mutables.read().unwrap();
        let start = CounterKey::new(stat_type, DetailType::All, dir);
        let mut result = 0u64;
        for (key, entry) in guard.counters.range(start..) {
            if key.stat_type != stat_type {
                break;
            }
            if key.dir == dir && key.detail != DetailType::All {
                result += u64::from(entry);
            }
        }
        result
    }

    /// Returns current value for the given counter
    pub fn count(&self, stat_type: StatType, detail: DetailType, dir: Direction) -> u64 {
        let key = CounterKey::new(stat_type, detail, dir);
        self.mutables
            .read()
            .unwrap()
            .counters
            .get(&key)
            .map(|i| i.into())
            .unwrap_or_default()
    }
}

impl Drop for Stats {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct CounterKey {
    stat_type: StatType,
    detail: DetailType,
    dir: Direction,
}

impl CounterKey {
    fn new(stat_type: StatType, detail: DetailType, dir: Direction) -> Self {
        Self {
            stat_type,
            detail,
            dir,
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct SamplerKey {
    sample: Sample,
}

impl SamplerKey {
    fn new(sample: Sample) -> Self {
        Self { sample }
    }
}

struct StatMutables {
    /// Sorted by key, so that all details of a type are adjacent
    counters: BTreeMap<CounterKey, CounterEntry>,
    samplers: BTreeMap<SamplerKey, SamplerEntry>,

    /// Time of last clear() call
    timestamp: Instant,
}

impl StatMutables {
    fn log_counters(&self) {
        for (key, entry) in &self.counters {
            debug!(
                stat_type = key.stat_type.as_str(),
                detail = key.detail.as_str(),
                dir = key.dir.as_str(),
                value = u64::from(entry),
                "Stat counter"
            );
        }
    }

    fn log_samples(&self) {
        for (key, entry) in &self.samplers {
            let values = entry.collect();
            debug!(
                sample = key.sample.as_str(),
                count = values.len(),
                min = entry.expected_min_max.0,
                max = entry.expected_min_max.1,
                ?values,
                "Stat samples"
            );
        }
    }
}

struct CounterEntry(AtomicU64);

impl CounterEntry {
    fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    fn add(&self, value: u64) {
        self.0.fetch_add(value, std::sync::atomic::Ordering::SeqCst);
    }
}

impl From<&CounterEntry> for u64 {
    fn from(value: &CounterEntry) -> Self {
        value.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

struct SamplerEntry {
    samples: Mutex<BoundedVecDeque<i64>>,
    expected_min_max: (i64, i64),
}

impl SamplerEntry {
    fn new(max_samples: usize, expected_min_max: (i64, i64)) -> Self {
        Self {
            samples: Mutex::new(BoundedVecDeque::new(max_samples)),
            expected_min_max,
        }
    }

    fn add(&self, value: i64) {
        self.samples.lock().unwrap().push_back(value);
    }

    fn collect(&self) -> Vec<i64> {
        let mut guard = self.samples.lock().unwrap();
        guard.drain(..).collect()
    }
}

struct StatsLoop {
    mutables: Arc<RwLock<StatMutables>>,
    condition: Condvar,
    loop_state: Mutex<StatsLoopState>,
    config: StatsConfig,
}

impl StatsLoop {
    fn run(&self) {
        info!("Stats logging started");
        let mut guard = self.loop_state.lock().unwrap();
        while !guard.stopped {
            guard = self
                .condition
                .wait_timeout_while(guard, Duration::from_secs(1), |g| !g.stopped)
                .unwrap()
                .0;

            if !guard.stopped {
                self.run_one(&mut guard);
            }
        }
        info!("Stats logging stopped");
    }

    fn run_one(&self, lock: &mut StatsLoopState) {
        let stats = self.mutables.read().unwrap();

        if !self.config.log_counters_interval.is_zero()
            && lock.log_last_count_writeout.elapsed() > self.config.log_counters_interval
        {
            stats.log_counters();
            lock.log_last_count_writeout = Instant::now();
        }

        if !self.config.log_samples_interval.is_zero()
            && lock.log_last_sample_writeout.elapsed() > self.config.log_samples_interval
        {
            stats.log_samples();
            lock.log_last_sample_writeout = Instant::now();
        }
    }
}

struct StatsLoopState {
    stopped: bool,
    log_last_count_writeout: Instant,
    log_last_sample_writeout: Instant,
}
