use lattice_core::{
    Account, AccountInfo, BlockHash, ConfirmationHeightInfo, PendingInfo, PendingKey,
    QualifiedRoot,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Condvar, Mutex, RwLock},
    time::{Duration, Instant},
};

/// A consistent view of every table.
/// Tables are shared between snapshots until a writer modifies them.
#[derive(Clone, Default)]
pub struct Tables {
    pub(crate) accounts: Arc<BTreeMap<Account, AccountInfo>>,
    pub(crate) blocks: Arc<BTreeMap<BlockHash, Vec<u8>>>,
    pub(crate) frontiers: Arc<BTreeMap<BlockHash, Account>>,
    pub(crate) pending: Arc<BTreeMap<PendingKey, PendingInfo>>,
    pub(crate) confirmation_height: Arc<BTreeMap<Account, ConfirmationHeightInfo>>,
    pub(crate) pruned: Arc<BTreeSet<BlockHash>>,
    pub(crate) final_votes: Arc<BTreeMap<QualifiedRoot, BlockHash>>,
}

impl Tables {
    pub(crate) fn accounts_mut(&mut self) -> &mut BTreeMap<Account, AccountInfo> {
        Arc::make_mut(&mut self.accounts)
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut BTreeMap<BlockHash, Vec<u8>> {
        Arc::make_mut(&mut self.blocks)
    }

    pub(crate) fn frontiers_mut(&mut self) -> &mut BTreeMap<BlockHash, Account> {
        Arc::make_mut(&mut self.frontiers)
    }

    pub(crate) fn pending_mut(&mut self) -> &mut BTreeMap<PendingKey, PendingInfo> {
        Arc::make_mut(&mut self.pending)
    }

    pub(crate) fn confirmation_height_mut(
        &mut self,
    ) -> &mut BTreeMap<Account, ConfirmationHeightInfo> {
        Arc::make_mut(&mut self.confirmation_height)
    }

    pub(crate) fn pruned_mut(&mut self) -> &mut BTreeSet<BlockHash> {
        Arc::make_mut(&mut self.pruned)
    }

    pub(crate) fn final_votes_mut(&mut self) -> &mut BTreeMap<QualifiedRoot, BlockHash> {
        Arc::make_mut(&mut self.final_votes)
    }
}

/// Holds the committed snapshot and enforces a single writer at a time
pub struct StoreEnv {
    committed: RwLock<Arc<Tables>>,
    writer_active: Mutex<bool>,
    writer_released: Condvar,
}

impl StoreEnv {
    pub fn new() -> Self {
        Self {
            committed: RwLock::new(Arc::new(Tables::default())),
            writer_active: Mutex::new(false),
            writer_released: Condvar::new(),
        }
    }

    pub fn tx_begin_read(self: &Arc<Self>) -> ReadTransaction {
        ReadTransaction {
            env: Arc::clone(self),
            tables: self.snapshot(),
            start: Instant::now(),
        }
    }

    /// Blocks until no other write transaction is active
    pub fn tx_begin_write(self: &Arc<Self>) -> WriteTransaction {
        self.acquire_writer();
        WriteTransaction {
            env: Arc::clone(self),
            tables: (*self.snapshot()).clone(),
            active: true,
            start: Instant::now(),
        }
    }

    fn snapshot(&self) -> Arc<Tables> {
        self.committed.read().unwrap().clone()
    }

    fn publish(&self, tables: Tables) {
        *self.committed.write().unwrap() = Arc::new(tables);
    }

    fn acquire_writer(&self) {
        let guard = self.writer_active.lock().unwrap();
        let mut active = self
            .writer_released
            .wait_while(guard, |active| *active)
            .unwrap();
        *active = true;
    }

    fn release_writer(&self) {
        *self.writer_active.lock().unwrap() = false;
        self.writer_released.notify_one();
    }
}

impl Default for StoreEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Transaction {
    fn tables(&self) -> &Tables;
    fn elapsed(&self) -> Duration;
}

pub struct ReadTransaction {
    env: Arc<StoreEnv>,
    tables: Arc<Tables>,
    start: Instant,
}

impl ReadTransaction {
    /// Switches to the latest committed snapshot
    pub fn refresh(&mut self) {
        self.tables = self.env.snapshot();
        self.start = Instant::now();
    }

    pub fn refresh_if_needed(&mut self, max_age: Duration) -> bool {
        if self.start.elapsed() > max_age {
            self.refresh();
            true
        } else {
            false
        }
    }
}

impl Transaction for ReadTransaction {
    fn tables(&self) -> &Tables {
        &self.tables
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Exclusive write access. Changes become visible to new readers on commit.
/// Dropping an active transaction commits it.
pub struct WriteTransaction {
    env: Arc<StoreEnv>,
    tables: Tables,
    active: bool,
    start: Instant,
}

impl WriteTransaction {
    const MAX_AGE: Duration = Duration::from_millis(500);

    pub(crate) fn tables_mut(&mut self) -> &mut Tables {
        debug_assert!(self.active, "write transaction is not active");
        &mut self.tables
    }

    /// Publishes all changes and releases the writer lock
    pub fn commit(&mut self) {
        if self.active {
            self.env.publish(self.tables.clone());
            self.active = false;
            self.env.release_writer();
        }
    }

    /// Starts a new write transaction after a commit
    pub fn renew(&mut self) {
        if !self.active {
            self.env.acquire_writer();
            self.tables = (*self.env.snapshot()).clone();
            self.active = true;
            self.start = Instant::now();
        }
    }

    /// Commits and renews, so other writers get a chance to run
    pub fn refresh(&mut self) {
        self.commit();
        self.renew();
    }

    pub fn refresh_if_needed(&mut self) -> bool {
        if self.start.elapsed() > Self::MAX_AGE {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Transaction for WriteTransaction {
    fn tables(&self) -> &Tables {
        &self.tables
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::mpsc, thread};

    #[test]
    fn reader_keeps_its_snapshot() {
        let env = Arc::new(StoreEnv::new());
        let reader = env.tx_begin_read();
        let mut writer = env.tx_begin_write();
        writer.tables_mut().pruned_mut().insert(BlockHash::from(1));
        writer.commit();

        assert!(reader.tables().pruned.is_empty());
        assert_eq!(env.tx_begin_read().tables().pruned.len(), 1);
    }

    #[test]
    fn refresh_read_transaction() {
        let env = Arc::new(StoreEnv::new());
        let mut reader = env.tx_begin_read();
        {
            let mut writer = env.tx_begin_write();
            writer.tables_mut().pruned_mut().insert(BlockHash::from(1));
        }
        reader.refresh();
        assert!(reader.tables().pruned.contains(&BlockHash::from(1)));
    }

    #[test]
    fn writer_sees_own_changes() {
        let env = Arc::new(StoreEnv::new());
        let mut writer = env.tx_begin_write();
        writer.tables_mut().pruned_mut().insert(BlockHash::from(1));
        assert!(writer.tables().pruned.contains(&BlockHash::from(1)));
        assert!(env.tx_begin_read().tables().pruned.is_empty());
    }

    #[test]
    fn second_writer_waits_for_commit() {
        let env = Arc::new(StoreEnv::new());
        let mut writer = env.tx_begin_write();
        let (tx, rx) = mpsc::channel();

        let env2 = env.clone();
        let handle = thread::spawn(move || {
            let txn = env2.tx_begin_write();
            tx.send(txn.tables().pruned.len()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        writer.tables_mut().pruned_mut().insert(BlockHash::from(1));
        writer.commit();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        handle.join().unwrap();
    }

    #[test]
    fn renew_after_commit() {
        let env = Arc::new(StoreEnv::new());
        let mut writer = env.tx_begin_write();
        writer.commit();
        assert!(!writer.is_active());
        writer.renew();
        assert!(writer.is_active());
        writer.tables_mut().pruned_mut().insert(BlockHash::from(2));
        drop(writer);
        assert_eq!(env.tx_begin_read().tables().pruned.len(), 1);
    }
}
