use super::WorkPool;
use crate::Root;
use std::sync::LazyLock;

pub static STUB_WORK_POOL: LazyLock<StubWorkPool> = LazyLock::new(StubWorkPool::default);

/// The StubWorkPool assumes work == difficulty
pub struct StubWorkPool {
    base_difficulty: u64,
}

impl StubWorkPool {
    pub fn new(base_difficulty: u64) -> Self {
        Self { base_difficulty }
    }
}

impl Default for StubWorkPool {
    fn default() -> Self {
        // highest stub threshold, valid for every block kind
        Self::new(0xffc0000000000000)
    }
}

impl WorkPool for StubWorkPool {
    fn generate(&self, _root: Root, difficulty: u64) -> Option<u64> {
        Some(difficulty)
    }

    fn generate_dev2(&self, _root: Root) -> Option<u64> {
        Some(self.base_difficulty)
    }
}
