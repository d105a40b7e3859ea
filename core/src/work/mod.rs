mod stub_work_pool;
mod work_thresholds;

pub use stub_work_pool::{StubWorkPool, STUB_WORK_POOL};
pub use work_thresholds::{WorkThresholds, WORK_THRESHOLDS_STUB};

use crate::Root;

/// Source of proof of work values. Work generation itself is an external concern,
/// the node only needs values that satisfy a threshold check.
pub trait WorkPool: Send + Sync {
    fn generate(&self, root: Root, difficulty: u64) -> Option<u64>;
    fn generate_dev2(&self, root: Root) -> Option<u64>;
}
