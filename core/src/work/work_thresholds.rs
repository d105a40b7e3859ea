use crate::{Block, BlockDetails, Difficulty, DifficultyV1, Epoch, Root, StubDifficulty};
use std::{
    cmp::{max, min},
    sync::LazyLock,
};

pub static WORK_THRESHOLDS_STUB: LazyLock<WorkThresholds> =
    LazyLock::new(WorkThresholds::new_stub);

static PUBLISH_FULL: LazyLock<WorkThresholds> = LazyLock::new(|| {
    WorkThresholds::new(
        0xffffffc000000000,
        0xfffffff800000000, // 8x higher than epoch_1
        0xfffffe0000000000, // 8x lower than epoch_1
    )
});

static PUBLISH_DEV: LazyLock<WorkThresholds> = LazyLock::new(|| {
    WorkThresholds::new(
        0xfe00000000000000, // Very low for tests
        0xffc0000000000000, // 8x higher than epoch_1
        0xf000000000000000, // 8x lower than epoch_1
    )
});

#[derive(Clone)]
pub struct WorkThresholds {
    pub epoch_1: u64,
    pub epoch_2: u64,
    pub epoch_2_receive: u64,

    // Automatically calculated. The base threshold is the maximum of all thresholds and is used for all work multiplier calculations
    pub base: u64,

    // Automatically calculated. The entry threshold is the minimum of all thresholds and defines the required work to enter the node, but does not guarantee a block is processed
    pub entry: u64,
    difficulty: Box<dyn Difficulty>,
}

impl std::fmt::Debug for WorkThresholds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkThresholds")
            .field("epoch_1", &self.epoch_1)
            .field("epoch_2", &self.epoch_2)
            .field("epoch_2_receive", &self.epoch_2_receive)
            .finish()
    }
}

impl WorkThresholds {
    pub fn publish_full() -> &'static WorkThresholds {
        &PUBLISH_FULL
    }

    pub fn publish_dev() -> &'static WorkThresholds {
        &PUBLISH_DEV
    }

    pub fn new(epoch_1: u64, epoch_2: u64, epoch_2_receive: u64) -> Self {
        Self::with_difficulty(
            Box::<DifficultyV1>::default(),
            epoch_1,
            epoch_2,
            epoch_2_receive,
        )
    }

    pub fn new_stub() -> Self {
        WorkThresholds::with_difficulty(
            Box::new(StubDifficulty::new()),
            0xfe00000000000000, // Very low for tests
            0xffc0000000000000, // 8x higher than epoch_1
            0xf000000000000000, // 8x lower than epoch_1
        )
    }

    pub fn with_difficulty(
        difficulty: Box<dyn Difficulty>,
        epoch_1: u64,
        epoch_2: u64,
        epoch_2_receive: u64,
    ) -> Self {
        Self {
            epoch_1,
            epoch_2,
            epoch_2_receive,
            base: max(max(epoch_1, epoch_2), epoch_2_receive),
            entry: min(min(epoch_1, epoch_2), epoch_2_receive),
            difficulty,
        }
    }

    /// Required difficulty for a block with the given details.
    /// Epoch 2 raised the bar for sends and changes but lowered it for receives and epoch upgrades.
    pub fn threshold(&self, details: &BlockDetails) -> u64 {
        match details.epoch {
            Epoch::Epoch2 => {
                if details.is_receive || details.is_epoch {
                    self.epoch_2_receive
                } else {
                    self.epoch_2
                }
            }
            Epoch::Epoch1 | Epoch::Epoch0 => self.epoch_1,
            _ => {
                debug_assert!(
                    false,
                    "Invalid epoch specified to work_v1 ledger work_threshold"
                );
                u64::MAX
            }
        }
    }

    pub fn difficulty(&self, root: &Root, work: u64) -> u64 {
        self.difficulty.get_difficulty(root, work)
    }

    pub fn difficulty_block(&self, block: &Block) -> u64 {
        self.difficulty(&block.root(), block.work())
    }

    /// Cheap admission check before a block is queued for processing
    pub fn validate_entry_block(&self, block: &Block) -> bool {
        self.difficulty_block(block) >= self.entry
    }

    pub fn is_valid_pow(&self, block: &Block, details: &BlockDetails) -> bool {
        self.difficulty_block(block) >= self.threshold(details)
    }
}

impl Default for WorkThresholds {
    fn default() -> Self {
        PUBLISH_FULL.clone()
    }
}
