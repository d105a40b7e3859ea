use crate::{blake2b, Root};

pub trait Difficulty: Send + Sync {
    fn get_difficulty(&self, root: &Root, work: u64) -> u64;
    fn clone_box(&self) -> Box<dyn Difficulty>;
}

impl Clone for Box<dyn Difficulty> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Proof of work difficulty: blake2b with an 8 byte digest over work (little endian) and root
#[derive(Default, Clone)]
pub struct DifficultyV1 {}

impl DifficultyV1 {
    pub fn to_multiplier(difficulty: u64, base_difficulty: u64) -> f64 {
        debug_assert!(difficulty > 0);
        base_difficulty.wrapping_neg() as f64 / difficulty.wrapping_neg() as f64
    }

    pub fn from_multiplier(multiplier: f64, base_difficulty: u64) -> u64 {
        debug_assert!(multiplier > 0f64);
        let reverse_difficulty: u128 =
            ((base_difficulty.wrapping_neg() as f64) / multiplier) as u128;
        if reverse_difficulty > u64::MAX as u128 {
            0
        } else if reverse_difficulty != 0 || base_difficulty == 0 || multiplier < 1f64 {
            (reverse_difficulty as u64).wrapping_neg()
        } else {
            u64::MAX
        }
    }
}

impl Difficulty for DifficultyV1 {
    fn get_difficulty(&self, root: &Root, work: u64) -> u64 {
        let digest = blake2b::<8>(&[&work.to_le_bytes(), root.as_bytes()]);
        u64::from_le_bytes(digest)
    }

    fn clone_box(&self) -> Box<dyn Difficulty> {
        Box::new(self.clone())
    }
}

/// Treats the work value itself as its difficulty, so tests can pick any difficulty they need
#[derive(Default, Clone)]
pub struct StubDifficulty {}

impl StubDifficulty {
    pub fn new() -> Self {
        Self {}
    }
}

impl Difficulty for StubDifficulty {
    fn get_difficulty(&self, _root: &Root, work: u64) -> u64 {
        work
    }

    fn clone_box(&self) -> Box<dyn Difficulty> {
        Box::new(self.clone())
    }
}
