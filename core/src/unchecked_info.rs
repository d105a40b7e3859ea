use super::BlockHash;
use crate::{utils::seconds_since_epoch, Block};

/// A block that could not be processed yet because a block it depends on is missing
#[derive(Clone, Debug)]
pub struct UncheckedInfo {
    pub block: Block,

    /// Seconds since posix epoch
    pub modified: u64,
}

impl UncheckedInfo {
    pub fn new(block: Block) -> Self {
        Self {
            block,
            modified: seconds_since_epoch(),
        }
    }
}

/// Unchecked entries are keyed by the missing dependency first,
/// so that all blocks waiting for one dependency can be found with a range scan
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UncheckedKey {
    pub dependency: BlockHash,
    pub hash: BlockHash,
}

impl UncheckedKey {
    pub fn new(dependency: BlockHash, hash: BlockHash) -> Self {
        Self { dependency, hash }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut result = [0; 64];
        result[..32].copy_from_slice(self.dependency.as_bytes());
        result[32..].copy_from_slice(self.hash.as_bytes());
        result
    }
}
