use crate::BlockHash;

/// The blocks that must be in the ledger before a block can be cemented:
/// its previous block and, for receives, the send it receives.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DependentBlocks {
    previous: Option<BlockHash>,
    link: Option<BlockHash>,
}

impl DependentBlocks {
    /// Zero hashes are no dependency
    pub fn new(previous: BlockHash, link: BlockHash) -> Self {
        let non_zero = |hash: BlockHash| (!hash.is_zero()).then_some(hash);
        Self {
            previous: non_zero(previous),
            link: non_zero(link),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<BlockHash> {
        self.previous
    }

    pub fn link(&self) -> Option<BlockHash> {
        self.link
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockHash> {
        self.previous.iter().chain(self.link.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hashes_are_skipped() {
        let dependents = DependentBlocks::new(BlockHash::zero(), BlockHash::from(4));
        assert_eq!(dependents.previous(), None);
        assert_eq!(dependents.link(), Some(BlockHash::from(4)));
        assert_eq!(dependents.iter().copied().collect::<Vec<_>>(), [BlockHash::from(4)]);
        assert_eq!(
            DependentBlocks::new(BlockHash::zero(), BlockHash::zero()),
            DependentBlocks::none()
        );
    }
}
