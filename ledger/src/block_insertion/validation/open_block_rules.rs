use super::BlockValidator;
use crate::BlockStatus;
use lattice_core::Block;

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_no_double_account_open(&self) -> Result<(), BlockStatus> {
        if self.block.is_open() && !self.is_new_account() {
            Err(BlockStatus::Fork)
        } else {
            Ok(())
        }
    }

    /// A state open block must receive something or be an epoch open
    pub(crate) fn ensure_open_block_has_link(&self) -> Result<(), BlockStatus> {
        if let Block::State(state) = self.block {
            if self.block.is_open() && state.link().is_zero() {
                return Err(BlockStatus::GapSource);
            }
        }
        Ok(())
    }
}
