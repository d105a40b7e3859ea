use super::BlockValidator;
use crate::BlockStatus;
use lattice_core::Epochs;

impl<'a> BlockValidator<'a> {
    /// An unopened account can only be opened by an epoch block if something is receivable
    pub(crate) fn epoch_block_pre_checks(&self) -> Result<(), BlockStatus> {
        if self.is_epoch_block() && self.is_new_account() {
            if !self.any_pending_exists {
                return Err(BlockStatus::GapEpochOpenPending);
            }
            if !self.new_representative().is_zero() {
                return Err(BlockStatus::RepresentativeMismatch);
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_valid_epoch_block(&self) -> Result<(), BlockStatus> {
        if !self.is_epoch_block() || self.is_new_account() {
            return Ok(());
        }

        if self.block.representative_field() != Some(self.old_representative()) {
            return Err(BlockStatus::RepresentativeMismatch);
        }

        if !Epochs::is_sequential(self.account_epoch(), self.block_epoch_version()) {
            return Err(BlockStatus::BlockPosition);
        }

        Ok(())
    }
}
