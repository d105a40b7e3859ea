use super::BlockValidator;
use crate::{BlockStatus, SignatureVerification};
use lattice_core::PublicKey;

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_block_does_not_exist_yet(&self) -> Result<(), BlockStatus> {
        if self.block_exists {
            Err(BlockStatus::Old)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_valid_predecessor(&self) -> Result<(), BlockStatus> {
        if let Some(previous) = &self.previous_block {
            if !self.block.valid_predecessor(previous.block_type()) {
                return Err(BlockStatus::BlockPosition);
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_account_exists_for_none_open_block(&self) -> Result<(), BlockStatus> {
        if !self.block.is_open() && self.is_new_account() {
            Err(BlockStatus::GapPrevious)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_previous_block_exists(&self) -> Result<(), BlockStatus> {
        if !self.block.is_open() && self.previous_block.is_none() {
            Err(BlockStatus::GapPrevious)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_valid_signature(&self) -> Result<(), BlockStatus> {
        let already_verified = match self.verification {
            SignatureVerification::Valid => !self.is_epoch_block(),
            SignatureVerification::ValidEpoch => self.is_epoch_block(),
            SignatureVerification::Unknown | SignatureVerification::Invalid => false,
        };
        if already_verified {
            return Ok(());
        }

        let result = if self.is_epoch_block() {
            self.epochs.validate_epoch_signature(self.block)
        } else {
            PublicKey::from(self.account)
                .verify(self.block.hash().as_bytes(), self.block.block_signature())
        };
        result.map_err(|_| BlockStatus::BadSignature)
    }

    pub(crate) fn ensure_block_is_not_for_burn_account(&self) -> Result<(), BlockStatus> {
        if self.account == self.burn_account {
            Err(BlockStatus::OpenedBurnAccount)
        } else {
            Ok(())
        }
    }

    /// The previous block is known, so a differing head means somebody else
    /// already built on it
    pub(crate) fn ensure_previous_block_is_account_head(&self) -> Result<(), BlockStatus> {
        if let Some(info) = &self.old_account_info {
            if !self.block.is_open() && self.block.previous() != info.head {
                return Err(BlockStatus::Fork);
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_sufficient_work(&self) -> Result<(), BlockStatus> {
        if self.work.is_valid_pow(self.block, &self.block_details()) {
            Ok(())
        } else {
            Err(BlockStatus::InsufficientWork)
        }
    }
}
