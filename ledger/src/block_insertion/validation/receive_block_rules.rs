use super::BlockValidator;
use crate::BlockStatus;
use lattice_core::{Block, Epoch};

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_no_receive_balance_change_without_link(&self) -> Result<(), BlockStatus> {
        if let Block::State(state) = self.block {
            if !self.is_send()
                && !self.is_epoch_block()
                && state.link().is_zero()
                && state.balance() != self.previous_balance()
            {
                return Err(BlockStatus::BalanceMismatch);
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_pending_receive_is_correct(&self) -> Result<(), BlockStatus> {
        if !self.is_receive() {
            return Ok(());
        }

        if !self.source_block_exists {
            return Err(BlockStatus::GapSource);
        }

        let Some(pending) = &self.pending_receive_info else {
            return Err(BlockStatus::Unreceivable);
        };

        match self.block {
            Block::LegacyOpen(_) | Block::LegacyReceive(_) => {
                // Legacy blocks can't receive upgraded sends
                if pending.epoch != Epoch::Epoch0 {
                    return Err(BlockStatus::Unreceivable);
                }
            }
            _ => {
                if self.amount_received() != pending.amount {
                    return Err(BlockStatus::BalanceMismatch);
                }
            }
        }
        Ok(())
    }
}
