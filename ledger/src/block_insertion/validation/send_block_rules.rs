use super::BlockValidator;
use crate::BlockStatus;
use lattice_core::Block;

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_no_negative_amount_send(&self) -> Result<(), BlockStatus> {
        if let Block::LegacySend(send) = self.block {
            if send.balance() > self.previous_balance() {
                return Err(BlockStatus::NegativeSpend);
            }
        }
        Ok(())
    }
}
