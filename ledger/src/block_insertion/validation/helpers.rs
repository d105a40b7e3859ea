use super::BlockValidator;
use lattice_core::{
    AccountInfo, Amount, Block, BlockDetails, BlockHash, BlockSideband, Epoch,
    PendingInfo, PendingKey, PublicKey,
};

impl<'a> BlockValidator<'a> {
    pub(crate) fn is_new_account(&self) -> bool {
        self.old_account_info.is_none()
    }

    pub(crate) fn previous_balance(&self) -> Amount {
        self.old_account_info
            .as_ref()
            .map(|i| i.balance)
            .unwrap_or_default()
    }

    pub(crate) fn account_epoch(&self) -> Epoch {
        self.old_account_info
            .as_ref()
            .map(|i| i.epoch)
            .unwrap_or(Epoch::Epoch0)
    }

    pub(crate) fn old_representative(&self) -> PublicKey {
        self.old_account_info
            .as_ref()
            .map(|i| i.representative)
            .unwrap_or_default()
    }

    /// A state block with an epoch link that keeps the balance.
    /// Sends to an account that happens to equal an epoch link are plain sends.
    pub(crate) fn is_epoch_block(&self) -> bool {
        match self.block {
            Block::State(state) => {
                self.epochs.is_epoch_link(&state.link())
                    && state.balance() == self.previous_balance()
            }
            _ => false,
        }
    }

    pub(crate) fn is_send(&self) -> bool {
        match self.block {
            Block::LegacySend(_) => true,
            Block::State(state) => state.balance() < self.previous_balance(),
            _ => false,
        }
    }

    pub(crate) fn is_receive(&self) -> bool {
        match self.block {
            Block::LegacyOpen(_) | Block::LegacyReceive(_) => true,
            Block::State(state) => {
                !self.is_send() && !self.is_epoch_block() && !state.link().is_zero()
            }
            _ => false,
        }
    }

    pub(crate) fn source_hash(&self) -> BlockHash {
        self.block.source_or_link()
    }

    pub(crate) fn amount_received(&self) -> Amount {
        match self.block {
            Block::LegacyOpen(_) | Block::LegacyReceive(_) => self
                .pending_receive_info
                .as_ref()
                .map(|i| i.amount)
                .unwrap_or_default(),
            Block::State(state) => state
                .balance()
                .checked_sub(self.previous_balance())
                .unwrap_or_default(),
            _ => Amount::zero(),
        }
    }

    pub(crate) fn amount_sent(&self) -> Amount {
        if self.is_send() {
            self.previous_balance()
                .checked_sub(self.new_balance())
                .unwrap_or_default()
        } else {
            Amount::zero()
        }
    }

    pub(crate) fn new_balance(&self) -> Amount {
        match self.block {
            Block::LegacySend(_) | Block::State(_) => {
                self.block.balance_field().unwrap_or_default()
            }
            Block::LegacyOpen(_) | Block::LegacyReceive(_) => self
                .previous_balance()
                .wrapping_add(self.amount_received()),
            Block::LegacyChange(_) => self.previous_balance(),
        }
    }

    pub(crate) fn new_representative(&self) -> PublicKey {
        self.block
            .representative_field()
            .unwrap_or_else(|| self.old_representative())
    }

    pub(crate) fn new_epoch(&self) -> Epoch {
        if self.is_epoch_block() {
            self.block_epoch_version()
        } else if self.is_receive() {
            std::cmp::max(self.account_epoch(), self.source_epoch())
        } else {
            self.account_epoch()
        }
    }

    pub(crate) fn block_epoch_version(&self) -> Epoch {
        self.block
            .link_field()
            .and_then(|link| self.epochs.epoch(&link))
            .unwrap_or(Epoch::Invalid)
    }

    pub(crate) fn source_epoch(&self) -> Epoch {
        if self.is_receive() {
            self.pending_receive_info
                .as_ref()
                .map(|i| i.epoch)
                .unwrap_or(Epoch::Epoch0)
        } else {
            Epoch::Epoch0
        }
    }

    pub(crate) fn block_details(&self) -> BlockDetails {
        BlockDetails::new(
            self.new_epoch(),
            self.is_send(),
            self.is_receive(),
            self.is_epoch_block(),
        )
    }

    pub(crate) fn new_sideband(&self) -> BlockSideband {
        BlockSideband {
            height: self.old_account_info.as_ref().map(|i| i.block_count).unwrap_or(0) + 1,
            timestamp: self.seconds_since_epoch,
            successor: BlockHash::zero(),
            account: self.account,
            balance: self.new_balance(),
            details: self.block_details(),
            source_epoch: self.source_epoch(),
        }
    }

    pub(crate) fn new_account_info(&self) -> AccountInfo {
        let hash = self.block.hash();
        AccountInfo {
            head: hash,
            representative: self.new_representative(),
            open_block: self
                .old_account_info
                .as_ref()
                .map(|i| i.open_block)
                .unwrap_or(hash),
            balance: self.new_balance(),
            modified: self.seconds_since_epoch,
            block_count: self.old_account_info.as_ref().map(|i| i.block_count).unwrap_or(0) + 1,
            epoch: self.new_epoch(),
        }
    }

    pub(crate) fn delete_received_pending_info(&self) -> Option<PendingKey> {
        if self.is_receive() {
            Some(PendingKey::new(self.account, self.source_hash()))
        } else {
            None
        }
    }

    pub(crate) fn new_pending_info(&self) -> Option<(PendingKey, PendingInfo)> {
        if self.is_send() {
            Some((
                PendingKey::new(self.block.destination_or_link(), self.block.hash()),
                PendingInfo::new(self.account, self.amount_sent(), self.new_epoch()),
            ))
        } else {
            None
        }
    }
}
