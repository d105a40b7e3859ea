use super::{Block, BlockDetails, BlockSideband, BlockSubType, BlockType, DependentBlocks};
use crate::{
    utils::{Deserialize, MemoryStream, Stream},
    Account, Amount, BlockHash, Epoch, Epochs,
};
use std::ops::Deref;

/// A block together with the sideband the ledger attached when it was saved.
///
/// Most accessors prefer what the block itself carries and fall back to the
/// sideband, which holds what a legacy block leaves implicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedBlock {
    block: Block,
    sideband: BlockSideband,
}

impl SavedBlock {
    pub fn new(block: Block, sideband: BlockSideband) -> Self {
        Self { block, sideband }
    }

    pub fn new_test_instance() -> Self {
        let block = Block::new_test_instance();
        let sideband = BlockSideband::new(
            block.account_field().unwrap_or_default(),
            BlockHash::zero(),
            block.balance_field().unwrap_or_default(),
            2,
            222222,
            BlockDetails::new(Epoch::Epoch2, true, false, false),
            Epoch::Epoch0,
        );
        Self::new(block, sideband)
    }

    pub fn sideband(&self) -> &BlockSideband {
        &self.sideband
    }

    pub fn set_sideband(&mut self, sideband: BlockSideband) {
        self.sideband = sideband;
    }

    pub fn details(&self) -> &BlockDetails {
        &self.sideband.details
    }

    pub fn account(&self) -> Account {
        self.account_field().unwrap_or(self.sideband.account)
    }

    pub fn balance(&self) -> Amount {
        self.balance_field().unwrap_or(self.sideband.balance)
    }

    pub fn height(&self) -> u64 {
        self.sideband.height
    }

    pub fn timestamp(&self) -> u64 {
        self.sideband.timestamp
    }

    pub fn successor(&self) -> Option<BlockHash> {
        let successor = self.sideband.successor;
        (!successor.is_zero()).then_some(successor)
    }

    pub fn epoch(&self) -> Epoch {
        self.sideband.details.epoch
    }

    pub fn source_epoch(&self) -> Epoch {
        self.sideband.source_epoch
    }

    pub fn is_epoch(&self) -> bool {
        self.sideband.details.is_epoch
    }

    pub fn is_receive(&self) -> bool {
        self.sideband.details.is_receive
    }

    pub fn is_send(&self) -> bool {
        self.destination().is_some()
    }

    /// Epoch opens keep their epoch subtype
    pub fn subtype(&self) -> BlockSubType {
        if self.is_open() && !self.is_epoch() {
            BlockSubType::Open
        } else {
            self.sideband.details.subtype()
        }
    }

    /// The send block this block receives
    pub fn source(&self) -> Option<BlockHash> {
        self.source_field().or_else(|| {
            self.link_field()
                .filter(|_| self.sideband.details.is_receive)
                .map(BlockHash::from)
        })
    }

    /// The account this block sends to
    pub fn destination(&self) -> Option<Account> {
        self.destination_field().or_else(|| {
            self.link_field()
                .filter(|_| self.sideband.details.is_send)
                .map(Account::from)
        })
    }

    /// Previous block plus the received send. The genesis open receives nothing.
    pub fn dependent_blocks(&self, epochs: &Epochs, genesis_account: &Account) -> DependentBlocks {
        let received = match self.link_field() {
            Some(link) if !self.is_send() && !epochs.is_epoch_link(&link) => link.into(),
            Some(_) => BlockHash::zero(),
            None if self.is_open() && self.account() == *genesis_account => BlockHash::zero(),
            None => self.source_field().unwrap_or_default(),
        };
        DependentBlocks::new(self.previous(), received)
    }

    pub fn serialize_with_sideband(&self) -> Vec<u8> {
        let mut stream = MemoryStream::new();
        self.block.serialize(&mut stream);
        self.sideband.serialize(&mut stream, self.block.block_type());
        stream.to_vec()
    }
}

impl Deref for SavedBlock {
    type Target = Block;

    fn deref(&self) -> &Self::Target {
        &self.block
    }
}

impl From<SavedBlock> for Block {
    fn from(value: SavedBlock) -> Self {
        value.block
    }
}

impl Deserialize for SavedBlock {
    type Target = Self;

    /// The stored sideband leaves out what the block carries, so it is filled in from the block
    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let block = Block::deserialize(stream)?;
        let block_type = block.block_type();
        let mut sideband = BlockSideband::from_stream(stream, block_type)?;

        if let Some(account) = block.account_field() {
            sideband.account = account;
        }
        if let Some(balance) = block.balance_field() {
            sideband.balance = balance;
        }
        if block_type.is_legacy() {
            sideband.details = BlockDetails::new(
                Epoch::Epoch0,
                block_type == BlockType::LegacySend,
                block.source_field().is_some(),
                false,
            );
        }

        Ok(Self::new(block, sideband))
    }
}
