mod block_details;
mod block_sideband;
mod block_type;
mod builders;
mod change_block;
mod dependent_blocks;
mod genesis;
mod json_block;
mod legacy_block;
mod open_block;
mod receive_block;
mod saved_block;
mod send_block;
mod state_block;

pub use block_details::BlockDetails;
pub use block_sideband::BlockSideband;
pub use block_type::{BlockSubType, BlockType};
pub use builders::*;
pub use change_block::{ChangeBlock, ChangePayload};
pub use dependent_blocks::DependentBlocks;
pub use genesis::{genesis_sideband, DEV_GENESIS_BLOCK};
pub use json_block::JsonBlock;
pub use legacy_block::{LegacyBlock, LegacyPayload};
pub use open_block::{OpenBlock, OpenPayload};
pub use receive_block::{ReceiveBlock, ReceivePayload};
pub use saved_block::SavedBlock;
pub use send_block::{SendBlock, SendPayload};
pub use state_block::{EpochBlockArgs, StateBlock, StateBlockArgs, StateHashables};

use crate::{
    utils::{BufferWriter, Stream},
    Account, Amount, BlockHash, BlockHashBuilder, FullHash, Link, PrivateKey, PublicKey,
    QualifiedRoot, Root, Signature,
};
use std::ops::{Deref, DerefMut};

/// Behaviour shared by every block kind.
///
/// The `*_field` accessors return what the block itself carries. Legacy blocks leave
/// some of these implicit, and a [`SavedBlock`] fills them in from its sideband.
pub trait BlockBase: FullHash {
    fn block_type(&self) -> BlockType;

    /// Cached hash, recomputed if the cache was invalidated
    fn hash(&self) -> BlockHash;
    /// Call after changing a hashed field
    fn invalidate_hash(&mut self);
    fn recompute_hash(&mut self);

    fn previous(&self) -> BlockHash;
    /// Previous block, or the account for the first block of a chain
    fn root(&self) -> Root;
    fn qualified_root(&self) -> QualifiedRoot {
        QualifiedRoot::new(self.root(), self.previous())
    }

    fn account_field(&self) -> Option<Account>;
    fn balance_field(&self) -> Option<Amount>;
    fn link_field(&self) -> Option<Link>;
    /// Received send of a legacy open or receive
    fn source_field(&self) -> Option<BlockHash>;
    fn representative_field(&self) -> Option<PublicKey>;
    fn destination_field(&self) -> Option<Account>;

    fn block_signature(&self) -> &Signature;
    fn set_block_signature(&mut self, signature: &Signature);
    fn work(&self) -> u64;
    fn set_work(&mut self, work: u64);

    /// Whether a block of this kind may be appended to a block of `block_type`
    fn valid_predecessor(&self, block_type: BlockType) -> bool;

    fn serialize_without_block_type(&self, writer: &mut dyn BufferWriter);
    fn json_representation(&self) -> JsonBlock;
    fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.json_representation())?)
    }
}

impl<T: BlockBase> FullHash for T {
    fn full_hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.hash().as_bytes())
            .update(self.block_signature().as_bytes())
            .update(self.work().to_ne_bytes())
            .build()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Block {
    LegacySend(SendBlock),
    LegacyReceive(ReceiveBlock),
    LegacyOpen(OpenBlock),
    LegacyChange(ChangeBlock),
    State(StateBlock),
}

macro_rules! for_each_kind {
    ($block:expr, $inner:ident => $body:expr) => {
        match $block {
            Block::LegacySend($inner) => $body,
            Block::LegacyReceive($inner) => $body,
            Block::LegacyOpen($inner) => $body,
            Block::LegacyChange($inner) => $body,
            Block::State($inner) => $body,
        }
    };
}

impl Block {
    pub fn new_test_instance() -> Self {
        Self::State(StateBlock::new_test_instance())
    }

    pub fn new_test_open() -> Self {
        Self::State(StateBlock::new_test_open())
    }

    pub fn new_test_instance_with_key(key: impl Into<PrivateKey>) -> Self {
        Self::State(StateBlock::new_test_instance_with_key(key.into()))
    }

    pub fn as_block(&self) -> &(dyn BlockBase + 'static) {
        for_each_kind!(self, block => block)
    }

    pub fn as_block_mut(&mut self) -> &mut (dyn BlockBase + 'static) {
        for_each_kind!(self, block => block)
    }

    pub fn is_legacy(&self) -> bool {
        self.block_type().is_legacy()
    }

    /// First block of an account chain
    pub fn is_open(&self) -> bool {
        match self {
            Block::LegacyOpen(_) => true,
            Block::State(_) => self.previous().is_zero(),
            _ => false,
        }
    }

    /// Only changes the representative
    pub fn is_change(&self) -> bool {
        self.link_field()
            .map_or(self.block_type() == BlockType::LegacyChange, |link| {
                link.is_zero()
            })
    }

    pub fn source_or_link(&self) -> BlockHash {
        match self.source_field() {
            Some(source) => source,
            None => self.link_field().unwrap_or_default().into(),
        }
    }

    pub fn destination_or_link(&self) -> Account {
        match self.destination_field() {
            Some(destination) => destination,
            None => self.link_field().unwrap_or_default().into(),
        }
    }

    /// Type byte followed by the block
    pub fn serialize(&self, writer: &mut dyn BufferWriter) {
        writer.write_u8_safe(self.block_type() as u8);
        self.serialize_without_block_type(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.block_type().serialized_size());
        self.serialize(&mut bytes);
        bytes
    }

    pub fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Block> {
        let block_type = BlockType::try_from(stream.read_u8()?)?;
        Self::deserialize_block_type(block_type, stream)
    }

    pub fn deserialize_block_type(
        block_type: BlockType,
        stream: &mut dyn Stream,
    ) -> anyhow::Result<Self> {
        fn legacy<P: LegacyPayload>(stream: &mut dyn Stream) -> anyhow::Result<Block> {
            Ok(LegacyBlock::<P>::deserialize(stream)?.into())
        }

        match block_type {
            BlockType::LegacySend => legacy::<SendPayload>(stream),
            BlockType::LegacyReceive => legacy::<ReceivePayload>(stream),
            BlockType::LegacyOpen => legacy::<OpenPayload>(stream),
            BlockType::LegacyChange => legacy::<ChangePayload>(stream),
            BlockType::State => Ok(Self::State(StateBlock::deserialize(stream)?)),
            BlockType::Invalid | BlockType::NotABlock => {
                bail!("block type {:?} carries no block", block_type)
            }
        }
    }
}

impl FullHash for Block {
    fn full_hash(&self) -> BlockHash {
        self.as_block().full_hash()
    }
}

impl Deref for Block {
    type Target = dyn BlockBase;

    fn deref(&self) -> &Self::Target {
        self.as_block()
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_block_mut()
    }
}
