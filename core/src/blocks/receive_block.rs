use super::{Block, BlockType, LegacyBlock, LegacyPayload};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    BlockHash, BlockHashBuilder, DependentBlocks, JsonBlock, Signature, WorkNonce,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReceivePayload {
    pub previous: BlockHash,
    /// The legacy send being received
    pub source: BlockHash,
}

pub type ReceiveBlock = LegacyBlock<ReceivePayload>;

impl ReceiveBlock {
    pub fn source(&self) -> BlockHash {
        self.payload().source
    }

    pub fn dependent_blocks(&self) -> DependentBlocks {
        DependentBlocks::new(self.payload().previous, self.payload().source)
    }
}

impl LegacyPayload for ReceivePayload {
    const BLOCK_TYPE: BlockType = BlockType::LegacyReceive;

    fn payload_size() -> usize {
        2 * BlockHash::serialized_size()
    }

    fn hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.previous.as_bytes())
            .update(self.source.as_bytes())
            .build()
    }

    fn write(&self, writer: &mut dyn BufferWriter) {
        self.previous.serialize(writer);
        self.source.serialize(writer);
    }

    fn read(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            previous: BlockHash::deserialize(stream)?,
            source: BlockHash::deserialize(stream)?,
        })
    }

    fn to_json(&self, signature: Signature, work: WorkNonce) -> JsonBlock {
        JsonBlock::Receive(JsonReceiveBlock {
            previous: self.previous,
            source: self.source,
            signature,
            work,
        })
    }

    fn wrap(block: ReceiveBlock) -> Block {
        Block::LegacyReceive(block)
    }

    fn previous(&self) -> BlockHash {
        self.previous
    }

    fn source(&self) -> Option<BlockHash> {
        Some(self.source)
    }
}

#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct JsonReceiveBlock {
    pub previous: BlockHash,
    pub source: BlockHash,
    pub signature: Signature,
    pub work: WorkNonce,
}

impl From<JsonReceiveBlock> for ReceiveBlock {
    fn from(value: JsonReceiveBlock) -> Self {
        let payload = ReceivePayload {
            previous: value.previous,
            source: value.source,
        };
        Self::from_parts(payload, value.signature, value.work.into())
    }
}
