use super::{Block, BlockType, LegacyBlock, LegacyPayload};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, BlockHash, BlockHashBuilder, DependentBlocks, JsonBlock, PublicKey, Signature,
    WorkNonce,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChangePayload {
    pub previous: BlockHash,
    pub representative: PublicKey,
}

pub type ChangeBlock = LegacyBlock<ChangePayload>;

impl ChangeBlock {
    pub fn dependent_blocks(&self) -> DependentBlocks {
        DependentBlocks::new(self.payload().previous, BlockHash::zero())
    }
}

impl LegacyPayload for ChangePayload {
    const BLOCK_TYPE: BlockType = BlockType::LegacyChange;

    fn payload_size() -> usize {
        BlockHash::serialized_size() + PublicKey::serialized_size()
    }

    fn hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.previous.as_bytes())
            .update(self.representative.as_bytes())
            .build()
    }

    fn write(&self, writer: &mut dyn BufferWriter) {
        self.previous.serialize(writer);
        self.representative.serialize(writer);
    }

    fn read(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            previous: BlockHash::deserialize(stream)?,
            representative: PublicKey::deserialize(stream)?,
        })
    }

    fn to_json(&self, signature: Signature, work: WorkNonce) -> JsonBlock {
        JsonBlock::Change(JsonChangeBlock {
            previous: self.previous,
            representative: self.representative.into(),
            signature,
            work,
        })
    }

    fn wrap(block: ChangeBlock) -> Block {
        Block::LegacyChange(block)
    }

    fn previous(&self) -> BlockHash {
        self.previous
    }

    fn representative(&self) -> Option<PublicKey> {
        Some(self.representative)
    }
}

#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct JsonChangeBlock {
    pub previous: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: WorkNonce,
}

impl From<JsonChangeBlock> for ChangeBlock {
    fn from(value: JsonChangeBlock) -> Self {
        let payload = ChangePayload {
            previous: value.previous,
            representative: value.representative.into(),
        };
        Self::from_parts(payload, value.signature, value.work.into())
    }
}
