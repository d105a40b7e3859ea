use super::{Block, BlockType, LegacyBlock, LegacyPayload};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, BlockHash, BlockHashBuilder, DependentBlocks, JsonBlock, PublicKey, Root, Signature,
    WorkNonce,
};

/// First block of a legacy account chain. It has no previous block, so the account is its root.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpenPayload {
    pub source: BlockHash,
    pub representative: PublicKey,
    pub account: Account,
}

pub type OpenBlock = LegacyBlock<OpenPayload>;

impl OpenBlock {
    pub fn account(&self) -> Account {
        self.payload().account
    }

    pub fn source(&self) -> BlockHash {
        self.payload().source
    }

    pub fn representative(&self) -> PublicKey {
        self.payload().representative
    }

    /// The genesis open block receives nothing
    pub fn dependent_blocks(&self, genesis_account: &Account) -> DependentBlocks {
        if self.account() == *genesis_account {
            DependentBlocks::none()
        } else {
            DependentBlocks::new(self.source(), BlockHash::zero())
        }
    }
}

impl LegacyPayload for OpenPayload {
    const BLOCK_TYPE: BlockType = BlockType::LegacyOpen;

    fn payload_size() -> usize {
        BlockHash::serialized_size() + PublicKey::serialized_size() + Account::serialized_size()
    }

    fn hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.source.as_bytes())
            .update(self.representative.as_bytes())
            .update(self.account.as_bytes())
            .build()
    }

    fn write(&self, writer: &mut dyn BufferWriter) {
        self.source.serialize(writer);
        self.representative.serialize(writer);
        self.account.serialize(writer);
    }

    fn read(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            source: BlockHash::deserialize(stream)?,
            representative: PublicKey::deserialize(stream)?,
            account: Account::deserialize(stream)?,
        })
    }

    fn to_json(&self, signature: Signature, work: WorkNonce) -> JsonBlock {
        JsonBlock::Open(JsonOpenBlock {
            account: self.account,
            source: self.source,
            representative: self.representative.into(),
            signature,
            work,
        })
    }

    fn wrap(block: OpenBlock) -> Block {
        Block::LegacyOpen(block)
    }

    fn previous(&self) -> BlockHash {
        BlockHash::zero()
    }

    fn root(&self) -> Root {
        self.account.into()
    }

    fn account(&self) -> Option<Account> {
        Some(self.account)
    }

    fn source(&self) -> Option<BlockHash> {
        Some(self.source)
    }

    fn representative(&self) -> Option<PublicKey> {
        Some(self.representative)
    }

    fn may_follow(_block_type: BlockType) -> bool {
        false
    }
}

#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct JsonOpenBlock {
    pub account: Account,
    pub source: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: WorkNonce,
}

impl From<JsonOpenBlock> for OpenBlock {
    fn from(value: JsonOpenBlock) -> Self {
        let payload = OpenPayload {
            source: value.source,
            representative: value.representative.into(),
            account: value.account,
        };
        Self::from_parts(payload, value.signature, value.work.into())
    }
}
