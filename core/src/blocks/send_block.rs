use super::{Block, BlockType, LegacyBlock, LegacyPayload};
use crate::{
    amount::serde_hex,
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Amount, BlockHash, BlockHashBuilder, DependentBlocks, JsonBlock, Signature,
    WorkNonce,
};

/// Legacy send: the remaining balance after the send, not the amount sent
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SendPayload {
    pub previous: BlockHash,
    pub destination: Account,
    pub balance: Amount,
}

pub type SendBlock = LegacyBlock<SendPayload>;

impl SendBlock {
    pub fn destination(&self) -> &Account {
        &self.payload().destination
    }

    pub fn balance(&self) -> Amount {
        self.payload().balance
    }

    pub fn dependent_blocks(&self) -> DependentBlocks {
        DependentBlocks::new(self.payload().previous, BlockHash::zero())
    }
}

impl LegacyPayload for SendPayload {
    const BLOCK_TYPE: BlockType = BlockType::LegacySend;

    fn payload_size() -> usize {
        BlockHash::serialized_size() + Account::serialized_size() + Amount::serialized_size()
    }

    fn hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.previous.as_bytes())
            .update(self.destination.as_bytes())
            .update(self.balance.to_be_bytes())
            .build()
    }

    fn write(&self, writer: &mut dyn BufferWriter) {
        self.previous.serialize(writer);
        self.destination.serialize(writer);
        self.balance.serialize(writer);
    }

    fn read(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            previous: BlockHash::deserialize(stream)?,
            destination: Account::deserialize(stream)?,
            balance: Amount::deserialize(stream)?,
        })
    }

    fn to_json(&self, signature: Signature, work: WorkNonce) -> JsonBlock {
        JsonBlock::Send(JsonSendBlock {
            previous: self.previous,
            destination: self.destination,
            balance: self.balance,
            signature,
            work,
        })
    }

    fn wrap(block: SendBlock) -> Block {
        Block::LegacySend(block)
    }

    fn previous(&self) -> BlockHash {
        self.previous
    }

    fn balance(&self) -> Option<Amount> {
        Some(self.balance)
    }

    fn destination(&self) -> Option<Account> {
        Some(self.destination)
    }
}

#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct JsonSendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    #[serde(with = "serde_hex")]
    pub balance: Amount,
    pub signature: Signature,
    pub work: WorkNonce,
}

impl From<JsonSendBlock> for SendBlock {
    fn from(value: JsonSendBlock) -> Self {
        let payload = SendPayload {
            previous: value.previous,
            destination: value.destination,
            balance: value.balance,
        };
        Self::from_parts(payload, value.signature, value.work.into())
    }
}
