use super::{ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock};
use num_traits::FromPrimitive;

/// Type byte that precedes a block on the wire and in the block table
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    LegacySend = 2,
    LegacyReceive = 3,
    LegacyOpen = 4,
    LegacyChange = 5,
    State = 6,
}

impl BlockType {
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            Self::LegacySend | Self::LegacyReceive | Self::LegacyOpen | Self::LegacyChange
        )
    }

    /// Size of a block of this type without its type byte. Zero if the type carries no block.
    pub fn serialized_size(&self) -> usize {
        match self {
            Self::LegacySend => SendBlock::serialized_size(),
            Self::LegacyReceive => ReceiveBlock::serialized_size(),
            Self::LegacyOpen => OpenBlock::serialized_size(),
            Self::LegacyChange => ChangeBlock::serialized_size(),
            Self::State => StateBlock::serialized_size(),
            Self::Invalid | Self::NotABlock => 0,
        }
    }
}

impl TryFrom<u8> for BlockType {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| anyhow!("unknown block type {value}"))
    }
}

/// What a saved block did to its account chain
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BlockSubType {
    Send,
    Receive,
    Open,
    Change,
    Epoch,
}

impl BlockSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Open => "open",
            Self::Change => "change",
            Self::Epoch => "epoch",
        }
    }
}

impl std::fmt::Display for BlockSubType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
