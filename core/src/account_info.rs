use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Amount, BlockHash, Epoch, PublicKey,
};
use num_traits::FromPrimitive;

/// Latest information about an account
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct AccountInfo {
    pub head: BlockHash,
    pub representative: PublicKey,
    pub open_block: BlockHash,
    pub balance: Amount,
    /// Seconds since posix epoch
    pub modified: u64,
    pub block_count: u64,
    pub epoch: Epoch,
}

impl AccountInfo {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::serialized_size());
        self.serialize(&mut buffer);
        buffer
    }

    pub fn new_test_instance() -> Self {
        Self {
            head: BlockHash::from(1),
            representative: PublicKey::from(2),
            open_block: BlockHash::from(3),
            balance: Amount::raw(42),
            modified: 4,
            block_count: 5,
            epoch: Epoch::Epoch2,
        }
    }
}

impl Serialize for AccountInfo {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        self.head.serialize(writer);
        self.representative.serialize(writer);
        self.open_block.serialize(writer);
        self.balance.serialize(writer);
        writer.write_u64_le_safe(self.modified);
        writer.write_u64_le_safe(self.block_count);
        writer.write_u8_safe(self.epoch as u8);
    }
}

impl FixedSizeSerialize for AccountInfo {
    fn serialized_size() -> usize {
        BlockHash::serialized_size() // head
            + PublicKey::serialized_size() // representative
            + BlockHash::serialized_size() // open_block
            + Amount::serialized_size()
            + std::mem::size_of::<u64>() // modified
            + std::mem::size_of::<u64>() // block_count
            + std::mem::size_of::<Epoch>()
    }
}

impl Deserialize for AccountInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            head: BlockHash::deserialize(stream)?,
            representative: PublicKey::deserialize(stream)?,
            open_block: BlockHash::deserialize(stream)?,
            balance: Amount::deserialize(stream)?,
            modified: stream.read_u64_le()?,
            block_count: stream.read_u64_le()?,
            epoch: FromPrimitive::from_u8(stream.read_u8()?)
                .ok_or_else(|| anyhow!("invalid epoch"))?,
        })
    }
}
