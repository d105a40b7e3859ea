use super::{BlockDetails, BlockType};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Amount, BlockHash, Epoch,
};
use num_traits::FromPrimitive;

/// Metadata the ledger attaches to a block when it is saved.
/// Only the fields that cannot be derived from the block itself are persisted.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlockSideband {
    pub height: u64,
    pub timestamp: u64,
    /// Successor to the current block
    pub successor: BlockHash,
    pub account: Account,
    pub balance: Amount,
    pub details: BlockDetails,
    pub source_epoch: Epoch,
}

impl BlockSideband {
    pub fn new(
        account: Account,
        successor: BlockHash,
        balance: Amount,
        height: u64,
        timestamp: u64,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> Self {
        Self {
            height,
            timestamp,
            successor,
            account,
            balance,
            details,
            source_epoch,
        }
    }

    pub fn serialized_size(block_type: BlockType) -> usize {
        let mut size = BlockHash::serialized_size(); // successor

        if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            size += Account::serialized_size(); // account
        }

        if block_type != BlockType::LegacyOpen {
            size += std::mem::size_of::<u64>(); // height
        }

        if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            size += Amount::serialized_size(); // balance
        }

        size += std::mem::size_of::<u64>(); // timestamp

        if block_type == BlockType::State {
            // block_details must not be larger than the epoch enum
            const_assert!(std::mem::size_of::<Epoch>() == 1);
            size += BlockDetails::serialized_size() + std::mem::size_of::<Epoch>();
        }

        size
    }

    pub fn serialize(&self, writer: &mut dyn BufferWriter, block_type: BlockType) {
        self.successor.serialize(writer);

        if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            self.account.serialize(writer);
        }

        if block_type != BlockType::LegacyOpen {
            writer.write_u64_be_safe(self.height);
        }

        if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            self.balance.serialize(writer);
        }

        writer.write_u64_be_safe(self.timestamp);

        if block_type == BlockType::State {
            self.details.serialize(writer);
            writer.write_u8_safe(self.source_epoch as u8);
        }
    }

    pub fn from_stream(stream: &mut dyn Stream, block_type: BlockType) -> anyhow::Result<Self> {
        let mut result = Self {
            height: 0,
            timestamp: 0,
            successor: BlockHash::zero(),
            account: Account::zero(),
            balance: Amount::zero(),
            details: BlockDetails::new(Epoch::Epoch0, false, false, false),
            source_epoch: Epoch::Epoch0,
        };
        result.deserialize(stream, block_type)?;
        Ok(result)
    }

    fn deserialize(&mut self, stream: &mut dyn Stream, block_type: BlockType) -> anyhow::Result<()> {
        self.successor = BlockHash::deserialize(stream)?;

        if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            self.account = Account::deserialize(stream)?;
        }

        let mut buffer = [0u8; 8];
        if block_type != BlockType::LegacyOpen {
            stream.read_bytes(&mut buffer, 8)?;
            self.height = u64::from_be_bytes(buffer);
        } else {
            self.height = 1;
        }

        if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            self.balance = Amount::deserialize(stream)?;
        }

        stream.read_bytes(&mut buffer, 8)?;
        self.timestamp = u64::from_be_bytes(buffer);

        if block_type == BlockType::State {
            self.details = BlockDetails::deserialize(stream)?;
            self.source_epoch = FromPrimitive::from_u8(stream.read_u8()?)
                .ok_or_else(|| anyhow!("invalid epoch value"))?;
        }

        Ok(())
    }

    pub fn new_test_instance() -> Self {
        Self {
            height: 42,
            timestamp: 1000,
            successor: BlockHash::from(3),
            account: Account::from(1),
            balance: Amount::raw(5),
            details: BlockDetails::new(Epoch::Epoch1, true, false, false),
            source_epoch: Epoch::Epoch0,
        }
    }
}
