use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Amount, Epoch,
};
use num_traits::FromPrimitive;

/// Information on an uncollected send
/// This struct captures the data stored in a pending table entry
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct PendingInfo {
    /// The account sending the funds
    pub source: Account,
    /// Amount receivable in this transaction
    pub amount: Amount,
    /// Epoch of sending block, this info is stored here to make it possible to prune the send block
    pub epoch: Epoch,
}

impl PendingInfo {
    pub fn new(source: Account, amount: Amount, epoch: Epoch) -> Self {
        Self {
            source,
            amount,
            epoch,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::serialized_size());
        self.serialize(&mut buffer);
        buffer
    }

    pub fn new_test_instance() -> Self {
        Self::new(Account::from(3), Amount::raw(4), Epoch::Epoch2)
    }
}

impl Serialize for PendingInfo {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        self.source.serialize(writer);
        self.amount.serialize(writer);
        writer.write_u8_safe(self.epoch as u8);
    }
}

impl FixedSizeSerialize for PendingInfo {
    fn serialized_size() -> usize {
        Account::serialized_size() + Amount::serialized_size() + 1
    }
}

impl Deserialize for PendingInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let source = Account::deserialize(stream)?;
        let amount = Amount::deserialize(stream)?;
        let epoch =
            FromPrimitive::from_u8(stream.read_u8()?).ok_or_else(|| anyhow!("invalid epoch"))?;
        Ok(Self {
            source,
            amount,
            epoch,
        })
    }
}
