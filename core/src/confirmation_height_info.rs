use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    BlockHash,
};

/// The highest cemented position of an account chain
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    pub frontier: BlockHash,
}

impl ConfirmationHeightInfo {
    pub fn new(height: u64, frontier: BlockHash) -> Self {
        Self { height, frontier }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::serialized_size());
        self.serialize(&mut buffer);
        buffer
    }
}

impl Serialize for ConfirmationHeightInfo {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        writer.write_u64_le_safe(self.height);
        self.frontier.serialize(writer);
    }
}

impl FixedSizeSerialize for ConfirmationHeightInfo {
    fn serialized_size() -> usize {
        std::mem::size_of::<u64>() + BlockHash::serialized_size()
    }
}

impl Deserialize for ConfirmationHeightInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let height = stream.read_u64_le()?;
        let frontier = BlockHash::deserialize(stream)?;
        Ok(Self { height, frontier })
    }
}
