use super::BlockSubType;
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Epoch,
};
use num_traits::FromPrimitive;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct BlockDetails {
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

impl BlockDetails {
    pub fn new(epoch: Epoch, is_send: bool, is_receive: bool, is_epoch: bool) -> Self {
        Self {
            epoch,
            is_send,
            is_receive,
            is_epoch,
        }
    }

    pub fn packed(&self) -> u8 {
        let mut result = self.epoch as u8;
        if self.is_send {
            result |= 0b1000_0000;
        }
        if self.is_receive {
            result |= 0b0100_0000;
        }
        if self.is_epoch {
            result |= 0b0010_0000;
        }

        result
    }

    pub fn unpack(value: u8) -> anyhow::Result<Self> {
        let epoch_mask = 0b0001_1111u8;
        let epoch_value = value & epoch_mask;
        let epoch = match FromPrimitive::from_u8(epoch_value) {
            Some(e) => e,
            None => bail!("unknown epoch value: {}", epoch_value),
        };

        Ok(BlockDetails {
            epoch,
            is_send: (0b1000_0000 & value) != 0,
            is_receive: (0b0100_0000 & value) != 0,
            is_epoch: (0b0010_0000 & value) != 0,
        })
    }

    pub fn subtype(&self) -> BlockSubType {
        if self.is_send {
            BlockSubType::Send
        } else if self.is_receive {
            BlockSubType::Receive
        } else if self.is_epoch {
            BlockSubType::Epoch
        } else {
            BlockSubType::Change
        }
    }
}

impl Serialize for BlockDetails {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        writer.write_u8_safe(self.packed())
    }
}

impl FixedSizeSerialize for BlockDetails {
    fn serialized_size() -> usize {
        1
    }
}

impl Deserialize for BlockDetails {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        BlockDetails::unpack(stream.read_u8()?)
    }
}
