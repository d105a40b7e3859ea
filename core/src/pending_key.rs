use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Block, BlockHash,
};

/// This struct represents the data written into the pending (receivable) database table key
/// the receiving account and hash of the send block identify a pending db table entry
#[derive(Default, PartialEq, Eq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct PendingKey {
    pub receiving_account: Account,
    pub send_block_hash: BlockHash,
}

impl PendingKey {
    pub fn new(receiving_account: Account, send_block_hash: BlockHash) -> Self {
        Self {
            receiving_account,
            send_block_hash,
        }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut result = [0; 64];
        result[..32].copy_from_slice(self.receiving_account.as_bytes());
        result[32..].copy_from_slice(self.send_block_hash.as_bytes());
        result
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 64 {
            return None;
        }
        Some(Self::new(
            Account::from_slice(&bytes[..32])?,
            BlockHash::from_slice(&bytes[32..])?,
        ))
    }

    pub fn for_send_block(block: &Block) -> Self {
        Self::new(block.destination_or_link(), block.hash())
    }

    pub fn new_test_instance() -> Self {
        Self::new(Account::from(1), BlockHash::from(2))
    }
}

impl Serialize for PendingKey {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        self.receiving_account.serialize(writer);
        self.send_block_hash.serialize(writer);
    }
}

impl FixedSizeSerialize for PendingKey {
    fn serialized_size() -> usize {
        Account::serialized_size() + BlockHash::serialized_size()
    }
}

impl Deserialize for PendingKey {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self::Target> {
        let account = Account::deserialize(stream)?;
        let hash = BlockHash::deserialize(stream)?;
        Ok(Self {
            receiving_account: account,
            send_block_hash: hash,
        })
    }
}
