use super::{Block, BlockBase, BlockType};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Amount, BlockHash, BlockHashBuilder, JsonBlock, Link, PrivateKey, PublicKey, Root,
    Signature, WorkNonce,
};
use anyhow::Result;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StateHashables {
    /// Account# / public key that operates this account
    /// Uses:
    /// Bulk signature validation in advance of further ledger processing
    /// Arranging uncomitted transactions by account
    pub account: Account,

    /// Previous transaction in this chain
    pub previous: BlockHash,

    /// Representative of this account
    pub representative: PublicKey,

    /// Current balance of this account
    /// Allows lookup of account balance simply by looking at the head block
    pub balance: Amount,

    /// Link field contains source block_hash if receiving, destination account if sending
    pub link: Link,
}

impl StateHashables {
    fn serialized_size() -> usize {
        Account::serialized_size()
            + BlockHash::serialized_size()
            + PublicKey::serialized_size()
            + Amount::serialized_size()
            + Link::serialized_size()
    }

    fn hash(&self) -> BlockHash {
        let mut preamble = [0u8; 32];
        preamble[31] = BlockType::State as u8;
        BlockHashBuilder::new()
            .update(preamble)
            .update(self.account.as_bytes())
            .update(self.previous.as_bytes())
            .update(self.representative.as_bytes())
            .update(self.balance.to_be_bytes())
            .update(self.link.as_bytes())
            .build()
    }
}

#[derive(Clone, Debug)]
pub struct StateBlock {
    work: u64,
    signature: Signature,
    hashables: StateHashables,
    hash: Option<BlockHash>,
}

impl StateBlock {
    pub fn new_test_instance() -> Self {
        let key = PrivateKey::from(42);
        Self::new_test_instance_with_key(key)
    }

    pub fn new_test_instance_with_key(key: PrivateKey) -> Self {
        StateBlockArgs {
            key: &key,
            previous: BlockHash::from(456),
            representative: PublicKey::from(789),
            balance: Amount::raw(420),
            link: Link::from(111),
            work: 69420,
        }
        .into()
    }

    pub fn new_test_open() -> Self {
        let key = PrivateKey::from(42);
        StateBlockArgs {
            key: &key,
            previous: BlockHash::zero(),
            representative: PublicKey::from(789),
            balance: Amount::raw(420),
            link: Link::from(111),
            work: 69420,
        }
        .into()
    }

    pub fn account(&self) -> Account {
        self.hashables.account
    }

    pub fn link(&self) -> Link {
        self.hashables.link
    }

    pub fn balance(&self) -> Amount {
        self.hashables.balance
    }

    pub fn representative(&self) -> PublicKey {
        self.hashables.representative
    }

    pub fn serialized_size() -> usize {
        StateHashables::serialized_size()
            + Signature::serialized_size()
            + std::mem::size_of::<u64>()
    }

    pub fn deserialize(stream: &mut dyn Stream) -> Result<Self> {
        let hashables = StateHashables {
            account: Account::deserialize(stream)?,
            previous: BlockHash::deserialize(stream)?,
            representative: PublicKey::deserialize(stream)?,
            balance: Amount::deserialize(stream)?,
            link: Link::deserialize(stream)?,
        };
        let signature = Signature::deserialize(stream)?;
        let work = stream.read_u64_be()?;
        let hash = Some(hashables.hash());
        Ok(Self {
            work,
            signature,
            hashables,
            hash,
        })
    }
}

impl PartialEq for StateBlock {
    fn eq(&self, other: &Self) -> bool {
        self.work == other.work
            && self.signature == other.signature
            && self.hashables == other.hashables
    }
}

impl Eq for StateBlock {}

impl BlockBase for StateBlock {
    fn block_type(&self) -> BlockType {
        BlockType::State
    }

    fn account_field(&self) -> Option<Account> {
        Some(self.hashables.account)
    }

    fn hash(&self) -> BlockHash {
        self.hash.unwrap_or_else(|| self.hashables.hash())
    }

    fn invalidate_hash(&mut self) {
        self.hash = None;
    }

    fn recompute_hash(&mut self) {
        self.hash = Some(self.hashables.hash());
    }

    fn link_field(&self) -> Option<Link> {
        Some(self.hashables.link)
    }

    fn block_signature(&self) -> &Signature {
        &self.signature
    }

    fn set_block_signature(&mut self, signature: &Signature) {
        self.signature = signature.clone();
    }

    fn set_work(&mut self, work: u64) {
        self.work = work;
    }

    fn work(&self) -> u64 {
        self.work
    }

    fn previous(&self) -> BlockHash {
        self.hashables.previous
    }

    fn serialize_without_block_type(&self, writer: &mut dyn BufferWriter) {
        self.hashables.account.serialize(writer);
        self.hashables.previous.serialize(writer);
        self.hashables.representative.serialize(writer);
        self.hashables.balance.serialize(writer);
        self.hashables.link.serialize(writer);
        self.signature.serialize(writer);
        writer.write_bytes_safe(&self.work.to_be_bytes());
    }

    fn root(&self) -> Root {
        if !self.previous().is_zero() {
            self.previous().into()
        } else {
            self.hashables.account.into()
        }
    }

    fn balance_field(&self) -> Option<Amount> {
        Some(self.hashables.balance)
    }

    fn source_field(&self) -> Option<BlockHash> {
        None
    }

    fn representative_field(&self) -> Option<PublicKey> {
        Some(self.hashables.representative)
    }

    fn valid_predecessor(&self, _block_type: BlockType) -> bool {
        true
    }

    fn destination_field(&self) -> Option<Account> {
        None
    }

    fn json_representation(&self) -> JsonBlock {
        JsonBlock::State(JsonStateBlock {
            account: self.hashables.account,
            previous: self.hashables.previous,
            representative: self.hashables.representative.into(),
            balance: self.hashables.balance,
            link: self.hashables.link,
            link_as_account: Some(self.hashables.link.into()),
            signature: self.signature.clone(),
            work: self.work.into(),
        })
    }
}

impl From<StateBlock> for Block {
    fn from(value: StateBlock) -> Self {
        Block::State(value)
    }
}

pub struct StateBlockArgs<'a> {
    pub key: &'a PrivateKey,
    pub previous: BlockHash,
    pub representative: PublicKey,
    pub balance: Amount,
    pub link: Link,
    pub work: u64,
}

impl<'a> From<StateBlockArgs<'a>> for StateBlock {
    fn from(value: StateBlockArgs<'a>) -> Self {
        let hashables = StateHashables {
            account: value.key.account(),
            previous: value.previous,
            representative: value.representative,
            balance: value.balance,
            link: value.link,
        };

        let hash = hashables.hash();
        let signature = value.key.sign(hash.as_bytes());

        Self {
            hashables,
            signature,
            hash: Some(hash),
            work: value.work,
        }
    }
}

impl<'a> From<StateBlockArgs<'a>> for Block {
    fn from(value: StateBlockArgs<'a>) -> Self {
        Block::State(value.into())
    }
}

/// Epoch blocks are signed by the epoch signer instead of the account owner
pub struct EpochBlockArgs<'a> {
    pub epoch_signer: &'a PrivateKey,
    pub account: Account,
    pub previous: BlockHash,
    pub representative: PublicKey,
    pub balance: Amount,
    pub link: Link,
    pub work: u64,
}

impl<'a> From<EpochBlockArgs<'a>> for StateBlock {
    fn from(value: EpochBlockArgs<'a>) -> Self {
        let hashables = StateHashables {
            account: value.account,
            previous: value.previous,
            representative: value.representative,
            balance: value.balance,
            link: value.link,
        };

        let hash = hashables.hash();
        let signature = value.epoch_signer.sign(hash.as_bytes());

        Self {
            hashables,
            signature,
            hash: Some(hash),
            work: value.work,
        }
    }
}

impl<'a> From<EpochBlockArgs<'a>> for Block {
    fn from(value: EpochBlockArgs<'a>) -> Self {
        Block::State(value.into())
    }
}

#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct JsonStateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: Amount,
    pub link: Link,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_as_account: Option<Account>,
    pub signature: Signature,
    pub work: WorkNonce,
}

impl From<JsonStateBlock> for StateBlock {
    fn from(value: JsonStateBlock) -> Self {
        let hashables = StateHashables {
            account: value.account,
            previous: value.previous,
            representative: value.representative.into(),
            balance: value.balance,
            link: value.link,
        };

        let hash = Some(hashables.hash());

        Self {
            work: value.work.into(),
            signature: value.signature,
            hashables,
            hash,
        }
    }
}
