use super::{Block, BlockBase, BlockType, JsonBlock};
use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Account, Amount, BlockHash, Link, PrivateKey, PublicKey, Root, Signature, WorkNonce,
};
use std::fmt::Debug;

/// The signed fields of one of the four pre-state block kinds.
///
/// A legacy block is always `payload | signature | work (little endian)` on the wire,
/// and its hash covers the payload only. The kinds differ in which fields the payload
/// carries, so everything field related is answered by the payload.
pub trait LegacyPayload: Clone + PartialEq + Eq + Debug {
    const BLOCK_TYPE: BlockType;

    fn payload_size() -> usize;
    fn hash(&self) -> BlockHash;
    fn write(&self, writer: &mut dyn BufferWriter);
    fn read(stream: &mut dyn Stream) -> anyhow::Result<Self>;
    fn to_json(&self, signature: Signature, work: WorkNonce) -> JsonBlock;
    fn wrap(block: LegacyBlock<Self>) -> Block;

    fn previous(&self) -> BlockHash;

    fn root(&self) -> Root {
        self.previous().into()
    }

    fn account(&self) -> Option<Account> {
        None
    }

    fn balance(&self) -> Option<Amount> {
        None
    }

    fn source(&self) -> Option<BlockHash> {
        None
    }

    fn representative(&self) -> Option<PublicKey> {
        None
    }

    fn destination(&self) -> Option<Account> {
        None
    }

    /// Legacy blocks can only be appended to a chain that has no state block yet
    fn may_follow(block_type: BlockType) -> bool {
        matches!(
            block_type,
            BlockType::LegacySend
                | BlockType::LegacyReceive
                | BlockType::LegacyOpen
                | BlockType::LegacyChange
        )
    }
}

#[derive(Clone, Debug)]
pub struct LegacyBlock<P> {
    payload: P,
    signature: Signature,
    work: u64,
    hash: Option<BlockHash>,
}

impl<P: LegacyPayload> LegacyBlock<P> {
    pub fn sign(payload: P, key: &PrivateKey, work: u64) -> Self {
        let hash = payload.hash();
        Self {
            signature: key.sign(hash.as_bytes()),
            payload,
            work,
            hash: Some(hash),
        }
    }

    pub fn from_parts(payload: P, signature: Signature, work: u64) -> Self {
        let hash = Some(payload.hash());
        Self {
            payload,
            signature,
            work,
            hash,
        }
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn serialized_size() -> usize {
        P::payload_size() + Signature::serialized_size() + std::mem::size_of::<u64>()
    }

    pub fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let payload = P::read(stream)?;
        let signature = Signature::deserialize(stream)?;
        let mut work = [0u8; 8];
        stream.read_bytes(&mut work, 8)?;
        Ok(Self::from_parts(payload, signature, u64::from_le_bytes(work)))
    }
}

impl<P: PartialEq> PartialEq for LegacyBlock<P> {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
            && self.signature == other.signature
            && self.work == other.work
    }
}

impl<P: Eq> Eq for LegacyBlock<P> {}

impl<P: LegacyPayload> From<LegacyBlock<P>> for Block {
    fn from(value: LegacyBlock<P>) -> Self {
        P::wrap(value)
    }
}

impl<P: LegacyPayload> BlockBase for LegacyBlock<P> {
    fn block_type(&self) -> BlockType {
        P::BLOCK_TYPE
    }

    fn account_field(&self) -> Option<Account> {
        self.payload.account()
    }

    fn hash(&self) -> BlockHash {
        self.hash.unwrap_or_else(|| self.payload.hash())
    }

    fn invalidate_hash(&mut self) {
        self.hash = None;
    }

    fn recompute_hash(&mut self) {
        self.hash = Some(self.payload.hash());
    }

    fn link_field(&self) -> Option<Link> {
        None
    }

    fn block_signature(&self) -> &Signature {
        &self.signature
    }

    fn set_block_signature(&mut self, signature: &Signature) {
        self.signature = signature.clone();
    }

    fn work(&self) -> u64 {
        self.work
    }

    fn set_work(&mut self, work: u64) {
        self.work = work;
    }

    fn previous(&self) -> BlockHash {
        self.payload.previous()
    }

    fn serialize_without_block_type(&self, writer: &mut dyn BufferWriter) {
        self.payload.write(writer);
        self.signature.serialize(writer);
        writer.write_bytes_safe(&self.work.to_le_bytes());
    }

    fn json_representation(&self) -> JsonBlock {
        self.payload
            .to_json(self.signature.clone(), self.work.into())
    }

    fn root(&self) -> Root {
        self.payload.root()
    }

    fn balance_field(&self) -> Option<Amount> {
        self.payload.balance()
    }

    fn source_field(&self) -> Option<BlockHash> {
        self.payload.source()
    }

    fn representative_field(&self) -> Option<PublicKey> {
        self.payload.representative()
    }

    fn destination_field(&self) -> Option<Account> {
        self.payload.destination()
    }

    fn valid_predecessor(&self, block_type: BlockType) -> bool {
        P::may_follow(block_type)
    }
}
