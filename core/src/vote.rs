use crate::{
    blake2b,
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    Amount, BlockHash, BlockHashBuilder, FullHash, PrivateKey, PublicKey, Signature,
};
use anyhow::Result;
use std::time::Duration;

/// Signed assertion of a representative that the given blocks are the
/// correct successors for their roots
#[derive(Clone, Debug)]
pub struct Vote {
    /// Account that's voting
    pub voting_account: PublicKey,

    /// Signature of hash + timestamp
    pub signature: Signature,

    /// The timestamp in the upper 60 bits and the log2 duration in the lower 4 bits
    timestamp: u64,

    /// The hashes for which this vote directly covers
    pub hashes: Vec<BlockHash>,
}

static HASH_PREFIX: &str = "vote ";

impl Vote {
    /// Largest number of hashes a single vote may carry on the wire
    pub const MAX_HASHES: usize = 255;
    pub const FINAL_TIMESTAMP: u64 = u64::MAX;
    pub const TIMESTAMP_MAX: u64 = 0xffff_ffff_ffff_fff0;
    pub const TIMESTAMP_MIN: u64 = 0x0000_0000_0000_0010;
    pub const DURATION_MAX: u8 = 0x0f;
    const TIMESTAMP_MASK: u64 = 0xffff_ffff_ffff_fff0;

    pub fn null() -> Self {
        Self {
            voting_account: PublicKey::zero(),
            signature: Signature::new(),
            timestamp: 0,
            hashes: Vec::new(),
        }
    }

    /// `timestamp` is quantized to 16ms, `duration` is the log2 exponent of the vote duration
    pub fn new(key: &PrivateKey, timestamp: u64, duration: u8, hashes: Vec<BlockHash>) -> Self {
        debug_assert!(duration <= Self::DURATION_MAX);
        debug_assert!(hashes.len() <= Self::MAX_HASHES);
        let mut result = Self {
            voting_account: key.public_key(),
            signature: Signature::new(),
            timestamp: Self::packed_timestamp(timestamp, duration),
            hashes,
        };
        result.signature = key.sign(result.hash().as_bytes());
        result
    }

    /// Final votes can never be replaced
    pub fn new_final(key: &PrivateKey, hashes: Vec<BlockHash>) -> Self {
        Self::new(key, Self::TIMESTAMP_MAX, Self::DURATION_MAX, hashes)
    }

    pub fn new_test_instance() -> Self {
        let key = PrivateKey::from(42);
        Self::new(&key, 1, 2, vec![BlockHash::from(5)])
    }

    fn packed_timestamp(timestamp: u64, duration: u8) -> u64 {
        (timestamp & Self::TIMESTAMP_MASK) | (duration as u64)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn duration_bits(&self) -> u8 {
        // Duration field is specified in the 4 low-order bits of the timestamp.
        // This makes the timestamp have a minimum granularity of 16ms
        // The duration is specified as 2^(duration + 4) giving it a range of 16-524,288ms in power of two increments
        let result = self.timestamp & !Self::TIMESTAMP_MASK;
        result as u8
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(1 << (self.duration_bits() + 4))
    }

    pub fn is_final(&self) -> bool {
        self.timestamp == Self::FINAL_TIMESTAMP
    }

    pub fn hash(&self) -> BlockHash {
        let mut builder = BlockHashBuilder::new().update(HASH_PREFIX);
        for hash in &self.hashes {
            builder = builder.update(hash.as_bytes())
        }
        builder.update(self.timestamp.to_le_bytes()).build()
    }

    pub fn validate(&self) -> Result<()> {
        self.voting_account
            .verify(self.hash().as_bytes(), &self.signature)
    }

    pub fn serialized_size(count: usize) -> usize {
        PublicKey::serialized_size()
            + Signature::serialized_size()
            + std::mem::size_of::<u64>()
            + BlockHash::serialized_size() * count
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::serialized_size(self.hashes.len()));
        self.serialize(&mut buffer);
        buffer
    }

    /// Reads a vote with exactly `count` hashes
    pub fn deserialize_with_count(stream: &mut dyn Stream, count: usize) -> Result<Self> {
        if count > Self::MAX_HASHES {
            bail!("vote carries too many hashes: {}", count);
        }
        let voting_account = PublicKey::deserialize(stream)?;
        let signature = Signature::deserialize(stream)?;
        let timestamp = stream.read_u64_le()?;
        let mut hashes = Vec::with_capacity(count);
        for _ in 0..count {
            hashes.push(BlockHash::deserialize(stream)?);
        }
        Ok(Self {
            voting_account,
            signature,
            timestamp,
            hashes,
        })
    }
}

impl Serialize for Vote {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        self.voting_account.serialize(writer);
        self.signature.serialize(writer);
        writer.write_u64_le_safe(self.timestamp);
        for hash in &self.hashes {
            hash.serialize(writer);
        }
    }
}

impl Deserialize for Vote {
    type Target = Self;

    /// Reads hashes until the stream is exhausted
    fn deserialize(stream: &mut dyn Stream) -> Result<Self> {
        let header = Self::serialized_size(0);
        let available = stream.in_avail()?;
        if available < header || (available - header) % BlockHash::serialized_size() != 0 {
            bail!("invalid vote size: {}", available);
        }
        let count = (available - header) / BlockHash::serialized_size();
        Self::deserialize_with_count(stream, count)
    }
}

impl FullHash for Vote {
    fn full_hash(&self) -> BlockHash {
        BlockHash::from_bytes(blake2b::<32>(&[
            self.hash().as_bytes(),
            self.voting_account.as_bytes(),
            self.signature.as_bytes(),
        ]))
    }
}

impl PartialEq for Vote {
    fn eq(&self, other: &Self) -> bool {
        self.voting_account == other.voting_account
            && self.signature == other.signature
            && self.timestamp == other.timestamp
            && self.hashes == other.hashes
    }
}

impl Eq for Vote {}

#[derive(FromPrimitive, Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoteCode {
    /// Vote is not signed correctly
    Invalid,
    /// Vote does not have the highest timestamp, it's a replay
    Replay,
    /// Vote has the highest timestamp
    Vote,
    /// Unknown if replay or vote
    Indeterminate,
    /// Vote is valid, but got ingored (e.g. due to cooldown)
    Ignored,
}

impl VoteCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteCode::Vote => "vote",
            VoteCode::Replay => "replay",
            VoteCode::Indeterminate => "indeterminate",
            VoteCode::Ignored => "ignored",
            VoteCode::Invalid => "invalid",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoteSource {
    Live,
    Rebroadcast,
    Cache,
}

impl VoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteSource::Live => "live",
            VoteSource::Rebroadcast => "rebroadcast",
            VoteSource::Cache => "cache",
        }
    }
}

/// A vote as seen by an election, together with the voter's weight
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteWithWeightInfo {
    pub representative: PublicKey,
    pub timestamp: u64,
    pub hash: BlockHash,
    pub weight: Amount,
}
