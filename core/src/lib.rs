#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate static_assertions;

#[macro_use]
mod u256_struct;

mod account;
pub use account::Account;

mod amount;
pub use amount::{Amount, GXRB_RATIO, MXRB_RATIO};

mod block_hash;
pub use block_hash::{BlockHash, BlockHashBuilder};

mod private_key;
pub use private_key::{PrivateKey, DEV_GENESIS_KEY};

mod signature;
pub use signature::Signature;

mod qualified_root;
pub use qualified_root::QualifiedRoot;

mod account_info;
pub use account_info::AccountInfo;

mod networks;
pub use networks::Networks;

mod epoch;
pub use epoch::{epoch_v1_link, epoch_v2_link, Epoch, Epochs};

mod confirmation_height_info;
pub use confirmation_height_info::ConfirmationHeightInfo;

mod pending_key;
pub use pending_key::PendingKey;

mod pending_info;
pub use pending_info::PendingInfo;

mod difficulty;
pub use difficulty::{Difficulty, DifficultyV1, StubDifficulty};

mod blocks;
pub use blocks::*;

mod vote;
pub use vote::{Vote, VoteCode, VoteSource, VoteWithWeightInfo};

mod unchecked_info;
pub use unchecked_info::{UncheckedInfo, UncheckedKey};

pub mod utils;
pub mod work;

use blake2::{
    digest::{Update, VariableOutput},
    Blake2bVar,
};

u256_struct!(HashOrAccount);
serialize_32_byte_string!(HashOrAccount);
u256_struct!(Link);
u256_struct!(PublicKey);
serialize_32_byte_string!(PublicKey);
u256_struct!(Root);
serialize_32_byte_string!(Root);

pub fn write_hex_bytes(bytes: &[u8], f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
    for &byte in bytes {
        write!(f, "{:02X}", byte)?;
    }
    Ok(())
}

pub fn to_hex_string(i: u64) -> String {
    format!("{:016X}", i)
}

pub fn u64_from_hex_str(s: impl AsRef<str>) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(s.as_ref(), 16)
}

pub trait FullHash {
    fn full_hash(&self) -> BlockHash;
}

pub(crate) fn blake2b<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut result = [0u8; N];
    // N is always a valid blake2b output size (1..=64)
    let mut hasher = Blake2bVar::new(N).expect("valid blake2b output size");
    for part in parts {
        hasher.update(part);
    }
    hasher
        .finalize_variable(&mut result)
        .expect("output buffer matches hasher size");
    result
}

impl From<HashOrAccount> for Account {
    fn from(source: HashOrAccount) -> Self {
        Account::from_bytes(*source.as_bytes())
    }
}

impl From<Link> for Account {
    fn from(link: Link) -> Self {
        Account::from_bytes(*link.as_bytes())
    }
}

impl From<&Link> for Account {
    fn from(link: &Link) -> Self {
        Account::from_bytes(*link.as_bytes())
    }
}

impl From<Root> for Account {
    fn from(root: Root) -> Self {
        Account::from_bytes(*root.as_bytes())
    }
}

impl From<PublicKey> for Account {
    fn from(key: PublicKey) -> Self {
        Account::from_bytes(*key.as_bytes())
    }
}

impl From<&PublicKey> for Account {
    fn from(key: &PublicKey) -> Self {
        Account::from_bytes(*key.as_bytes())
    }
}

impl From<Account> for PublicKey {
    fn from(account: Account) -> Self {
        PublicKey::from_bytes(*account.as_bytes())
    }
}

impl From<&Account> for PublicKey {
    fn from(account: &Account) -> Self {
        PublicKey::from_bytes(*account.as_bytes())
    }
}

impl From<Account> for Link {
    fn from(account: Account) -> Self {
        Link::from_bytes(*account.as_bytes())
    }
}

impl From<&Account> for Link {
    fn from(account: &Account) -> Self {
        Link::from_bytes(*account.as_bytes())
    }
}

impl From<PublicKey> for Link {
    fn from(key: PublicKey) -> Self {
        Link::from_bytes(*key.as_bytes())
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Link::from_bytes(*hash.as_bytes())
    }
}

impl From<&BlockHash> for Link {
    fn from(hash: &BlockHash) -> Self {
        Link::from_bytes(*hash.as_bytes())
    }
}

impl From<HashOrAccount> for BlockHash {
    fn from(source: HashOrAccount) -> Self {
        BlockHash::from_bytes(*source.as_bytes())
    }
}

impl From<Link> for BlockHash {
    fn from(link: Link) -> Self {
        BlockHash::from_bytes(*link.as_bytes())
    }
}

impl From<&Link> for BlockHash {
    fn from(link: &Link) -> Self {
        BlockHash::from_bytes(*link.as_bytes())
    }
}

impl From<Root> for BlockHash {
    fn from(root: Root) -> Self {
        BlockHash::from_bytes(*root.as_bytes())
    }
}

impl From<Link> for HashOrAccount {
    fn from(link: Link) -> Self {
        HashOrAccount::from_bytes(*link.as_bytes())
    }
}

impl From<BlockHash> for HashOrAccount {
    fn from(hash: BlockHash) -> Self {
        HashOrAccount::from_bytes(*hash.as_bytes())
    }
}

impl From<Account> for HashOrAccount {
    fn from(account: Account) -> Self {
        HashOrAccount::from_bytes(*account.as_bytes())
    }
}

impl From<PublicKey> for Root {
    fn from(key: PublicKey) -> Self {
        Root::from_bytes(*key.as_bytes())
    }
}

impl From<Account> for Root {
    fn from(account: Account) -> Self {
        Root::from_bytes(*account.as_bytes())
    }
}

impl From<&Account> for Root {
    fn from(account: &Account) -> Self {
        Root::from_bytes(*account.as_bytes())
    }
}

impl From<BlockHash> for Root {
    fn from(hash: BlockHash) -> Self {
        Root::from_bytes(*hash.as_bytes())
    }
}

impl From<&BlockHash> for Root {
    fn from(hash: &BlockHash) -> Self {
        Root::from_bytes(*hash.as_bytes())
    }
}

impl Link {
    /// JSON link fields carry either a hash or an account address.
    /// Exactly 64 hex digits are read as hex, anything else must be an account address.
    pub fn decode_hex_or_account(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let s = s.as_ref();
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Link::decode_hex(s)
        } else {
            Account::decode_account(s)
                .map(Link::from)
                .map_err(|e| anyhow!("link is neither hex nor an account: {}", e))
        }
    }
}

impl serde::Serialize for Link {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Link {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Link::decode_hex_or_account(value).map_err(serde::de::Error::custom)
    }
}

/// 8 byte proof of work nonce, written as 16 hex digits in JSON
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct WorkNonce(u64);

impl From<u64> for WorkNonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<WorkNonce> for u64 {
    fn from(value: WorkNonce) -> Self {
        value.0
    }
}

impl serde::Serialize for WorkNonce {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&to_hex_string(self.0))
    }
}

impl<'de> serde::Deserialize<'de> for WorkNonce {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        u64_from_hex_str(&value)
            .map(WorkNonce)
            .map_err(serde::de::Error::custom)
    }
}
