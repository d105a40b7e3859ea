use crate::{Account, PublicKey, Signature};
use anyhow::Context;
use ed25519_dalek_blake2b::{ExpandedSecretKey, SecretKey};
use std::sync::LazyLock;

static DEV_PRIVATE_KEY_DATA: &str =
    "34F0A37AAD20F4A260F0A5B3CB3D7FB50673212263E58A380BC10474BB039CE4";

/// The publicly known genesis key of the dev network.
/// Public key B0311EA55708D6A53C75CDBF88300259C6D018522FE3D4D0A242E431F9E8B6D0
pub static DEV_GENESIS_KEY: LazyLock<PrivateKey> = LazyLock::new(|| {
    PrivateKey::from_priv_key_hex(DEV_PRIVATE_KEY_DATA).expect("valid dev genesis key")
});

#[derive(Clone)]
pub struct PrivateKey {
    bytes: [u8; 32],
    public_key: PublicKey,
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::from_bytes(rand::random())
    }
}

impl PrivateKey {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn zero() -> Self {
        Self::from_bytes([0; 32])
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let public_key = PublicKey::from_bytes(
            ed25519_dalek_blake2b::PublicKey::from(&Self::secret(&bytes)).to_bytes(),
        );
        Self { bytes, public_key }
    }

    pub fn from_priv_key_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let input = s.as_ref();
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(input, &mut bytes)
            .with_context(|| format!("input string: '{}'", input))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn account(&self) -> Account {
        self.public_key.into()
    }

    pub fn sign(&self, data: &[u8]) -> Signature {
        let secret = Self::secret(&self.bytes);
        let public = ed25519_dalek_blake2b::PublicKey::from(&secret);
        let expanded = ExpandedSecretKey::from(&secret);
        Signature::from_bytes(expanded.sign(data, &public).to_bytes())
    }

    fn secret(bytes: &[u8; 32]) -> SecretKey {
        // a 32 byte slice is always a valid secret key
        SecretKey::from_bytes(bytes).expect("32 byte secret key")
    }
}

impl From<u64> for PrivateKey {
    fn from(value: u64) -> Self {
        let mut bytes = [0; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self::from_bytes(bytes)
    }
}

impl From<&PrivateKey> for Account {
    fn from(value: &PrivateKey) -> Self {
        value.account()
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(value: &PrivateKey) -> Self {
        value.public_key()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl PublicKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> anyhow::Result<()> {
        let public = ed25519_dalek_blake2b::PublicKey::from_bytes(self.as_bytes())
            .map_err(|_| anyhow!("could not extract public key"))?;
        let sig = ed25519_dalek_blake2b::Signature::try_from(&signature.as_bytes()[..])
            .map_err(|_| anyhow!("invalid signature bytes"))?;
        public
            .verify_strict(message, &sig)
            .map_err(|_| anyhow!("could not verify message"))?;
        Ok(())
    }

    pub fn as_account(&self) -> Account {
        (*self).into()
    }
}
