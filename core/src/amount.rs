use crate::utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream};
use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub, SubAssign},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

pub const GXRB_RATIO: u128 = 1000000000000000000000000000000000; // 10^33
pub const MXRB_RATIO: u128 = 1000000000000000000000000000000; // 10^30

impl Amount {
    pub const MAX: Amount = Amount(u128::MAX);

    pub const fn raw(value: u128) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn nano(value: u128) -> Self {
        Self(value * MXRB_RATIO)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn number(&self) -> u128 {
        self.0
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn encode_hex(&self) -> String {
        format!("{:032X}", self.0)
    }

    pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let value = u128::from_str_radix(s.as_ref(), 16)?;
        Ok(Self(value))
    }

    pub fn decode_dec(s: impl AsRef<str>) -> anyhow::Result<Self> {
        Ok(Self(s.as_ref().parse::<u128>()?))
    }

    pub fn to_string_dec(self) -> String {
        self.0.to_string()
    }

    pub fn checked_add(&self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(&self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn wrapping_add(&self, rhs: Amount) -> Amount {
        Amount(self.0.wrapping_add(rhs.0))
    }

    pub fn wrapping_sub(&self, rhs: Amount) -> Amount {
        Amount(self.0.wrapping_sub(rhs.0))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |a, b| a.wrapping_add(b))
    }
}

impl std::fmt::Debug for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        writer.write_bytes_safe(&self.0.to_be_bytes())
    }
}

impl FixedSizeSerialize for Amount {
    fn serialized_size() -> usize {
        std::mem::size_of::<u128>()
    }
}

impl Deserialize for Amount {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let mut buffer = [0u8; 16];
        stream.read_bytes(&mut buffer, 16)?;
        Ok(Amount::from_be_bytes(buffer))
    }
}

/// Amounts are decimal strings in JSON
impl serde::Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_dec())
    }
}

impl<'de> serde::Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Amount::decode_dec(value).map_err(serde::de::Error::custom)
    }
}

/// Legacy send blocks write their balance as 32 hex digits
pub(crate) mod serde_hex {
    use super::Amount;
    use serde::Deserialize;

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&amount.encode_hex())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Amount::decode_hex(value).map_err(serde::de::Error::custom)
    }
}
