use crate::blake2b;
use primitive_types::U512;

u256_struct!(Account);

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

impl Account {
    /// Account addresses look like `nano_` followed by 60 base32 characters.
    /// The first 52 characters encode the public key, the last 8 a blake2b checksum.
    pub fn encode_account(&self) -> String {
        let mut number = U512::from_big_endian(self.as_bytes());
        let check = U512::from_little_endian(&self.account_checksum());
        number <<= 40;
        number |= check;

        let mut result = String::with_capacity(65);
        for _ in 0..60 {
            let r = number.byte(0) & 0x1f;
            number >>= 5;
            result.push(ALPHABET[r as usize] as char);
        }
        result.push_str("_onan");
        result.chars().rev().collect()
    }

    pub fn decode_account(source: impl AsRef<str>) -> anyhow::Result<Account> {
        let source = source.as_ref();
        let prefix_len = if source.starts_with("nano_") || source.starts_with("nano-") {
            5
        } else if source.starts_with("xrb_") || source.starts_with("xrb-") {
            4
        } else {
            bail!("invalid account prefix");
        };

        if source.len() != prefix_len + 60 {
            bail!("invalid account length");
        }

        let encoded = &source.as_bytes()[prefix_len..];
        if encoded[0] != b'1' && encoded[0] != b'3' {
            bail!("invalid first account character");
        }

        let mut number = U512::zero();
        for &character in encoded {
            let value = ALPHABET
                .iter()
                .position(|&c| c == character)
                .ok_or_else(|| anyhow!("invalid account character '{}'", character as char))?;
            number <<= 5;
            number = number + U512::from(value as u8);
        }

        let mut bytes = [0u8; 64];
        (number >> 40).to_big_endian(&mut bytes);
        let account = Account::from_slice(&bytes[32..])
            .ok_or_else(|| anyhow!("invalid account bytes"))?;

        let mut check_bytes = [0u8; 8];
        check_bytes[..5].copy_from_slice(&account.account_checksum());
        let expected = u64::from_le_bytes(check_bytes);
        let actual = number.low_u64() & 0xff_ffff_ffff;
        if expected != actual {
            bail!("invalid account checksum");
        }

        Ok(account)
    }

    fn account_checksum(&self) -> [u8; 5] {
        blake2b::<5>(&[self.as_bytes()])
    }
}

impl serde::Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode_account())
    }
}

impl<'de> serde::Deserialize<'de> for Account {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Account::decode_account(value).map_err(serde::de::Error::custom)
    }
}
