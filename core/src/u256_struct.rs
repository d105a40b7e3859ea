#[macro_export]
macro_rules! u256_struct {
    ($name:ident) => {
        #[derive(PartialEq, Eq, Clone, Copy, Hash, Default, PartialOrd, Ord)]
        pub struct $name([u8; 32]);

        #[allow(dead_code)]
        impl $name {
            pub const fn zero() -> Self {
                Self([0; 32])
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0; 32]
            }

            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                let bytes: [u8; 32] = bytes.try_into().ok()?;
                Some(Self(bytes))
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn random() -> Self {
                Self(rand::random())
            }

            pub fn number(&self) -> primitive_types::U256 {
                primitive_types::U256::from_big_endian(&self.0)
            }

            pub fn encode_hex(&self) -> String {
                let mut result = String::with_capacity(64);
                for byte in self.0 {
                    result.push_str(&format!("{:02X}", byte));
                }
                result
            }

            pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s.as_ref(), &mut bytes)
                    .map_err(|e| anyhow!("invalid hex '{}': {}", s.as_ref(), e))?;
                Ok(Self(bytes))
            }
        }

        impl $crate::utils::Serialize for $name {
            fn serialize(&self, writer: &mut dyn $crate::utils::BufferWriter) {
                writer.write_bytes_safe(&self.0);
            }
        }

        impl $crate::utils::FixedSizeSerialize for $name {
            fn serialized_size() -> usize {
                32
            }
        }

        impl $crate::utils::Deserialize for $name {
            type Target = Self;

            fn deserialize(stream: &mut dyn $crate::utils::Stream) -> anyhow::Result<Self> {
                let mut result = Self::zero();
                stream.read_bytes(&mut result.0, 32)?;
                Ok(result)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                let mut result = Self::zero();
                result.0[24..].copy_from_slice(&value.to_be_bytes());
                result
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::write_hex_bytes(&self.0, f)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::write_hex_bytes(&self.0, f)
            }
        }
    };
}

/// Serializes a 32 byte value as a 64 character upper case hex string
#[macro_export]
macro_rules! serialize_32_byte_string {
    ($name:ident) => {
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.encode_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                $name::decode_hex(value).map_err(serde::de::Error::custom)
            }
        }
    };
}
