use crate::utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Default for Signature {
    fn default() -> Self {
        Self { bytes: [0; 64] }
    }
}

impl Signature {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    pub fn make_invalid(&mut self) {
        self.bytes[31] ^= 1;
    }

    pub fn encode_hex(&self) -> String {
        let mut result = String::with_capacity(128);
        for byte in self.bytes {
            result.push_str(&format!("{:02X}", byte));
        }
        result
    }

    pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(s.as_ref(), &mut bytes)?;
        Ok(Signature::from_bytes(bytes))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::write_hex_bytes(&self.bytes, f)
    }
}

impl Serialize for Signature {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        writer.write_bytes_safe(&self.bytes)
    }
}

impl FixedSizeSerialize for Signature {
    fn serialized_size() -> usize {
        64
    }
}

impl Deserialize for Signature {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Signature> {
        let mut result = Signature::new();
        stream.read_bytes(&mut result.bytes, 64)?;
        Ok(result)
    }
}

impl serde::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Signature::decode_hex(value).map_err(serde::de::Error::custom)
    }
}
