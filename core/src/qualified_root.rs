use crate::{
    utils::{BufferWriter, Deserialize, FixedSizeSerialize, Serialize, Stream},
    BlockHash, Root,
};

/// Identifies the slot of an account chain that competing blocks fight over.
/// Forks share root and previous.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedRoot {
    pub root: Root,
    pub previous: BlockHash,
}

impl QualifiedRoot {
    pub fn new(root: Root, previous: BlockHash) -> Self {
        Self { root, previous }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut buffer = [0; 64];
        buffer[..32].copy_from_slice(self.root.as_bytes());
        buffer[32..].copy_from_slice(self.previous.as_bytes());
        buffer
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut root = [0; 32];
        let mut previous = [0; 32];
        root.copy_from_slice(&bytes[..32]);
        previous.copy_from_slice(&bytes[32..]);
        Self::new(Root::from_bytes(root), BlockHash::from_bytes(previous))
    }

    pub fn new_test_instance() -> Self {
        Self::new(Root::from(111), BlockHash::from(222))
    }
}

impl std::fmt::Debug for QualifiedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.root, self.previous)
    }
}

impl Serialize for QualifiedRoot {
    fn serialize(&self, writer: &mut dyn BufferWriter) {
        self.root.serialize(writer);
        self.previous.serialize(writer);
    }
}

impl FixedSizeSerialize for QualifiedRoot {
    fn serialized_size() -> usize {
        Root::serialized_size() + BlockHash::serialized_size()
    }
}

impl Deserialize for QualifiedRoot {
    type Target = Self;
    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<QualifiedRoot> {
        let root = Root::deserialize(stream)?;
        let previous = BlockHash::deserialize(stream)?;
        Ok(QualifiedRoot::new(root, previous))
    }
}
