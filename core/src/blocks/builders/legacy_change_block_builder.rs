use super::stub_work;
use crate::{Block, BlockHash, ChangeBlock, ChangePayload, PrivateKey, PublicKey};

pub struct LegacyChangeBlockBuilder {
    representative: Option<PublicKey>,
    previous: Option<BlockHash>,
    prv_key: Option<PrivateKey>,
    work: Option<u64>,
}

impl LegacyChangeBlockBuilder {
    pub fn new() -> Self {
        Self {
            representative: None,
            previous: None,
            prv_key: None,
            work: None,
        }
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn representative(mut self, representative: impl Into<PublicKey>) -> Self {
        self.representative = Some(representative.into());
        self
    }

    pub fn sign(mut self, keypair: &PrivateKey) -> Self {
        self.prv_key = Some(keypair.clone());
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Block {
        let previous = self.previous.unwrap_or(BlockHash::from(1));
        let prv_key = self.prv_key.unwrap_or_default();
        let representative = self.representative.unwrap_or(PublicKey::from(2));
        let work = self.work.unwrap_or_else(|| stub_work(previous.into()));
        let payload = ChangePayload {
            previous,
            representative,
        };
        ChangeBlock::sign(payload, &prv_key, work).into()
    }
}

impl Default for LegacyChangeBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
