use super::stub_work;
use crate::{Block, BlockHash, OpenBlock, OpenPayload, PrivateKey, PublicKey};

pub struct LegacyOpenBlockBuilder {
    representative: Option<PublicKey>,
    source: Option<BlockHash>,
    prv_key: Option<PrivateKey>,
    work: Option<u64>,
}

impl LegacyOpenBlockBuilder {
    pub fn new() -> Self {
        Self {
            representative: None,
            source: None,
            prv_key: None,
            work: None,
        }
    }

    pub fn source(mut self, source: BlockHash) -> Self {
        self.source = Some(source);
        self
    }

    pub fn representative(mut self, representative: impl Into<PublicKey>) -> Self {
        self.representative = Some(representative.into());
        self
    }

    pub fn sign(mut self, prv_key: &PrivateKey) -> Self {
        self.prv_key = Some(prv_key.clone());
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Block {
        let source = self.source.unwrap_or(BlockHash::from(1));
        let prv_key = self.prv_key.unwrap_or_default();
        let representative = self.representative.unwrap_or(PublicKey::from(2));
        let work = self
            .work
            .unwrap_or_else(|| stub_work(prv_key.account().into()));

        let payload = OpenPayload {
            source,
            representative,
            account: prv_key.account(),
        };
        OpenBlock::sign(payload, &prv_key, work).into()
    }
}

impl Default for LegacyOpenBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
