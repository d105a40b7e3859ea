use super::stub_work;
use crate::{Block, BlockHash, PrivateKey, ReceiveBlock, ReceivePayload};

pub struct LegacyReceiveBlockBuilder {
    previous: Option<BlockHash>,
    source: Option<BlockHash>,
    key_pair: Option<PrivateKey>,
    work: Option<u64>,
}

impl LegacyReceiveBlockBuilder {
    pub fn new() -> Self {
        Self {
            previous: None,
            source: None,
            key_pair: None,
            work: None,
        }
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn source(mut self, source: BlockHash) -> Self {
        self.source = Some(source);
        self
    }

    pub fn sign(mut self, key_pair: &PrivateKey) -> Self {
        self.key_pair = Some(key_pair.clone());
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Block {
        let key_pair = self.key_pair.unwrap_or_default();
        let previous = self.previous.unwrap_or(BlockHash::from(1));
        let source = self.source.unwrap_or(BlockHash::from(2));
        let work = self.work.unwrap_or_else(|| stub_work(previous.into()));
        ReceiveBlock::sign(ReceivePayload { previous, source }, &key_pair, work).into()
    }
}

impl Default for LegacyReceiveBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
