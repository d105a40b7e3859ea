use crate::{Transaction, WriteTransaction};
use lattice_core::{
    utils::{BufferReader, Deserialize},
    BlockHash, SavedBlock,
};
use lattice_output_tracker::{OutputListenerMt, OutputTrackerMt};
use std::sync::Arc;
use tracing::error;

/// Blocks are stored in their binary form, followed by the sideband
pub struct BlockStore {
    put_listener: OutputListenerMt<SavedBlock>,
}

impl BlockStore {
    pub(crate) fn new() -> Self {
        Self {
            put_listener: OutputListenerMt::new(),
        }
    }

    pub fn track_puts(&self) -> Arc<OutputTrackerMt<SavedBlock>> {
        self.put_listener.track()
    }

    /// Saves the block and links its predecessor to it
    pub fn put(&self, txn: &mut WriteTransaction, block: &SavedBlock) {
        self.put_listener.emit(block.clone());
        let hash = block.hash();
        debug_assert!(block
            .successor()
            .map(|s| self.exists(txn, &s))
            .unwrap_or(true));

        self.raw_put(txn, &hash, block.serialize_with_sideband());

        let previous = block.previous();
        if !previous.is_zero() {
            self.set_successor(txn, &previous, hash);
        }
    }

    pub fn get(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        let bytes = txn.tables().blocks.get(hash)?;
        let mut reader = BufferReader::new(bytes);
        match SavedBlock::deserialize(&mut reader) {
            Ok(block) => Some(block),
            Err(e) => {
                error!(%hash, "could not deserialize stored block: {:?}", e);
                None
            }
        }
    }

    pub fn exists(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        txn.tables().blocks.contains_key(hash)
    }

    pub fn successor(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<BlockHash> {
        self.get(txn, hash).and_then(|b| b.successor())
    }

    pub fn successor_clear(&self, txn: &mut WriteTransaction, hash: &BlockHash) {
        self.set_successor(txn, hash, BlockHash::zero());
    }

    pub fn del(&self, txn: &mut WriteTransaction, hash: &BlockHash) {
        txn.tables_mut().blocks_mut().remove(hash);
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        txn.tables().blocks.len() as u64
    }

    pub fn iter<'txn>(
        &'txn self,
        txn: &'txn dyn Transaction,
    ) -> impl Iterator<Item = SavedBlock> + 'txn {
        let hashes = txn.tables().blocks.keys();
        hashes.filter_map(move |hash| self.get(txn, hash))
    }

    fn set_successor(&self, txn: &mut WriteTransaction, hash: &BlockHash, successor: BlockHash) {
        let Some(mut block) = self.get(txn, hash) else {
            error!(%hash, "cannot update successor of missing block");
            return;
        };
        let mut sideband = block.sideband().clone();
        sideband.successor = successor;
        block.set_sideband(sideband);
        self.raw_put(txn, hash, block.serialize_with_sideband());
    }

    fn raw_put(&self, txn: &mut WriteTransaction, hash: &BlockHash, data: Vec<u8>) {
        txn.tables_mut().blocks_mut().insert(*hash, data);
    }
}
