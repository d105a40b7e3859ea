use super::{
    BlockBuilder, LegacyChangeBlockBuilder, LegacyOpenBlockBuilder, LegacyReceiveBlockBuilder,
    LegacySendBlockBuilder, StateBlockBuilder,
};
use crate::{
    epoch_v1_link, epoch_v2_link, Account, AccountInfo, Amount, Block, BlockDetails,
    BlockHash, BlockSideband, Epoch, Link, PrivateKey, PublicKey, SavedBlock, DEV_GENESIS_KEY,
};

/// A single account chain with sidebands, as the ledger would have saved it.
/// Used to set up ledger validation tests without a store.
#[derive(Clone)]
pub struct SavedAccountChain {
    key: PrivateKey,
    blocks: Vec<SavedBlock>,
    representative: PublicKey,
}

impl SavedAccountChain {
    pub const TIMESTAMP: u64 = 1_000_000;

    pub fn new() -> Self {
        Self::with_key(PrivateKey::new())
    }

    pub fn with_key(key: PrivateKey) -> Self {
        Self {
            key,
            blocks: Vec::new(),
            representative: PublicKey::zero(),
        }
    }

    pub fn new_opened_chain() -> Self {
        let mut chain = Self::new();
        chain.add_random_open_block();
        chain
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn account(&self) -> Account {
        self.key.account()
    }

    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    pub fn blocks(&self) -> &[SavedBlock] {
        &self.blocks
    }

    pub fn block(&self, height: u64) -> &SavedBlock {
        &self.blocks[height as usize - 1]
    }

    pub fn latest_block(&self) -> &SavedBlock {
        self.blocks.last().expect("chain is empty")
    }

    pub fn open(&self) -> BlockHash {
        self.blocks.first().map(|b| b.hash()).unwrap_or_default()
    }

    pub fn frontier(&self) -> BlockHash {
        self.blocks.last().map(|b| b.hash()).unwrap_or_default()
    }

    fn balance(&self) -> Amount {
        self.blocks.last().map(|b| b.balance()).unwrap_or_default()
    }

    fn epoch(&self) -> Epoch {
        self.blocks.last().map(|b| b.epoch()).unwrap_or(Epoch::Epoch0)
    }

    pub fn account_info(&self) -> AccountInfo {
        let latest = self.latest_block();
        AccountInfo {
            head: latest.hash(),
            representative: self.representative,
            open_block: self.open(),
            balance: latest.balance(),
            modified: latest.timestamp(),
            block_count: self.height(),
            epoch: latest.epoch(),
        }
    }

    /// Appends a block and derives its sideband from the chain
    pub fn add_block(&mut self, block: Block, source_epoch: Epoch) -> &SavedBlock {
        let previous_balance = self.balance();
        // legacy receives don't carry their balance, assume 1 raw was received
        let balance = match &block {
            Block::LegacyOpen(_) | Block::LegacyReceive(_) => previous_balance + Amount::raw(1),
            _ => block.balance_field().unwrap_or(previous_balance),
        };
        let epoch_link = block
            .link_field()
            .filter(|l| *l == epoch_v1_link() || *l == epoch_v2_link());
        let is_epoch = epoch_link.is_some() && balance == previous_balance;
        let is_send = balance < previous_balance;
        let is_receive = balance > previous_balance;

        let epoch = if is_epoch {
            if epoch_link == Some(epoch_v2_link()) {
                Epoch::Epoch2
            } else {
                Epoch::Epoch1
            }
        } else if is_receive {
            std::cmp::max(self.epoch(), source_epoch)
        } else {
            self.epoch()
        };

        let sideband = BlockSideband {
            height: self.height() + 1,
            timestamp: Self::TIMESTAMP + self.height(),
            successor: BlockHash::zero(),
            account: self.account(),
            balance,
            details: BlockDetails::new(epoch, is_send, is_receive, is_epoch),
            source_epoch: if is_receive { source_epoch } else { Epoch::Epoch0 },
        };

        if let Some(representative) = block.representative_field() {
            self.representative = representative;
        }

        let hash = block.hash();
        if let Some(previous) = self.blocks.last_mut() {
            let mut previous_sideband = previous.sideband().clone();
            previous_sideband.successor = hash;
            previous.set_sideband(previous_sideband);
        }
        self.blocks.push(SavedBlock::new(block, sideband));
        self.latest_block()
    }

    pub fn add_random_open_block(&mut self) -> &SavedBlock {
        let block = BlockBuilder::state()
            .key(&self.key)
            .previous(BlockHash::zero())
            .representative(PublicKey::from_bytes(rand::random()))
            .balance(Amount::raw(1000))
            .link(BlockHash::from_bytes(rand::random()))
            .build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_legacy_open(&mut self) -> &SavedBlock {
        let block = self.new_legacy_open_block().build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_legacy_change(&mut self, representative: impl Into<PublicKey>) -> &SavedBlock {
        let block = self
            .new_legacy_change_block()
            .representative(representative)
            .build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_legacy_send(&mut self) -> &SavedBlock {
        let block = self.new_legacy_send_block().build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_state(&mut self) -> &SavedBlock {
        let block = self.new_state_block().build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_epoch_v1(&mut self) -> &SavedBlock {
        let block = self.new_epoch1_block().build();
        self.add_block(block, Epoch::Epoch0)
    }

    pub fn add_epoch_v2(&mut self) -> &SavedBlock {
        let block = self.new_epoch2_block().build();
        self.add_block(block, Epoch::Epoch0)
    }

    /// A change block that keeps balance and representative
    pub fn new_state_block(&self) -> StateBlockBuilder {
        BlockBuilder::state()
            .key(&self.key)
            .previous(self.frontier())
            .representative(self.representative)
            .balance(self.balance())
            .link(Link::zero())
    }

    pub fn new_send_block(&self) -> StateBlockBuilder {
        self.new_state_block()
            .previous_balance(self.balance())
            .link(Account::from_bytes(rand::random()))
            .amount_sent(Amount::raw(1))
    }

    pub fn new_receive_block(&self) -> StateBlockBuilder {
        self.new_state_block()
            .previous_balance(self.balance())
            .link(BlockHash::from_bytes(rand::random()))
            .amount_received(Amount::raw(1))
    }

    pub fn new_open_block(&self) -> StateBlockBuilder {
        BlockBuilder::state()
            .key(&self.key)
            .previous(BlockHash::zero())
            .representative(PublicKey::from_bytes(rand::random()))
            .previous_balance(Amount::zero())
            .link(BlockHash::from_bytes(rand::random()))
            .amount_received(Amount::raw(1))
    }

    pub fn new_epoch1_block(&self) -> StateBlockBuilder {
        self.new_epoch_block(epoch_v1_link())
    }

    pub fn new_epoch2_block(&self) -> StateBlockBuilder {
        self.new_epoch_block(epoch_v2_link())
    }

    fn new_epoch_block(&self, link: Link) -> StateBlockBuilder {
        self.new_state_block()
            .key(&DEV_GENESIS_KEY)
            .account(self.account())
            .link(link)
    }

    pub fn new_legacy_open_block(&self) -> LegacyOpenBlockBuilder {
        BlockBuilder::legacy_open()
            .source(BlockHash::from_bytes(rand::random()))
            .representative(PublicKey::from_bytes(rand::random()))
            .sign(&self.key)
    }

    pub fn new_legacy_send_block(&self) -> LegacySendBlockBuilder {
        BlockBuilder::legacy_send()
            .previous(self.frontier())
            .previous_balance(self.balance())
            .destination(Account::from_bytes(rand::random()))
            .amount(Amount::raw(1))
            .sign(&self.key)
    }

    pub fn new_legacy_receive_block(&self) -> LegacyReceiveBlockBuilder {
        BlockBuilder::legacy_receive()
            .previous(self.frontier())
            .source(BlockHash::from_bytes(rand::random()))
            .sign(&self.key)
    }

    pub fn new_legacy_change_block(&self) -> LegacyChangeBlockBuilder {
        BlockBuilder::legacy_change()
            .previous(self.frontier())
            .representative(PublicKey::from_bytes(rand::random()))
            .sign(&self.key)
    }
}

impl Default for SavedAccountChain {
    fn default() -> Self {
        Self::new()
    }
}
