use super::LedgerContext;
use crate::{ledger_constants::LEDGER_CONSTANTS_STUB, Ledger};
use lattice_core::{
    Account, AccountInfo, Amount, Block, BlockBuilder, BlockHash, Epoch, LegacyChangeBlockBuilder,
    LegacyOpenBlockBuilder, LegacyReceiveBlockBuilder, LegacySendBlockBuilder, Link, PrivateKey,
    PublicKey, StateBlockBuilder, DEV_GENESIS_KEY,
};
use lattice_store::{Transaction, WriteTransaction};

/// Creates blocks for a single account, based on the current ledger state
pub(crate) struct AccountBlockFactory<'a> {
    pub key: PrivateKey,
    ledger: &'a Ledger,
}

impl<'a> AccountBlockFactory<'a> {
    pub(crate) fn new(ledger: &'a Ledger) -> Self {
        Self {
            key: PrivateKey::new(),
            ledger,
        }
    }

    pub(crate) fn genesis(ledger: &'a Ledger) -> Self {
        Self {
            key: DEV_GENESIS_KEY.clone(),
            ledger,
        }
    }

    pub(crate) fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub(crate) fn account(&self) -> Account {
        self.key.account()
    }

    pub(crate) fn info(&self, txn: &dyn Transaction) -> Option<AccountInfo> {
        self.ledger.account_info(txn, &self.account())
    }

    fn existing_info(&self, txn: &dyn Transaction) -> AccountInfo {
        self.info(txn).expect("account is not open")
    }

    pub(crate) fn legacy_open(&self, source: BlockHash) -> LegacyOpenBlockBuilder {
        BlockBuilder::legacy_open()
            .source(source)
            .representative(self.public_key())
            .sign(&self.key)
    }

    pub(crate) fn epoch_v1(&self, txn: &dyn Transaction) -> StateBlockBuilder {
        self.epoch(txn, Epoch::Epoch1)
    }

    pub(crate) fn epoch_v2(&self, txn: &dyn Transaction) -> StateBlockBuilder {
        self.epoch(txn, Epoch::Epoch2)
    }

    fn epoch(&self, txn: &dyn Transaction, epoch: Epoch) -> StateBlockBuilder {
        let info = self.existing_info(txn);
        BlockBuilder::state()
            .key(&DEV_GENESIS_KEY)
            .account(self.account())
            .previous(info.head)
            .representative(info.representative)
            .balance(info.balance)
            .link(epoch_link(epoch))
    }

    pub(crate) fn epoch_v1_open(&self) -> StateBlockBuilder {
        BlockBuilder::state()
            .key(&DEV_GENESIS_KEY)
            .account(self.account())
            .previous(BlockHash::zero())
            .representative(PublicKey::zero())
            .balance(Amount::zero())
            .link(epoch_link(Epoch::Epoch1))
    }

    pub(crate) fn legacy_change(&self, txn: &dyn Transaction) -> LegacyChangeBlockBuilder {
        let info = self.existing_info(txn);
        BlockBuilder::legacy_change()
            .previous(info.head)
            .representative(PublicKey::from(1))
            .sign(&self.key)
    }

    pub(crate) fn legacy_send(&self, txn: &dyn Transaction) -> LegacySendBlockBuilder {
        let info = self.existing_info(txn);
        BlockBuilder::legacy_send()
            .previous(info.head)
            .destination(Account::from(1))
            .previous_balance(info.balance)
            .amount(Amount::raw(1))
            .sign(&self.key)
    }

    pub(crate) fn legacy_receive(
        &self,
        txn: &dyn Transaction,
        send_hash: BlockHash,
    ) -> LegacyReceiveBlockBuilder {
        let receiver_info = self.existing_info(txn);
        BlockBuilder::legacy_receive()
            .previous(receiver_info.head)
            .source(send_hash)
            .sign(&self.key)
    }

    pub(crate) fn send(&self, txn: &dyn Transaction) -> StateBlockBuilder {
        let info = self.existing_info(txn);
        BlockBuilder::state()
            .key(&self.key)
            .previous(info.head)
            .previous_balance(info.balance)
            .representative(info.representative)
            .amount_sent(Amount::raw(50))
            .link(Account::from(1))
    }

    pub(crate) fn receive(&self, txn: &dyn Transaction, send_hash: BlockHash) -> StateBlockBuilder {
        let receiver_info = self.existing_info(txn);
        let amount_sent = self
            .ledger
            .any()
            .block_amount(txn, &send_hash)
            .expect("send block not found");
        BlockBuilder::state()
            .key(&self.key)
            .previous(receiver_info.head)
            .representative(receiver_info.representative)
            .balance(receiver_info.balance.wrapping_add(amount_sent))
            .link(send_hash)
    }

    pub(crate) fn change(&self, txn: &dyn Transaction) -> StateBlockBuilder {
        let info = self.existing_info(txn);
        BlockBuilder::state()
            .key(&self.key)
            .previous(info.head)
            .representative(PublicKey::from(1))
            .balance(info.balance)
            .link(Link::zero())
    }

    pub(crate) fn open(&self, txn: &dyn Transaction, send_hash: BlockHash) -> StateBlockBuilder {
        let amount_sent = self
            .ledger
            .any()
            .block_amount(txn, &send_hash)
            .expect("send block not found");
        BlockBuilder::state()
            .key(&self.key)
            .previous(BlockHash::zero())
            .representative(self.public_key())
            .balance(amount_sent)
            .link(send_hash)
    }
}

fn epoch_link(epoch: Epoch) -> Link {
    *LEDGER_CONSTANTS_STUB
        .epochs
        .link(epoch)
        .expect("epoch link not found")
}

pub(crate) struct LegacySendBlockResult<'a> {
    pub destination: AccountBlockFactory<'a>,
    pub send_block: Block,
    pub amount_sent: Amount,
}

pub(crate) fn setup_legacy_send_block<'a>(
    ctx: &'a LedgerContext,
    txn: &mut WriteTransaction,
) -> LegacySendBlockResult<'a> {
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();

    let amount_sent = Amount::raw(50);
    let send_block = genesis
        .legacy_send(txn)
        .destination(destination.account())
        .amount(amount_sent)
        .build();
    ctx.ledger.process(txn, &send_block).unwrap();
    LegacySendBlockResult {
        destination,
        send_block,
        amount_sent,
    }
}

pub(crate) struct LegacyOpenBlockResult<'a> {
    pub destination: AccountBlockFactory<'a>,
    pub send_block: Block,
    pub open_block: Block,
}

pub(crate) fn setup_legacy_open_block<'a>(
    ctx: &'a LedgerContext,
    txn: &mut WriteTransaction,
) -> LegacyOpenBlockResult<'a> {
    let send = setup_legacy_send_block(ctx, txn);

    let open_block = send.destination.legacy_open(send.send_block.hash()).build();
    ctx.ledger.process(txn, &open_block).unwrap();

    LegacyOpenBlockResult {
        destination: send.destination,
        send_block: send.send_block,
        open_block,
    }
}
