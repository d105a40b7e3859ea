use super::LedgerContext;
use crate::{
    BlockStatus, SignatureVerification, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
    DEV_GENESIS_PUB_KEY,
};
use lattice_core::{
    Account, AccountInfo, Amount, BlockBuilder, BlockHash, BlockSubType, Epoch,
    PendingInfo, PendingKey, PrivateKey, PublicKey,
};
use lattice_store::Transaction;
use std::collections::HashMap;

#[test]
fn process_send() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = Account::from(1000);

    let send = genesis
        .send(&txn)
        .link(destination)
        .amount_sent(Amount::raw(100))
        .build();
    let saved = ctx.ledger.process(&mut txn, &send).unwrap();

    assert_eq!(saved.subtype(), BlockSubType::Send);
    assert_eq!(saved.account(), *DEV_GENESIS_ACCOUNT);
    assert_eq!(saved.balance(), Amount::MAX - Amount::raw(100));
    assert_eq!(
        ctx.ledger.any().block_amount(&txn, &send.hash()),
        Some(Amount::raw(100))
    );
    assert_eq!(
        ctx.ledger.any().block_successor(&txn, &DEV_GENESIS_HASH),
        Some(send.hash())
    );
    assert_eq!(
        ctx.ledger
            .any()
            .get_pending(&txn, &PendingKey::new(destination, send.hash())),
        Some(PendingInfo::new(
            *DEV_GENESIS_ACCOUNT,
            Amount::raw(100),
            Epoch::Epoch0
        ))
    );
}

#[test]
fn process_open_and_receive() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();

    let send1 = genesis
        .send(&txn)
        .link(destination.account())
        .amount_sent(Amount::raw(10))
        .build();
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis
        .send(&txn)
        .link(destination.account())
        .amount_sent(Amount::raw(20))
        .build();
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let open = destination.open(&txn, send1.hash()).build();
    let saved_open = ctx.ledger.process(&mut txn, &open).unwrap();
    let receive = destination.receive(&txn, send2.hash()).build();
    let saved_receive = ctx.ledger.process(&mut txn, &receive).unwrap();

    assert_eq!(saved_open.subtype(), BlockSubType::Open);
    assert_eq!(saved_receive.subtype(), BlockSubType::Receive);
    assert_eq!(saved_receive.height(), 2);
    let info = destination.info(&txn).unwrap();
    assert_eq!(info.balance, Amount::raw(30));
    assert_eq!(info.open_block, open.hash());
    assert_eq!(info.head, receive.hash());
    assert_eq!(ctx.ledger.weight(&destination.public_key()), Amount::raw(30));
    assert_eq!(ctx.ledger.account_count(), 2);
    assert!(!ctx
        .ledger
        .any()
        .receivable_exists(&txn, destination.account()));
}

#[test]
fn process_legacy_open_and_receive() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();

    let send1 = genesis
        .legacy_send(&txn)
        .destination(destination.account())
        .build();
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis
        .legacy_send(&txn)
        .destination(destination.account())
        .build();
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let open = destination.legacy_open(send1.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();
    let receive = destination.legacy_receive(&txn, send2.hash()).build();
    let saved = ctx.ledger.process(&mut txn, &receive).unwrap();

    assert_eq!(saved.balance(), Amount::raw(2));
    assert_eq!(ctx.ledger.weight(&destination.public_key()), Amount::raw(2));
    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &receive.hash()),
        Some(destination.account())
    );
}

#[test]
fn processing_a_block_twice_is_old() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let block_count = ctx.ledger.block_count();

    assert_eq!(ctx.ledger.process(&mut txn, &send), Err(BlockStatus::Old));
    assert_eq!(ctx.ledger.block_count(), block_count);
}

#[test]
fn second_block_with_same_previous_is_fork() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send1 = genesis.send(&txn).link(Account::from(1)).build();
    let send2 = genesis.send(&txn).link(Account::from(2)).build();

    ctx.ledger.process(&mut txn, &send1).unwrap();

    assert_eq!(ctx.ledger.process(&mut txn, &send2), Err(BlockStatus::Fork));
    assert_eq!(
        ctx.ledger.latest(&txn, &DEV_GENESIS_ACCOUNT),
        Some(send1.hash())
    );
}

#[test]
fn unknown_previous_is_gap_previous() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx
        .genesis_block_factory()
        .send(&txn)
        .previous(BlockHash::from(12345))
        .build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &send),
        Err(BlockStatus::GapPrevious)
    );
}

#[test]
fn unknown_source_is_gap_source() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let receive = BlockBuilder::state()
        .key(&PrivateKey::new())
        .previous(BlockHash::zero())
        .representative(PublicKey::from(1))
        .balance(Amount::raw(1))
        .link(BlockHash::from(999))
        .build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &receive),
        Err(BlockStatus::GapSource)
    );
}

#[test]
fn receiving_twice_is_unreceivable() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).link(genesis.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let receive = genesis.receive(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &receive).unwrap();

    let second_receive = genesis.receive(&txn, send.hash()).build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &second_receive),
        Err(BlockStatus::Unreceivable)
    );
}

#[test]
fn receive_with_wrong_amount_is_balance_mismatch() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).link(genesis.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let info = genesis.info(&txn).unwrap();

    let receive = genesis
        .receive(&txn, send.hash())
        .balance(info.balance + Amount::raw(1))
        .build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &receive),
        Err(BlockStatus::BalanceMismatch)
    );
}

#[test]
fn legacy_send_with_higher_balance_is_negative_spend() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.legacy_send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let invalid = genesis
        .legacy_send(&txn)
        .balance(Amount::MAX)
        .build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &invalid),
        Err(BlockStatus::NegativeSpend)
    );
}

#[test]
fn opening_the_burn_account_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).link(Account::zero()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let open = BlockBuilder::state()
        .key(&PrivateKey::new())
        .account(Account::zero())
        .previous(BlockHash::zero())
        .representative(PublicKey::from(1))
        .balance(Amount::raw(50))
        .link(send.hash())
        .build();

    let result = ctx.ledger.process(&mut txn, &open);
    assert!(matches!(
        result,
        Err(BlockStatus::BadSignature) | Err(BlockStatus::OpenedBurnAccount)
    ));
}

#[test]
fn wrong_signature_is_rejected() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).key(&PrivateKey::new()).account(genesis.account()).build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &send),
        Err(BlockStatus::BadSignature)
    );
}

/// Everything rollback has to restore
#[derive(PartialEq, Debug)]
struct LedgerSnapshot {
    accounts: Vec<(Account, AccountInfo)>,
    pending: Vec<(PendingKey, PendingInfo)>,
    weights: HashMap<PublicKey, Amount>,
    block_count: u64,
    account_count: u64,
}

fn snapshot(ctx: &LedgerContext, txn: &dyn Transaction) -> LedgerSnapshot {
    LedgerSnapshot {
        accounts: ctx
            .ledger
            .store
            .account
            .iter(txn)
            .map(|(a, i)| (*a, i.clone()))
            .collect(),
        pending: ctx
            .ledger
            .store
            .pending
            .iter(txn)
            .map(|(k, i)| (k.clone(), i.clone()))
            .collect(),
        weights: ctx.ledger.rep_weights.read().clone(),
        block_count: ctx.ledger.block_count(),
        account_count: ctx.ledger.account_count(),
    }
}

#[test]
fn rollback_restores_state_before_process() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();

    let before_send = snapshot(&ctx, &txn);
    let send = genesis
        .send(&txn)
        .link(destination.account())
        .amount_sent(Amount::raw(1000))
        .build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let before_open = snapshot(&ctx, &txn);
    let open = destination.open(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();

    let before_change = snapshot(&ctx, &txn);
    let change = destination
        .change(&txn)
        .representative(PublicKey::from(77))
        .build();
    ctx.ledger.process(&mut txn, &change).unwrap();

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();
    assert_eq!(snapshot(&ctx, &txn), before_change);

    ctx.ledger.rollback(&mut txn, &open.hash()).unwrap();
    assert_eq!(snapshot(&ctx, &txn), before_open);

    ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();
    assert_eq!(snapshot(&ctx, &txn), before_send);
    assert_eq!(
        ctx.ledger.latest(&txn, &DEV_GENESIS_ACCOUNT),
        Some(*DEV_GENESIS_HASH)
    );
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        Amount::MAX
    );
}

#[test]
fn rolled_back_block_can_be_processed_again() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();

    let saved = ctx.ledger.process(&mut txn, &send).unwrap();

    assert_eq!(saved.hash(), send.hash());
}

#[test]
fn resolve_fork_by_rolling_back_and_processing_winner() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send1 = genesis.send(&txn).link(Account::from(1)).build();
    let send2 = genesis.send(&txn).link(Account::from(2)).build();
    ctx.ledger.process(&mut txn, &send1).unwrap();
    assert_eq!(ctx.ledger.process(&mut txn, &send2), Err(BlockStatus::Fork));

    ctx.ledger.rollback(&mut txn, &send1.hash()).unwrap();
    ctx.ledger.process(&mut txn, &send2).unwrap();

    assert_eq!(
        ctx.ledger.latest(&txn, &DEV_GENESIS_ACCOUNT),
        Some(send2.hash())
    );
    assert!(!ctx.ledger.any().block_exists(&txn, &send1.hash()));
}

#[test]
fn processing_reports_previous_balance_and_signer() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let send = genesis.send(&txn).amount_sent(Amount::raw(5)).build();
    let processed = ctx
        .ledger
        .process_verified(&mut txn, &send, SignatureVerification::Unknown)
        .unwrap();
    assert_eq!(processed.previous_balance, Amount::MAX);
    assert_eq!(processed.verification, SignatureVerification::Valid);
    assert_eq!(processed.block.hash(), send.hash());

    let epoch = genesis.epoch_v1(&txn).build();
    let processed = ctx
        .ledger
        .process_verified(&mut txn, &epoch, SignatureVerification::Unknown)
        .unwrap();
    assert_eq!(processed.previous_balance, Amount::MAX - Amount::raw(5));
    assert_eq!(processed.verification, SignatureVerification::ValidEpoch);
}

#[test]
fn invalid_hint_still_accepts_a_correctly_signed_block() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();

    let processed = ctx
        .ledger
        .process_verified(&mut txn, &send, SignatureVerification::Invalid)
        .unwrap();

    assert_eq!(processed.verification, SignatureVerification::Valid);
}
