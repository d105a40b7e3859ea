use super::LedgerContext;
use crate::{ledger_tests::helpers::AccountBlockFactory, Ledger};
use lattice_core::{
    Account, AccountInfo, Amount, BlockHash, PendingInfo, PendingKey, PublicKey, SavedBlock,
};
use lattice_store::Transaction;
use std::collections::HashMap;

/// Everything a rollback has to restore
#[derive(PartialEq, Debug)]
struct LedgerState {
    accounts: Vec<(Account, AccountInfo)>,
    pending: Vec<(PendingKey, PendingInfo)>,
    blocks: HashMap<BlockHash, SavedBlock>,
    weights: HashMap<PublicKey, Amount>,
    block_count: u64,
    account_count: u64,
}

impl LedgerState {
    fn capture(ledger: &Ledger, txn: &dyn Transaction) -> Self {
        Self {
            accounts: ledger
                .store
                .account
                .iter(txn)
                .map(|(account, info)| (*account, info.clone()))
                .collect(),
            pending: ledger
                .store
                .pending
                .iter(txn)
                .map(|(key, info)| (key.clone(), info.clone()))
                .collect(),
            blocks: ledger
                .store
                .block
                .iter(txn)
                .map(|block| (block.hash(), block))
                .collect(),
            weights: ledger.rep_weights.read().clone(),
            block_count: ledger.block_count(),
            account_count: ledger.account_count(),
        }
    }
}

#[test]
fn rollback_send_restores_previous_state() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let send = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let rolled_back = ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();

    assert_eq!(rolled_back.len(), 1);
    assert_eq!(rolled_back[0].hash(), send.hash());
    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
}

#[test]
fn rollback_receive_makes_send_receivable_again() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis
        .send(&txn)
        .amount_sent(Amount::raw(50))
        .link(genesis.account())
        .build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let receive = genesis.receive(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &receive).unwrap();
    assert!(ctx
        .ledger
        .any()
        .get_pending(&txn, &PendingKey::new(genesis.account(), send.hash()))
        .is_none());

    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    let after = LedgerState::capture(&ctx.ledger, &txn);
    assert_eq!(after, before);
    assert_eq!(after.pending.len(), 1);
}

#[test]
fn rollback_of_received_send_removes_the_receiving_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = AccountBlockFactory::new(&ctx.ledger);
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = destination.open(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();

    let rolled_back = ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();

    let hashes: Vec<_> = rolled_back.iter().map(|b| b.hash()).collect();
    assert_eq!(hashes, vec![open.hash(), send.hash()]);
    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
    assert!(destination.info(&txn).is_none());
}

#[test]
fn rollback_open_keeps_the_send() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = AccountBlockFactory::new(&ctx.ledger);
    let send = genesis
        .send(&txn)
        .link(destination.account())
        .amount_sent(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let open = destination.open(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();
    assert_eq!(ctx.ledger.weight(&destination.public_key()), Amount::raw(50));

    ctx.ledger.rollback(&mut txn, &open.hash()).unwrap();

    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
    assert_eq!(ctx.ledger.weight(&destination.public_key()), Amount::zero());
}

#[test]
fn rollback_representative_changes_moves_weight_back() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let representative = PublicKey::from(1);
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let change = genesis.change(&txn).representative(representative).build();
    ctx.ledger.process(&mut txn, &change).unwrap();
    let send = genesis
        .send(&txn)
        .representative(PublicKey::from(2))
        .build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    assert_eq!(ctx.ledger.weight(&representative), Amount::zero());

    ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();
    assert_eq!(
        ctx.ledger.weight(&representative),
        genesis.info(&txn).unwrap().balance
    );
    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
}

#[test]
fn rollback_receive_with_representative_change() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).link(genesis.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let receive = genesis
        .receive(&txn, send.hash())
        .representative(PublicKey::from(1))
        .build();
    ctx.ledger.process(&mut txn, &receive).unwrap();
    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
}

#[test]
fn rollback_inside_chain_removes_all_successors() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let first = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &first).unwrap();
    let before = LedgerState::capture(&ctx.ledger, &txn);

    let mut chain = Vec::new();
    for _ in 0..3 {
        let send = genesis.send(&txn).build();
        ctx.ledger.process(&mut txn, &send).unwrap();
        chain.push(send.hash());
    }

    let rolled_back = ctx.ledger.rollback(&mut txn, &chain[0]).unwrap();

    let hashes: Vec<_> = rolled_back.iter().map(|b| b.hash()).collect();
    chain.reverse();
    assert_eq!(hashes, chain);
    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
    assert_eq!(ctx.ledger.store.block.successor(&txn, &first.hash()), None);
}

#[test]
fn failed_rollback_changes_nothing() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    ctx.ledger.confirm(&mut txn, send.hash());
    let before = LedgerState::capture(&ctx.ledger, &txn);

    assert!(ctx.ledger.rollback(&mut txn, &send.hash()).is_err());

    assert_eq!(LedgerState::capture(&ctx.ledger, &txn), before);
}
