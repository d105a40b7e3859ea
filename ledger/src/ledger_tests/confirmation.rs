use super::LedgerContext;
use crate::{DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};
use lattice_core::{Account, Amount, BlockBuilder, BlockHash, PublicKey};

#[test]
fn confirm_cements_block_and_predecessors() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let send1 = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let cemented = ctx.ledger.confirm(&mut txn, send2.hash());

    let hashes: Vec<_> = cemented.iter().map(|b| b.hash()).collect();
    assert_eq!(hashes, vec![send1.hash(), send2.hash()]);
    assert_eq!(ctx.ledger.cemented_count(), 3);
    let conf_height = ctx
        .ledger
        .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(conf_height.height, 3);
    assert_eq!(conf_height.frontier, send2.hash());
    assert!(ctx.ledger.block_confirmed(&txn, &send1.hash()));
}

#[test]
fn confirm_receive_cements_the_send_first() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = destination.open(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();
    assert!(!ctx.ledger.dependents_confirmed(&txn, &open));

    let cemented = ctx.ledger.confirm(&mut txn, open.hash());

    let hashes: Vec<_> = cemented.iter().map(|b| b.hash()).collect();
    assert_eq!(hashes, vec![send.hash(), open.hash()]);
    assert!(ctx.ledger.dependents_confirmed(&txn, &open));
}

#[test]
fn confirm_is_idempotent() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    ctx.ledger.confirm(&mut txn, send.hash());

    let cemented = ctx.ledger.confirm(&mut txn, send.hash());

    assert!(cemented.is_empty());
    assert_eq!(ctx.ledger.cemented_count(), 2);
}

#[test]
fn confirm_max_limits_cemented_blocks() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let mut last = BlockHash::zero();
    for _ in 0..3 {
        let send = genesis.send(&txn).build();
        ctx.ledger.process(&mut txn, &send).unwrap();
        last = send.hash();
    }

    let cemented = ctx.ledger.confirm_max(&mut txn, last, 2);

    assert_eq!(cemented.len(), 2);
    assert!(!ctx.ledger.block_confirmed(&txn, &last));
}

#[test]
fn confirmed_block_cannot_be_rolled_back() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    ctx.ledger.confirm(&mut txn, send.hash());

    let result = ctx.ledger.rollback(&mut txn, &send.hash());

    assert!(result.is_err());
    assert!(ctx.ledger.any().block_exists(&txn, &send.hash()));
}

#[test]
fn rollback_stops_at_confirmed_receive() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = destination.open(&txn, send.hash()).build();
    ctx.ledger.process(&mut txn, &open).unwrap();
    ctx.inc_confirmation_height(&mut txn, &destination.account());

    assert!(ctx.ledger.rollback(&mut txn, &send.hash()).is_err());
    assert!(ctx.ledger.any().block_exists(&txn, &open.hash()));
}

#[test]
fn prune_confirmed_blocks() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    ctx.ledger.enable_pruning();
    let genesis = ctx.genesis_block_factory();
    let send1 = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn).build();
    ctx.ledger.process(&mut txn, &send2).unwrap();
    ctx.ledger.confirm(&mut txn, send2.hash());

    let pruned = ctx.ledger.pruning_action(&mut txn, &send1.hash(), 1).unwrap();

    assert_eq!(pruned, 1);
    assert!(ctx.ledger.pruning_enabled());
    assert_eq!(ctx.ledger.pruned_count(), 1);
    assert!(!ctx.ledger.any().block_exists(&txn, &send1.hash()));
    assert!(ctx.ledger.any().block_exists_or_pruned(&txn, &send1.hash()));
    assert!(ctx.ledger.block_confirmed(&txn, &send1.hash()));
    assert!(ctx.ledger.any().block_exists(&txn, &DEV_GENESIS_HASH));
}

#[test]
fn unconfirmed_block_cannot_be_pruned() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = ctx.genesis_block_factory().send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    assert!(ctx.ledger.pruning_action(&mut txn, &send.hash(), 1).is_err());
}

#[test]
fn pruned_send_can_still_be_received() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let send = genesis
        .send(&txn)
        .link(destination.account())
        .amount_sent(Amount::raw(5))
        .build();
    ctx.ledger.process(&mut txn, &send).unwrap();
    let head = genesis.send(&txn).link(Account::from(3)).build();
    ctx.ledger.process(&mut txn, &head).unwrap();
    ctx.ledger.confirm(&mut txn, head.hash());
    ctx.ledger.pruning_action(&mut txn, &send.hash(), 1).unwrap();

    let open = BlockBuilder::state()
        .key(&destination.key)
        .previous(BlockHash::zero())
        .representative(PublicKey::from(4))
        .balance(Amount::raw(5))
        .link(send.hash())
        .build();
    ctx.ledger.process(&mut txn, &open).unwrap();

    assert_eq!(
        ctx.ledger.any().account_balance(&txn, &destination.account()),
        Some(Amount::raw(5))
    );
}
