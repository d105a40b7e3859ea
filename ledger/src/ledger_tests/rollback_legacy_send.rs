use super::{
    helpers::{setup_legacy_open_block, setup_legacy_send_block, LegacySendBlockResult},
    LedgerContext,
};
use crate::{
    ledger_constants::{DEV_GENESIS_PUB_KEY, LEDGER_CONSTANTS_STUB},
    DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use lattice_core::{BlockSubType, PendingKey};
use lattice_store::WriteTransaction;

#[test]
fn update_vote_weight() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    rollback_send_block(&ctx, &mut txn);

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
}

#[test]
fn update_account_store() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    rollback_send_block(&ctx, &mut txn);

    let account_info = ctx.ledger.account_info(&txn, &DEV_GENESIS_ACCOUNT).unwrap();
    assert_eq!(account_info.block_count, 1);
    assert_eq!(account_info.head, *DEV_GENESIS_HASH);
    assert_eq!(account_info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
    assert_eq!(ctx.ledger.account_count(), 1);
}

#[test]
fn remove_from_pending_store() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = rollback_send_block(&ctx, &mut txn);

    let pending = ctx.ledger.any().get_pending(
        &txn,
        &PendingKey::new(send.destination.account(), send.send_block.hash()),
    );
    assert_eq!(pending, None);
}

#[test]
fn update_confirmation_height_store() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    rollback_send_block(&ctx, &mut txn);

    let conf_height = ctx
        .ledger
        .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();

    assert_eq!(conf_height.frontier, *DEV_GENESIS_HASH);
    assert_eq!(conf_height.height, 1);
}

#[test]
fn rollback_dependent_blocks_too() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    // Rollback send block. This requires the rollback of the open block first.
    ctx.ledger
        .rollback(&mut txn, &open.send_block.hash())
        .unwrap();

    assert_eq!(
        ctx.ledger.any().account_balance(&txn, &DEV_GENESIS_ACCOUNT),
        Some(LEDGER_CONSTANTS_STUB.genesis_amount)
    );

    assert_eq!(
        ctx.ledger
            .any()
            .account_balance(&txn, &open.destination.account()),
        None
    );

    assert!(ctx
        .ledger
        .account_info(&txn, &open.destination.account())
        .is_none());

    let pending = ctx.ledger.any().get_pending(
        &txn,
        &PendingKey::new(open.destination.account(), open.send_block.hash()),
    );
    assert_eq!(pending, None);
    assert_eq!(ctx.ledger.block_count(), 1);
}

#[test]
fn returns_rolled_back_blocks_in_rollback_order() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let rolled_back = ctx
        .ledger
        .rollback(&mut txn, &open.send_block.hash())
        .unwrap();

    let hashes: Vec<_> = rolled_back.iter().map(|b| b.hash()).collect();
    assert_eq!(hashes, vec![open.open_block.hash(), open.send_block.hash()]);
    assert_eq!(rolled_back[0].subtype(), BlockSubType::Open);
    assert_eq!(rolled_back[1].subtype(), BlockSubType::Send);
}

#[test]
fn restores_legacy_frontier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = rollback_send_block(&ctx, &mut txn);

    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &send.send_block.hash()),
        None
    );
}

fn rollback_send_block<'a>(
    ctx: &'a LedgerContext,
    txn: &mut WriteTransaction,
) -> LegacySendBlockResult<'a> {
    let send = setup_legacy_send_block(ctx, txn);
    ctx.ledger.rollback(txn, &send.send_block.hash()).unwrap();
    send
}
