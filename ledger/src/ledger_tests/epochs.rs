use super::LedgerContext;
use crate::{BlockStatus, DEV_GENESIS_ACCOUNT};
use lattice_core::{Amount, BlockSubType, Epoch, PendingKey, PublicKey};

#[test]
fn upgrade_to_epoch_1_and_2() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let epoch1 = genesis.epoch_v1(&txn).build();
    let saved = ctx.ledger.process(&mut txn, &epoch1).unwrap();
    assert_eq!(saved.subtype(), BlockSubType::Epoch);
    assert_eq!(genesis.info(&txn).unwrap().epoch, Epoch::Epoch1);

    let epoch2 = genesis.epoch_v2(&txn).build();
    ctx.ledger.process(&mut txn, &epoch2).unwrap();
    assert_eq!(genesis.info(&txn).unwrap().epoch, Epoch::Epoch2);
}

#[test]
fn epoch_2_before_epoch_1_is_block_position() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let epoch2 = genesis.epoch_v2(&txn).build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch2),
        Err(BlockStatus::BlockPosition)
    );
}

#[test]
fn repeated_epoch_is_block_position() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let epoch1 = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &epoch1).unwrap();

    let again = genesis.epoch_v1(&txn).build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &again),
        Err(BlockStatus::BlockPosition)
    );
}

#[test]
fn epoch_must_not_change_representative() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let epoch1 = genesis
        .epoch_v1(&txn)
        .representative(PublicKey::from(5))
        .build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch1),
        Err(BlockStatus::RepresentativeMismatch)
    );
}

#[test]
fn epoch_open_requires_pending() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let destination = ctx.block_factory();

    let epoch_open = destination.epoch_v1_open().build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch_open),
        Err(BlockStatus::GapEpochOpenPending)
    );
}

#[test]
fn epoch_open_with_pending() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let epoch_open = destination.epoch_v1_open().build();
    ctx.ledger.process(&mut txn, &epoch_open).unwrap();

    let info = destination.info(&txn).unwrap();
    assert_eq!(info.epoch, Epoch::Epoch1);
    assert_eq!(info.balance, Amount::zero());
    assert!(ctx
        .ledger
        .any()
        .get_pending(&txn, &PendingKey::new(destination.account(), send.hash()))
        .is_some());
}

#[test]
fn legacy_receive_of_epoch_1_send_is_unreceivable() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let epoch1 = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &epoch1).unwrap();
    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let legacy_open = destination.legacy_open(send.hash()).build();

    assert_eq!(
        ctx.ledger.process(&mut txn, &legacy_open),
        Err(BlockStatus::Unreceivable)
    );
}

#[test]
fn receiving_epoch_1_send_upgrades_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();
    let epoch1 = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &epoch1).unwrap();
    let send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    let open = destination.open(&txn, send.hash()).build();
    let saved = ctx.ledger.process(&mut txn, &open).unwrap();

    assert_eq!(saved.epoch(), Epoch::Epoch1);
    assert_eq!(saved.source_epoch(), Epoch::Epoch1);
    assert_eq!(destination.info(&txn).unwrap().epoch, Epoch::Epoch1);
}

#[test]
fn rollback_epoch_restores_epoch_0() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let epoch1 = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &epoch1).unwrap();

    let rolled_back = ctx.ledger.rollback(&mut txn, &epoch1.hash()).unwrap();

    assert_eq!(rolled_back.len(), 1);
    assert_eq!(
        ctx.ledger
            .account_info(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .epoch,
        Epoch::Epoch0
    );
}
