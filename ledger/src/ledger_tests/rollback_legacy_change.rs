use crate::{
    ledger_constants::{DEV_GENESIS_PUB_KEY, LEDGER_CONSTANTS_STUB},
    ledger_tests::LedgerContext,
    DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use lattice_core::{Amount, PublicKey};

#[test]
fn rollback_dependent_blocks_too() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let change = genesis.legacy_change(&txn).build();
    ctx.ledger.process(&mut txn, &change).unwrap();

    let send = genesis.legacy_send(&txn).build();
    ctx.ledger.process(&mut txn, &send).unwrap();

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    assert_eq!(ctx.ledger.any().get_block(&txn, &send.hash()), None);

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
}

#[test]
fn restores_account_info_of_previous_block() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let info_before = ctx.ledger.account_info(&txn, &DEV_GENESIS_ACCOUNT).unwrap();

    let change = genesis.legacy_change(&txn).build();
    ctx.ledger.process(&mut txn, &change).unwrap();
    assert_eq!(ctx.ledger.weight(&PublicKey::from(1)), LEDGER_CONSTANTS_STUB.genesis_amount);

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    let genesis_block = ctx.ledger.get_block(&txn, &DEV_GENESIS_HASH).unwrap();
    let info_after = ctx.ledger.account_info(&txn, &DEV_GENESIS_ACCOUNT).unwrap();
    assert_eq!(info_after.head, *DEV_GENESIS_HASH);
    assert_eq!(info_after.representative, info_before.representative);
    assert_eq!(info_after.modified, genesis_block.timestamp());
    assert_eq!(ctx.ledger.weight(&PublicKey::from(1)), Amount::zero());
    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
}
