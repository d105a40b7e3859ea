use super::LedgerContext;
use crate::{
    ledger_constants::{DEV_GENESIS_PUB_KEY, LEDGER_CONSTANTS_STUB},
    DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use lattice_core::{utils::seconds_since_epoch, Account, BlockType, Root};
use tracing_test::traced_test;

#[test]
fn account_balance_is_none_for_unknown_account() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    let balance = ctx.ledger.any().account_balance(&txn, &Account::zero());

    assert_eq!(balance, None);
}

#[test]
fn get_genesis_block() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    let block = ctx
        .ledger
        .any()
        .get_block(&txn, &DEV_GENESIS_HASH)
        .expect("genesis block not found");

    assert_eq!(block.block_type(), BlockType::LegacyOpen);
}

#[test]
fn genesis_account_balance() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    let balance = ctx.ledger.any().account_balance(&txn, &DEV_GENESIS_ACCOUNT);

    assert_eq!(balance, Some(LEDGER_CONSTANTS_STUB.genesis_amount));
}

#[test]
fn genesis_account_info() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    let account_info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .expect("genesis account not found");

    // Frontier time should have been updated when genesis balance was added
    assert!(account_info.modified > 0 && account_info.modified <= seconds_since_epoch());
    assert_eq!(account_info.block_count, 1);
    assert_eq!(account_info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
}

#[test]
fn genesis_confirmation_height_info() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    // Genesis block should be confirmed by default
    let conf_info = ctx
        .ledger
        .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
        .expect("conf height not found");

    assert_eq!(conf_info.height, 1);
    assert_eq!(conf_info.frontier, *DEV_GENESIS_HASH);
}

#[test]
fn cache() {
    let ctx = LedgerContext::empty();
    assert_eq!(ctx.ledger.account_count(), 1);
    assert_eq!(ctx.ledger.block_count(), 1);
    assert_eq!(ctx.ledger.cemented_count(), 1);
    assert_eq!(ctx.ledger.pruned_count(), 0);
}

#[test]
fn genesis_is_confirmed() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert!(ctx.ledger.block_confirmed(&txn, &DEV_GENESIS_HASH));
    assert_eq!(
        ctx.ledger.confirmed().account_height(&txn, &DEV_GENESIS_ACCOUNT),
        1
    );
}

#[test]
fn genesis_is_legacy_frontier() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
}

#[test]
fn genesis_vote_weight() {
    let ctx = LedgerContext::empty();
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
}

#[test]
fn latest_empty() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert_eq!(ctx.ledger.any().account_head(&txn, &Account::from(1)), None);
}

#[test]
fn latest_root_of_unopened_account_is_the_account() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    let account = Account::from(1);
    assert_eq!(ctx.ledger.latest_root(&txn, &account), Root::from(account));
    assert_eq!(
        ctx.ledger.latest_root(&txn, &DEV_GENESIS_ACCOUNT),
        Root::from(*DEV_GENESIS_HASH)
    );
}

#[test]
fn reopening_existing_store_keeps_ledger_state() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let send = {
        let mut txn = ctx.ledger.rw_txn();
        let send = genesis.send(&txn).build();
        ctx.ledger.process(&mut txn, &send).unwrap();
        send
    };

    let reopened = crate::Ledger::new(
        ctx.ledger.store.clone(),
        LEDGER_CONSTANTS_STUB.clone(),
        std::sync::Arc::new(crate::RepWeightCache::new()),
    )
    .unwrap();

    let txn = reopened.read_txn();
    assert_eq!(reopened.block_count(), 2);
    assert_eq!(reopened.account_count(), 1);
    assert_eq!(reopened.cemented_count(), 1);
    assert_eq!(reopened.latest(&txn, &DEV_GENESIS_ACCOUNT), Some(send.hash()));
    assert_eq!(
        reopened.weight(&DEV_GENESIS_PUB_KEY),
        send.balance_field().unwrap()
    );
}

#[test]
#[traced_test]
fn logs_genesis_initialization() {
    let _ctx = LedgerContext::empty();
    assert!(logs_contain("genesis block written"));
}
