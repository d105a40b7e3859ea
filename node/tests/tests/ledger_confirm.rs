use lattice_core::{Amount, PrivateKey, PublicKey, UnsavedBlockLatticeBuilder, DEV_GENESIS_KEY};
use lattice_ledger::{DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};
use lattice_node::stats::{DetailType, Direction, StatType};
use std::time::Duration;
use test_helpers::{assert_timely_eq, System};

#[test]
fn single() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    node.process(send1.clone()).unwrap();

    let mut tx = node.ledger.rw_txn();
    assert!(!node.ledger.confirmed().block_exists(&tx, &send1.hash()));
    node.ledger.confirm(&mut tx, send1.hash());
    assert!(node.ledger.confirmed().block_exists(&tx, &send1.hash()));
    let conf_height = node
        .ledger
        .get_confirmation_height(&tx, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(conf_height.height, 2);
    assert_eq!(conf_height.frontier, send1.hash());

    // Cemented blocks cannot be rolled back
    assert!(node.ledger.rollback(&mut tx, &DEV_GENESIS_HASH).is_err());
    assert!(node.ledger.rollback(&mut tx, &send1.hash()).is_err());
    assert_eq!(
        node.stats.count(
            StatType::ConfirmationHeight,
            DetailType::BlocksConfirmed,
            Direction::In
        ),
        1
    );
    assert_eq!(node.ledger.cemented_count(), 2);
}

#[test]
fn confirming_receive_cements_its_send() {
    let mut system = System::new();
    let node = system.make_node();
    let key = PrivateKey::from(1);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send1 = lattice.genesis().send(&key, Amount::raw(100));
    let send2 = lattice.genesis().send(&key, Amount::raw(50));
    let open = lattice.account(&key).receive(&send1);
    let receive = lattice.account(&key).receive(&send2);
    node.process_multi(&[send1.clone(), send2.clone(), open.clone(), receive.clone()]);

    node.confirm(receive.hash());

    assert!(node.blocks_confirmed(&[send1, send2.clone(), open, receive.clone()]));
    let tx = node.ledger.read_txn();
    let genesis_height = node
        .ledger
        .get_confirmation_height(&tx, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(genesis_height.height, 3);
    assert_eq!(genesis_height.frontier, send2.hash());
    let key_height = node
        .ledger
        .get_confirmation_height(&tx, &key.account())
        .unwrap();
    assert_eq!(key_height.height, 2);
    assert_eq!(key_height.frontier, receive.hash());
    assert_eq!(node.ledger.cemented_count(), 5);
    assert_eq!(
        node.stats.count(
            StatType::ConfirmationHeight,
            DetailType::BlocksConfirmed,
            Direction::In
        ),
        4
    );
}

#[test]
fn confirming_twice_changes_nothing() {
    let mut system = System::new();
    let node = system.make_node();
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    node.process(send.clone()).unwrap();

    node.confirm(send.hash());
    node.confirm(send.hash());

    assert_eq!(node.ledger.cemented_count(), 2);
    assert_eq!(
        node.stats.count(
            StatType::ConfirmationHeight,
            DetailType::BlocksConfirmed,
            Direction::In
        ),
        1
    );
}

// A cemented block must survive a forced fork
#[test]
fn conflict_rollback_cemented() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let fork1a = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let fork1b = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    node.process(fork1a.clone()).unwrap();
    node.confirm(fork1a.hash());

    node.block_processor.force(fork1b.clone());

    assert_timely_eq(
        Duration::from_secs(5),
        || {
            node.stats.count(
                StatType::Blockprocessor,
                DetailType::RollbackFailed,
                Direction::In,
            )
        },
        1,
    );
    assert!(node.block_confirmed(&fork1a.hash()));
    assert!(!node.block_exists(&fork1b.hash()));
}

#[test]
fn cementing_by_election_updates_height() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));

    node.process_active(send.clone());

    assert_timely_eq(
        Duration::from_secs(5),
        || {
            let tx = node.ledger.read_txn();
            node.ledger
                .get_confirmation_height(&tx, &DEV_GENESIS_ACCOUNT)
                .map(|i| i.height)
        },
        Some(2),
    );
    assert_eq!(node.ledger.cemented_count(), 2);
}
