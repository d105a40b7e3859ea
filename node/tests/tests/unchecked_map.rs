use lattice_core::{Amount, PrivateKey, UnsavedBlockLatticeBuilder};
use lattice_ledger::DEV_GENESIS_ACCOUNT;
use lattice_node::stats::{DetailType, Direction, StatType};
use std::time::Duration;
use test_helpers::{assert_timely, assert_timely_eq, System};

#[test]
fn gap_previous_waits_for_parent() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send1 = lattice.genesis().send(&PrivateKey::from(1), Amount::raw(1));
    let send2 = lattice.genesis().send(&PrivateKey::from(2), Amount::raw(1));

    node.process_active(send2.clone());
    assert_timely_eq(Duration::from_secs(5), || node.unchecked.len(), 1);
    assert!(!node.block_exists(&send2.hash()));
    assert_eq!(node.unchecked.get(&send1.hash()).len(), 1);

    node.process_active(send1.clone());

    assert_timely(Duration::from_secs(5), || node.block_exists(&send2.hash()));
    assert!(node.block_exists(&send1.hash()));
    assert_eq!(node.latest(&DEV_GENESIS_ACCOUNT), send2.hash());
    assert_timely_eq(Duration::from_secs(5), || node.unchecked.len(), 0);
    assert_eq!(
        node.stats
            .count(StatType::Unchecked, DetailType::Satisfied, Direction::In),
        1
    );
}

#[test]
fn gap_source_waits_for_send() {
    let mut system = System::new();
    let node = system.make_node();
    let key = PrivateKey::from(1);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send = lattice.genesis().send(&key, Amount::raw(100));
    let open = lattice.account(&key).receive(&send);

    node.process_active(open.clone());
    assert_timely_eq(Duration::from_secs(5), || node.unchecked.len(), 1);
    assert!(node.unchecked.get(&send.hash()).len() == 1);

    node.process_active(send.clone());

    assert_timely(Duration::from_secs(5), || node.block_exists(&open.hash()));
    assert_eq!(node.balance(&key.account()), Amount::raw(100));
    assert!(node.unchecked.is_empty());
}

#[test]
fn duplicate_gap_block_is_stored_once() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let _send1 = lattice.genesis().send(&PrivateKey::from(1), Amount::raw(1));
    let send2 = lattice.genesis().send(&PrivateKey::from(2), Amount::raw(1));

    node.process_active(send2.clone());
    node.process_active(send2.clone());

    assert_timely(Duration::from_secs(5), || node.block_processor.is_empty());
    assert_timely_eq(
        Duration::from_secs(5),
        || {
            node.stats
                .count(StatType::Unchecked, DetailType::Duplicate, Direction::In)
        },
        1,
    );
    assert_eq!(node.unchecked.len(), 1);
}
