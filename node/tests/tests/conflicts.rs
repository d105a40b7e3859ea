use lattice_core::{
    Amount, PublicKey, UnsavedBlockLatticeBuilder, Vote, VoteCode, VoteSource, DEV_GENESIS_KEY,
};
use lattice_ledger::{BlockStatus, DEV_GENESIS_ACCOUNT};
use lattice_node::stats::{DetailType, Direction, StatType};
use std::{sync::Arc, time::Duration};
use test_helpers::{assert_timely, assert_timely_eq, start_election, System};

#[test]
fn fork_is_added_to_existing_election() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    node.process(send1.clone()).unwrap();
    let election = start_election(&node, &send1.hash());

    node.process_active(send2.clone());

    assert_timely(Duration::from_secs(5), || node.active.active(&send2.hash()));
    assert!(election.contains(&send1.hash()));
    assert!(election.contains(&send2.hash()));
    assert_eq!(node.active.len(), 1);
    assert_eq!(election.winner_hash(), send1.hash());
}

#[test]
fn fork_without_election_is_ignored() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    node.process(send1.clone()).unwrap();

    assert!(matches!(node.process(send2.clone()), Err(BlockStatus::Fork)));
    node.process_active(send2.clone());

    assert_timely(Duration::from_secs(5), || node.block_processor.is_empty());
    assert!(!node.active.active(&send2.hash()));
    assert_eq!(node.latest(&DEV_GENESIS_ACCOUNT), send1.hash());
}

#[test]
fn final_votes_resolve_fork() {
    let mut system = System::new();
    let node = system.make_node();
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    assert!(node.process(send1.clone()).is_ok());
    assert!(matches!(node.process(send2.clone()), Err(BlockStatus::Fork)));
    let election = start_election(&node, &send1.hash());
    node.process_active(send2.clone());
    assert_timely(Duration::from_secs(5), || election.contains(&send2.hash()));

    let vote = Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send2.hash()]));
    let results = node.active.vote(&vote, VoteSource::Live);

    assert_eq!(results.get(&send2.hash()), Some(&VoteCode::Vote));
    assert_eq!(election.winner_hash(), send2.hash());
    assert_timely_eq(
        Duration::from_secs(5),
        || node.latest(&DEV_GENESIS_ACCOUNT),
        send2.hash(),
    );
    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send2.hash()));
    assert!(!node.block_exists(&send1.hash()));
    assert!(
        node.stats
            .count(StatType::Blockprocessor, DetailType::Rollback, Direction::In)
            >= 1
    );
}
