use lattice_core::{
    Amount, PublicKey, UnsavedBlockLatticeBuilder, Vote, VoteCode, VoteSource,
    DEV_GENESIS_KEY,
};
use lattice_ledger::DEV_GENESIS_ACCOUNT;
use lattice_node::{
    consensus::ElectionStatusType,
    stats::{DetailType, Direction, StatType},
};
use std::{sync::Arc, time::Duration};
use test_helpers::{assert_never, assert_timely, assert_timely_eq, start_election, System};

#[test]
fn start_stop() {
    let mut system = System::new();
    let node = system.make_node();
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    node.process(send.clone()).unwrap();
    assert_eq!(node.active.len(), 0);

    let election = start_election(&node, &send.hash());

    assert_eq!(node.active.len(), 1);
    assert_eq!(election.vote_count(), 1);
    assert!(node.active.active(&send.hash()));
}

#[test]
fn election_without_votes_is_not_confirmed() {
    let mut system = System::new();
    let node = system.make_node();
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    node.process(send.clone()).unwrap();

    start_election(&node, &send.hash());

    assert_never(Duration::from_millis(500), || {
        node.block_confirmed(&send.hash())
    });
}

#[test]
fn local_representative_confirms_live_block() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));

    node.process_active(send.clone());

    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));
    assert_timely_eq(Duration::from_secs(5), || node.active.len(), 0);
    let cemented = node.active.recently_cemented_list();
    assert_eq!(cemented.len(), 1);
    assert_eq!(cemented[0].winner.hash(), send.hash());
    assert_ne!(cemented[0].election_status_type, ElectionStatusType::Ongoing);
}

#[test]
fn cemented_block_activates_successor() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    node.process_multi(&[send1.clone(), send2.clone()]);

    assert!(node.activate(&DEV_GENESIS_ACCOUNT));

    assert_timely(Duration::from_secs(5), || {
        node.blocks_confirmed(&[send1.clone(), send2.clone()])
    });
}

#[test]
fn cached_final_vote_confirms_new_election() {
    let mut system = System::new();
    let node = system.make_node();
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    let vote = Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send.hash()]));

    let results = node.active.vote(&vote, VoteSource::Live);

    assert_eq!(results.get(&send.hash()), Some(&VoteCode::Indeterminate));
    assert_eq!(node.vote_cache.lock().unwrap().len(), 1);

    node.process_active(send.clone());

    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));
    assert_eq!(
        node.stats
            .count(StatType::ElectionVote, DetailType::Cache, Direction::In),
        1
    );
}

#[test]
fn non_final_votes_do_not_confirm() {
    let mut system = System::new();
    let node = system.make_node();
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    node.process(send.clone()).unwrap();
    let election = start_election(&node, &send.hash());

    let vote = Arc::new(Vote::new(&DEV_GENESIS_KEY, Vote::TIMESTAMP_MIN, 0, vec![send.hash()]));
    node.active.vote(&vote, VoteSource::Live);

    assert_eq!(election.vote_count(), 2);
    assert_never(Duration::from_millis(500), || election.is_confirmed());
}
