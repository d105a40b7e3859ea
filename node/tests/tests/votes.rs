use lattice_core::{
    Amount, Block, PrivateKey, PublicKey, Signature, UnsavedBlockLatticeBuilder, Vote, VoteCode,
    VoteSource, DEV_GENESIS_KEY,
};
use lattice_node::stats::{DetailType, Direction, StatType};
use std::{sync::Arc, time::Duration};
use test_helpers::{assert_timely, start_election, System};

fn fork_pair() -> (Block, Block) {
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    (send1, send2)
}

#[test]
fn check_signature() {
    let mut system = System::new();
    let node = system.make_node();
    let (send, _) = fork_pair();
    node.process(send.clone()).unwrap();
    let election = start_election(&node, &send.hash());
    let mut vote = Vote::new(&DEV_GENESIS_KEY, Vote::TIMESTAMP_MIN, 0, vec![send.hash()]);
    let good_signature = vote.signature.clone();
    vote.signature = Signature::new();

    let results = node.active.vote(&Arc::new(vote.clone()), VoteSource::Live);
    assert_eq!(results[&send.hash()], VoteCode::Invalid);
    assert_eq!(election.vote_count(), 1);

    vote.signature = good_signature;
    let vote = Arc::new(vote);
    assert_eq!(
        node.active.vote(&vote, VoteSource::Live)[&send.hash()],
        VoteCode::Vote
    );
    assert_eq!(
        node.active.vote(&vote, VoteSource::Live)[&send.hash()],
        VoteCode::Replay
    );
    assert_eq!(election.vote_count(), 2);
}

// Lower timestamps are ignored
#[test]
fn add_old() {
    let mut system = System::new();
    let node = system.make_node();
    let (send1, send2) = fork_pair();
    node.process(send1.clone()).unwrap();
    let election = start_election(&node, &send1.hash());
    node.process_active(send2.clone());
    assert_timely(Duration::from_secs(5), || election.contains(&send2.hash()));
    let key = PrivateKey::from(42);
    node.ledger
        .rep_weights
        .set(key.public_key(), Amount::nano(1000));

    let vote1 = Arc::new(Vote::new(&key, 2 * Vote::TIMESTAMP_MIN, 0, vec![send1.hash()]));
    assert_eq!(
        node.active.vote(&vote1, VoteSource::Live)[&send1.hash()],
        VoteCode::Vote
    );

    let vote2 = Arc::new(Vote::new(&key, Vote::TIMESTAMP_MIN, 0, vec![send2.hash()]));
    assert_eq!(
        node.active.vote(&vote2, VoteSource::Live)[&send2.hash()],
        VoteCode::Replay
    );
    assert_eq!(election.winner_hash(), send1.hash());
}

#[test]
fn low_weight_rep_cannot_switch_during_cooldown() {
    let mut system = System::new();
    let node = system.make_node();
    node.online_reps
        .lock()
        .unwrap()
        .set_trended(Amount::nano(100_000_000));
    let (send1, send2) = fork_pair();
    node.process(send1.clone()).unwrap();
    let election = start_election(&node, &send1.hash());
    node.process_active(send2.clone());
    assert_timely(Duration::from_secs(5), || election.contains(&send2.hash()));
    // below 0.1% of the trended online weight
    let key = PrivateKey::from(42);
    node.ledger.rep_weights.set(key.public_key(), Amount::nano(1));

    let vote1 = Arc::new(Vote::new(&key, Vote::TIMESTAMP_MIN, 0, vec![send1.hash()]));
    node.active.vote(&vote1, VoteSource::Live);
    let vote2 = Arc::new(Vote::new(&key, 2 * Vote::TIMESTAMP_MIN, 0, vec![send2.hash()]));

    let results = node.active.vote(&vote2, VoteSource::Live);

    assert_eq!(results[&send2.hash()], VoteCode::Replay);
    assert_eq!(
        node.stats
            .count(StatType::Vote, DetailType::Replay, Direction::In),
        1
    );
}

#[test]
fn final_vote_ignores_cooldown() {
    let mut system = System::new();
    let node = system.make_node();
    node.online_reps
        .lock()
        .unwrap()
        .set_trended(Amount::nano(100_000_000));
    let (send1, send2) = fork_pair();
    node.process(send1.clone()).unwrap();
    let election = start_election(&node, &send1.hash());
    node.process_active(send2.clone());
    assert_timely(Duration::from_secs(5), || election.contains(&send2.hash()));
    let key = PrivateKey::from(42);
    node.ledger.rep_weights.set(key.public_key(), Amount::nano(1));

    let vote1 = Arc::new(Vote::new(&key, Vote::TIMESTAMP_MIN, 0, vec![send1.hash()]));
    node.active.vote(&vote1, VoteSource::Live);
    let vote2 = Arc::new(Vote::new_final(&key, vec![send2.hash()]));

    let results = node.active.vote(&vote2, VoteSource::Live);

    assert_eq!(results[&send2.hash()], VoteCode::Vote);
    assert!(!election.is_confirmed());
}

#[test]
fn vote_for_recently_confirmed_block_is_replay() {
    let mut system = System::new();
    let node = system.make_node();
    let (send, _) = fork_pair();
    node.process(send.clone()).unwrap();
    let election = start_election(&node, &send.hash());
    node.active.force_confirm(&election);
    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));
    assert_timely(Duration::from_secs(5), || node.active.is_empty());

    let vote = Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send.hash()]));
    let results = node.active.vote(&vote, VoteSource::Live);

    assert_eq!(results[&send.hash()], VoteCode::Replay);
}

#[test]
fn local_votes_are_recorded_in_history() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (send, _) = fork_pair();

    node.process_active(send.clone());

    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));
    assert_timely(Duration::from_secs(5), || {
        !node.history.votes(&send.root(), &send.hash(), true).is_empty()
    });
    let final_votes = node.history.votes(&send.root(), &send.hash(), true);
    assert!(final_votes.iter().all(|v| v.is_final()));
    assert_eq!(final_votes[0].voting_account, DEV_GENESIS_KEY.public_key());
}
