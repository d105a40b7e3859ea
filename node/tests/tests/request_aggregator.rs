use lattice_core::{Amount, Block, BlockHash, PublicKey, Root, UnsavedBlockLatticeBuilder, DEV_GENESIS_KEY};
use lattice_node::{
    stats::{DetailType, Direction, StatType},
    transport::{ConfirmReq, Message},
    Node,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use test_helpers::{assert_timely, assert_timely_eq, make_fake_channel, System};

fn requests(node: &Node, detail: DetailType) -> u64 {
    node.stats.count(StatType::Requests, detail, Direction::In)
}

fn confirm_acks(received: &Arc<Mutex<Vec<Message>>>) -> Vec<Message> {
    received
        .lock()
        .unwrap()
        .iter()
        .filter(|m| matches!(m, Message::ConfirmAck(_)))
        .cloned()
        .collect()
}

fn ack_hash_counts(received: &Arc<Mutex<Vec<Message>>>) -> Vec<usize> {
    confirm_acks(received)
        .iter()
        .map(|m| match m {
            Message::ConfirmAck(ack) => ack.vote().hashes.len(),
            _ => unreachable!(),
        })
        .collect()
}

fn request_for(block: &Block) -> Vec<(BlockHash, Root)> {
    vec![(block.hash(), block.root())]
}

#[test]
fn unknown_then_generated_then_cached() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (channel, received) = make_fake_channel(&node);
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));

    node.request_aggregator
        .add(channel.clone(), request_for(&send));
    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsUnknown),
        1,
    );
    assert!(confirm_acks(&received).is_empty());

    node.process(send.clone()).unwrap();
    node.request_aggregator
        .add(channel.clone(), request_for(&send));
    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsGeneratedVotes),
        1,
    );
    assert_timely_eq(Duration::from_secs(5), || confirm_acks(&received).len(), 1);

    node.request_aggregator
        .add(channel.clone(), request_for(&send));
    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsCachedVotes),
        1,
    );
    assert_timely_eq(Duration::from_secs(5), || confirm_acks(&received).len(), 2);

    let acks = confirm_acks(&received);
    assert_eq!(acks[0], acks[1]);
    assert_eq!(requests(&node, DetailType::RequestsGeneratedVotes), 1);
    assert_eq!(requests(&node, DetailType::RequestsUnknown), 1);
}

#[test]
fn confirmed_blocks_are_answered_with_split_final_votes() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (channel, received) = make_fake_channel(&node);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let blocks: Vec<Block> = (1..=13u64)
        .map(|i| lattice.genesis().send(PublicKey::from(i), Amount::raw(1)))
        .collect();
    node.process_multi(&blocks);
    node.confirm(blocks.last().unwrap().hash());
    assert!(node.blocks_confirmed(&blocks));

    let request = blocks
        .iter()
        .map(|b| (b.hash(), b.root()))
        .collect::<Vec<_>>();
    node.request_aggregator.add(channel, request);

    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsGeneratedVotes),
        2,
    );
    assert_timely_eq(
        Duration::from_secs(5),
        || ack_hash_counts(&received),
        vec![12, 1],
    );
    assert_eq!(requests(&node, DetailType::RequestsGeneratedHashes), 13);
    for ack in confirm_acks(&received) {
        if let Message::ConfirmAck(ack) = ack {
            assert!(ack.vote().is_final());
        }
    }
}

#[test]
fn block_with_unconfirmed_dependency_cannot_be_voted() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (channel, received) = make_fake_channel(&node);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(1));
    let send2 = lattice.genesis().send(PublicKey::from(2), Amount::raw(1));
    node.process_multi(&[send1.clone(), send2.clone()]);

    let mut request = request_for(&send1);
    request.extend(request_for(&send2));
    node.request_aggregator.add(channel, request);

    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsCannotVote),
        1,
    );
    assert_timely_eq(
        Duration::from_secs(5),
        || requests(&node, DetailType::RequestsGeneratedHashes),
        1,
    );
    assert_timely_eq(Duration::from_secs(5), || ack_hash_counts(&received), vec![1]);
}

#[test]
fn inbound_confirm_req_is_answered() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (channel, received) = make_fake_channel(&node);
    let send = UnsavedBlockLatticeBuilder::new()
        .genesis()
        .send(PublicKey::from(1), Amount::raw(100));
    node.process(send.clone()).unwrap();

    node.inbound(
        Message::ConfirmReq(ConfirmReq::new(request_for(&send))),
        &channel,
    );

    assert_timely(Duration::from_secs(5), || !confirm_acks(&received).is_empty());
    let acks = confirm_acks(&received);
    let Message::ConfirmAck(ack) = &acks[0] else {
        unreachable!()
    };
    assert_eq!(ack.vote().hashes, vec![send.hash()]);
    assert_eq!(ack.vote().voting_account, DEV_GENESIS_KEY.public_key());
    assert_eq!(
        node.stats
            .count(StatType::Aggregator, DetailType::AggregatorAccepted, Direction::In),
        1
    );
}

#[test]
fn fork_request_gets_ledger_block_published() {
    let mut system = System::new();
    let node = system.make_node();
    node.insert_into_wallet(&DEV_GENESIS_KEY);
    let (channel, received) = make_fake_channel(&node);
    let mut lattice = UnsavedBlockLatticeBuilder::new();
    let mut fork_lattice = lattice.clone();
    let send1 = lattice.genesis().send(PublicKey::from(1), Amount::raw(100));
    let send2 = fork_lattice
        .genesis()
        .send(PublicKey::from(2), Amount::raw(100));
    node.process(send1.clone()).unwrap();

    node.request_aggregator
        .add(channel, request_for(&send2));

    assert_timely(Duration::from_secs(5), || {
        received
            .lock()
            .unwrap()
            .contains(&Message::Publish(send1.clone()))
    });
    assert_timely_eq(Duration::from_secs(5), || ack_hash_counts(&received), vec![1]);
    let acks = confirm_acks(&received);
    let Message::ConfirmAck(ack) = &acks[0] else {
        unreachable!()
    };
    assert_eq!(ack.vote().hashes, vec![send1.hash()]);
}
