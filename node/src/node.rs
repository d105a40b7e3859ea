use crate::{
    block_processing::{BlockProcessor, BlockSource, UncheckedMap},
    cementation::ConfirmingSet,
    config::{NetworkParams, NodeConfig},
    consensus::{
        ActiveElections, ActiveElectionsExt, ElectionBehavior, LocalVoteHistory,
        RequestAggregator, RequestAggregatorExt, VoteBroadcaster, VoteCache, VoteGenerators,
    },
    representatives::OnlineReps,
    stats::{LedgerStats, Stats},
    transport::{Channel, Message, Network, RealtimeMessageHandler},
    wallets::WalletRepresentatives,
};
use lattice_core::{Account, Amount, Block, BlockHash, PrivateKey, SavedBlock};
use lattice_ledger::{BlockStatus, Ledger, RepWeightCache};
use lattice_store::{Store, Transaction};
use std::{
    sync::{Arc, Condvar, Mutex, Weak},
    thread::JoinHandle,
};
use tracing::{error, info};

pub struct Node {
    pub config: NodeConfig,
    pub network_params: NetworkParams,
    pub stats: Arc<Stats>,
    pub store: Arc<Store>,
    pub ledger: Arc<Ledger>,
    pub unchecked: Arc<UncheckedMap>,
    pub network: Arc<Network>,
    pub online_reps: Arc<Mutex<OnlineReps>>,
    pub representatives: Arc<WalletRepresentatives>,
    pub history: Arc<LocalVoteHistory>,
    pub vote_cache: Arc<Mutex<VoteCache>>,
    pub vote_broadcaster: Arc<VoteBroadcaster>,
    pub vote_generators: Arc<VoteGenerators>,
    pub confirming_set: Arc<ConfirmingSet>,
    pub block_processor: Arc<BlockProcessor>,
    pub active: Arc<ActiveElections>,
    pub request_aggregator: Arc<RequestAggregator>,
    pub message_handler: RealtimeMessageHandler,
    online_weight_sampler: OnlineWeightSampler,
}

impl Node {
    pub fn new(config: NodeConfig, network_params: NetworkParams) -> anyhow::Result<Self> {
        let stats = Arc::new(Stats::new(config.stats.clone()));
        let store = Arc::new(Store::new());
        let rep_weights = Arc::new(RepWeightCache::new());
        let mut ledger = Ledger::new(
            store.clone(),
            network_params.ledger.clone(),
            rep_weights.clone(),
        )?;
        ledger.set_observer(Arc::new(LedgerStats::new(stats.clone())));
        let ledger = Arc::new(ledger);

        let unchecked = Arc::new(UncheckedMap::new(
            config.max_unchecked_blocks,
            stats.clone(),
            false,
        ));
        let network = Arc::new(Network::new(stats.clone()));

        let mut online_reps = OnlineReps::new(rep_weights.clone());
        online_reps.set_online_weight_minimum(config.online_weight_minimum);
        online_reps.set_weight_period(network_params.network.online_weight_period);
        online_reps.set_principal_weight_factor(network_params.network.principal_weight_factor);
        let online_reps = Arc::new(Mutex::new(online_reps));

        let representatives = Arc::new(WalletRepresentatives::new(
            config.enable_voting,
            config.vote_minimum,
            rep_weights,
        ));
        let history = Arc::new(LocalVoteHistory::new(
            network_params.network.max_vote_history,
        ));
        let vote_cache = Arc::new(Mutex::new(VoteCache::new(
            config.vote_cache.clone(),
            stats.clone(),
        )));
        let vote_broadcaster = Arc::new(VoteBroadcaster::new(network.clone()));
        let vote_generators = Arc::new(VoteGenerators::new(
            ledger.clone(),
            representatives.clone(),
            history.clone(),
            stats.clone(),
            network.clone(),
            vote_broadcaster.clone(),
            &config,
            &network_params,
        ));
        let confirming_set = Arc::new(ConfirmingSet::new(
            config.confirming_set.clone(),
            ledger.clone(),
            stats.clone(),
        ));
        let block_processor = Arc::new(BlockProcessor::new(
            config.block_processor.clone(),
            ledger.clone(),
            unchecked.clone(),
            stats.clone(),
        ));
        let active = Arc::new(ActiveElections::new(
            network_params.clone(),
            config.active_elections.clone(),
            online_reps.clone(),
            representatives.clone(),
            ledger.clone(),
            confirming_set.clone(),
            block_processor.clone(),
            vote_generators.clone(),
            history.clone(),
            network.clone(),
            vote_cache.clone(),
            stats.clone(),
        ));
        let request_aggregator = Arc::new(RequestAggregator::new(
            config.request_aggregator.clone(),
            stats.clone(),
            vote_generators.clone(),
            history.clone(),
            ledger.clone(),
            active.clone(),
            network.clone(),
        ));

        let message_handler = RealtimeMessageHandler::new(
            stats.clone(),
            block_processor.clone(),
            representatives.clone(),
            request_aggregator.clone(),
            active.clone(),
        );

        // Locally generated votes are processed like votes from peers
        let active_w = Arc::downgrade(&active);
        vote_broadcaster.set_local_sink(Arc::new(move |vote, source| {
            if let Some(active) = active_w.upgrade() {
                active.vote(vote, source);
            }
        }));

        let active_w = Arc::downgrade(&active);
        let ledger_l = ledger.clone();
        block_processor.add_processed_observer(Box::new(move |status, context| {
            let Some(active) = active_w.upgrade() else {
                return;
            };
            match status {
                BlockStatus::Progress => {
                    if matches!(context.source, BlockSource::Live | BlockSource::Local) {
                        if let Some(saved) = &context.saved_block {
                            let txn = ledger_l.read_txn();
                            activate(&ledger_l, &active, &txn, &saved.account());
                        }
                    }
                }
                BlockStatus::Fork => {
                    active.publish_block(&context.block);
                }
                _ => {}
            }
        }));

        let active_w = Arc::downgrade(&active);
        block_processor.add_rolled_back_observer(Box::new(move |blocks, replacement_root| {
            if let Some(active) = active_w.upgrade() {
                for block in blocks {
                    active.block_rolled_back(block, &replacement_root);
                }
            }
        }));

        let processor_w = Arc::downgrade(&block_processor);
        unchecked.add_satisfied_observer(Box::new(move |info| {
            if let Some(processor) = processor_w.upgrade() {
                processor.add(info.block.clone(), BlockSource::Unknown);
            }
        }));

        let active_w = Arc::downgrade(&active);
        confirming_set.on_cemented(Box::new(move |block| {
            if let Some(active) = active_w.upgrade() {
                active.block_cemented(block);
            }
        }));

        let active_w: Weak<ActiveElections> = Arc::downgrade(&active);
        let ledger_l = ledger.clone();
        active.set_activate_successors(Box::new(move |block| {
            if let Some(active) = active_w.upgrade() {
                let txn = ledger_l.read_txn();
                activate_successors(&ledger_l, &active, &txn, block);
            }
        }));

        let online_weight_sampler = OnlineWeightSampler::new(
            online_reps.clone(),
            network_params.network.online_weight_period,
        );

        Ok(Self {
            config,
            network_params,
            stats,
            store,
            ledger,
            unchecked,
            network,
            online_reps,
            representatives,
            history,
            vote_cache,
            vote_broadcaster,
            vote_generators,
            confirming_set,
            block_processor,
            active,
            request_aggregator,
            message_handler,
            online_weight_sampler,
        })
    }

    pub fn new_test_instance() -> Self {
        Self::new_test_instance_with_config(NodeConfig::new_test_instance())
    }

    pub fn new_test_instance_with_config(config: NodeConfig) -> Self {
        match Self::new(config, NetworkParams::unit_test()) {
            Ok(node) => node,
            Err(e) => panic!("could not create test node: {e}"),
        }
    }

    pub fn start(&self) {
        self.stats.start();
        self.block_processor.start();
        self.confirming_set.start();
        self.vote_generators.start();
        self.active.start();
        self.request_aggregator.start();
        self.online_weight_sampler.start();
        info!(
            network = self.network_params.network.current_network.as_str(),
            "Node started"
        );
    }

    pub fn stop(&self) {
        info!("Node stopping");
        self.online_weight_sampler.stop();
        self.request_aggregator.stop();
        self.active.stop();
        self.vote_generators.stop();
        self.confirming_set.stop();
        self.block_processor.stop();
        self.stats.stop();
    }

    /// Handles a message received from a peer
    pub fn inbound(&self, message: Message, channel: &Arc<Channel>) {
        self.message_handler.process(message, channel);
    }

    /// Adds a key to the local representatives used for voting
    pub fn insert_into_wallet(&self, key: &PrivateKey) {
        self.representatives.insert(key.clone());
    }

    /// Inserts a block directly into the ledger, bypassing the block processor
    pub fn process(&self, block: Block) -> Result<SavedBlock, BlockStatus> {
        let mut txn = self.ledger.rw_txn();
        self.ledger.process(&mut txn, &block)
    }

    pub fn process_multi(&self, blocks: &[Block]) {
        let mut txn = self.ledger.rw_txn();
        for (i, block) in blocks.iter().enumerate() {
            if let Err(status) = self.ledger.process(&mut txn, block) {
                panic!("block {i} could not be processed: {status:?}");
            }
        }
    }

    /// Queues a block that was published by a peer
    pub fn process_active(&self, block: Block) {
        self.block_processor.process_active(block);
    }

    /// Processes a block created by this node and waits for the result
    pub fn process_local(&self, block: Block) -> Option<BlockStatus> {
        self.block_processor.add_blocking(block, BlockSource::Local)
    }

    pub fn block(&self, hash: &BlockHash) -> Option<SavedBlock> {
        let txn = self.ledger.read_txn();
        self.ledger.any().get_block(&txn, hash)
    }

    pub fn block_exists(&self, hash: &BlockHash) -> bool {
        let txn = self.ledger.read_txn();
        self.ledger.any().block_exists(&txn, hash)
    }

    pub fn latest(&self, account: &Account) -> BlockHash {
        let txn = self.ledger.read_txn();
        self.ledger.latest(&txn, account).unwrap_or_default()
    }

    pub fn balance(&self, account: &Account) -> Amount {
        let txn = self.ledger.read_txn();
        self.ledger
            .any()
            .account_balance(&txn, account)
            .unwrap_or_default()
    }

    pub fn block_confirmed(&self, hash: &BlockHash) -> bool {
        let txn = self.ledger.read_txn();
        self.ledger.confirmed().block_exists(&txn, hash)
    }

    pub fn blocks_confirmed(&self, blocks: &[Block]) -> bool {
        let txn = self.ledger.read_txn();
        blocks
            .iter()
            .all(|b| self.ledger.confirmed().block_exists(&txn, &b.hash()))
    }

    /// Cements a block and its dependencies without an election
    pub fn confirm(&self, hash: BlockHash) {
        let mut txn = self.ledger.rw_txn();
        self.ledger.confirm(&mut txn, hash);
    }

    pub fn confirm_multi(&self, blocks: &[Block]) {
        for block in blocks {
            self.confirm(block.hash());
        }
    }

    /// Starts an election for the first unconfirmed block of the account
    pub fn activate(&self, account: &Account) -> bool {
        let txn = self.ledger.read_txn();
        activate(&self.ledger, &self.active, &txn, account)
    }
}

/// Starts an election for the first unconfirmed block of the account,
/// once all of its dependencies are confirmed
fn activate(
    ledger: &Ledger,
    active: &Arc<ActiveElections>,
    txn: &dyn Transaction,
    account: &Account,
) -> bool {
    let Some(info) = ledger.any().get_account(txn, account) else {
        return false;
    };
    let conf_info = ledger
        .get_confirmation_height(txn, account)
        .unwrap_or_default();
    if conf_info.height >= info.block_count {
        return false;
    }

    let hash = if conf_info.height == 0 {
        info.open_block
    } else {
        match ledger.any().block_successor(txn, &conf_info.frontier) {
            Some(successor) => successor,
            None => return false,
        }
    };

    let Some(block) = ledger.any().get_block(txn, &hash) else {
        return false;
    };
    if !ledger.dependents_confirmed(txn, &block) {
        return false;
    }

    let (inserted, _) = active.insert(&Arc::new(block.into()), ElectionBehavior::Normal);
    inserted
}

fn activate_successors(
    ledger: &Ledger,
    active: &Arc<ActiveElections>,
    txn: &dyn Transaction,
    block: &SavedBlock,
) -> bool {
    let mut result = activate(ledger, active, txn, &block.account());
    // Start the next unconfirmed block of the receiving account
    if let Some(destination) = block.destination() {
        if block.is_send() && !destination.is_zero() && destination != block.account() {
            result |= activate(ledger, active, txn, &destination);
        }
    }
    result
}

/// Periodically records the online weight for trending
struct OnlineWeightSampler {
    online_reps: Arc<Mutex<OnlineReps>>,
    interval: std::time::Duration,
    stopped: Arc<(Mutex<bool>, Condvar)>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl OnlineWeightSampler {
    fn new(online_reps: Arc<Mutex<OnlineReps>>, interval: std::time::Duration) -> Self {
        Self {
            online_reps,
            interval,
            stopped: Arc::new((Mutex::new(false), Condvar::new())),
            thread: Mutex::new(None),
        }
    }

    fn start(&self) {
        let online_reps = self.online_reps.clone();
        let stopped = self.stopped.clone();
        let interval = self.interval;
        let spawned = std::thread::Builder::new()
            .name("Online reps".to_string())
            .spawn(move || {
                let (mutex, condition) = &*stopped;
                let mut guard = mutex.lock().unwrap();
                while !*guard {
                    guard = condition
                        .wait_timeout_while(guard, interval, |stopped| !*stopped)
                        .unwrap()
                        .0;
                    if !*guard {
                        online_reps.lock().unwrap().sample();
                    }
                }
            });
        match spawned {
            Ok(handle) => *self.thread.lock().unwrap() = Some(handle),
            Err(e) => error!("Could not spawn online reps thread: {e}"),
        }
    }

    fn stop(&self) {
        let (mutex, condition) = &*self.stopped;
        *mutex.lock().unwrap() = true;
        condition.notify_all();
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Online reps thread panicked");
            }
        }
    }
}
