use lattice_core::{Block, BlockHash};
use lattice_node::{
    consensus::{ActiveElectionsExt, Election, ElectionBehavior},
    transport::{Channel, Message},
    Node, NodeConfig, NetworkParams,
};
use std::{
    sync::{Arc, Mutex, OnceLock},
    thread::sleep,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

pub struct System {
    network_params: NetworkParams,
    nodes: Vec<Arc<Node>>,
}

impl System {
    pub fn new() -> Self {
        init_tracing();
        Self {
            network_params: NetworkParams::unit_test(),
            nodes: Vec::new(),
        }
    }

    pub fn default_config() -> NodeConfig {
        NodeConfig::new_test_instance()
    }

    pub fn build_node(&mut self) -> NodeBuilder<'_> {
        NodeBuilder {
            system: self,
            config: None,
        }
    }

    pub fn make_node(&mut self) -> Arc<Node> {
        self.build_node().finish()
    }

    fn make_node_with(&mut self, config: NodeConfig) -> Arc<Node> {
        let node = match Node::new(config, self.network_params.clone()) {
            Ok(node) => Arc::new(node),
            Err(e) => panic!("could not create node: {e}"),
        };
        node.start();
        self.nodes.push(node.clone());
        node
    }

    fn stop(&mut self) {
        for node in &self.nodes {
            node.stop();
        }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for System {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct NodeBuilder<'a> {
    system: &'a mut System,
    config: Option<NodeConfig>,
}

impl NodeBuilder<'_> {
    pub fn config(mut self, cfg: NodeConfig) -> Self {
        self.config = Some(cfg);
        self
    }

    pub fn finish(self) -> Arc<Node> {
        let config = self.config.unwrap_or_else(System::default_config);
        self.system.make_node_with(config)
    }
}

/// A channel of the node that records everything sent to it
pub fn make_fake_channel(node: &Node) -> (Arc<Channel>, Arc<Mutex<Vec<Message>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_l = received.clone();
    let channel = node
        .network
        .add(move |msg| received_l.lock().unwrap().push(msg.clone()));
    (channel, received)
}

pub fn start_election(node: &Node, hash: &BlockHash) -> Arc<Election> {
    assert_timely_msg(
        Duration::from_secs(5),
        || node.block_exists(hash),
        "block not in ledger",
    );

    let block: Block = node.block(hash).unwrap().into();
    let (_, election) = node
        .active
        .insert(&Arc::new(block.clone()), ElectionBehavior::Normal);
    election.unwrap_or_else(|| panic!("election for {hash} not started"))
}

pub fn start_elections(node: &Node, hashes: &[BlockHash], forced: bool) {
    for hash in hashes {
        let election = start_election(node, hash);
        if forced {
            node.active.force_confirm(&election);
        }
    }
}

pub fn assert_never(duration: Duration, mut check: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < duration {
        if check() {
            panic!("never check failed");
        }
        sleep(Duration::from_millis(50));
    }
}

pub fn assert_timely<F>(timeout: Duration, check: F)
where
    F: FnMut() -> bool,
{
    assert_timely_msg(timeout, check, "timeout");
}

pub fn assert_timely_msg<F>(timeout: Duration, mut check: F, error_message: &str)
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return;
        }
        sleep(Duration::from_millis(50));
    }
    panic!("{}", error_message);
}

pub fn assert_timely_eq<T, F>(timeout: Duration, mut check: F, expected: T)
where
    T: PartialEq + std::fmt::Debug + Clone,
    F: FnMut() -> T,
{
    let start = Instant::now();
    let mut actual = expected.clone();
    while start.elapsed() < timeout {
        actual = check();
        if actual == expected {
            return;
        }
        sleep(Duration::from_millis(50));
    }
    panic!("timeout. expected: {expected:?}, actual: {actual:?}");
}

pub fn assert_always_eq<T, F>(time: Duration, mut condition: F, expected: T)
where
    T: PartialEq + std::fmt::Debug,
    F: FnMut() -> T,
{
    let start = Instant::now();
    while start.elapsed() < time {
        assert_eq!(condition(), expected);
        sleep(Duration::from_millis(50));
    }
}

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let dirs = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or(String::from("off"));
        let filter = EnvFilter::builder().parse_lossy(dirs);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(true)
            .init();
    });
}
