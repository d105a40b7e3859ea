#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate anyhow;

pub mod block_processing;
pub mod cementation;
pub mod config;
pub mod consensus;
mod node;
pub mod representatives;
pub mod stats;
pub mod transport;
pub mod wallets;

pub use config::{NetworkParams, NodeConfig};
pub use node::Node;
pub use representatives::{OnlineReps, ONLINE_WEIGHT_QUORUM};
