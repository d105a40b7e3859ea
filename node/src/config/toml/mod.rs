mod consensus_toml;
mod node_toml;

pub use consensus_toml::*;
pub use node_toml::*;
