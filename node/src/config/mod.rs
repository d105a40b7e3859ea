mod network_constants;
mod network_params;
mod node_config;
mod toml;

pub use lattice_core::Networks;
pub use network_constants::*;
pub use network_params::NetworkParams;
pub use node_config::NodeConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
pub use toml::*;

pub fn get_node_toml_config_path(data_path: impl Into<PathBuf>) -> PathBuf {
    let mut node_toml = data_path.into();
    node_toml.push("config-node.toml");
    node_toml
}

pub fn read_toml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("could not read {}: {e}", path.display()))?;
    ::toml::from_str(&toml_str).map_err(|e| e.into())
}
