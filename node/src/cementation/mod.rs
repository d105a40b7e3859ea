mod confirming_set;

pub use confirming_set::*;
use lattice_core::{BlockHash, SavedBlock};

type BlockCallback = Box<dyn FnMut(&SavedBlock) + Send>;
type AlreadyCementedCallback = Box<dyn FnMut(&BlockHash) + Send>;
