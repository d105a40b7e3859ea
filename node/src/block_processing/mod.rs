mod block_processor;
mod unchecked_map;

pub use block_processor::*;
pub use unchecked_map::*;
