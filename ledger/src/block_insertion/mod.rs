mod block_inserter;
mod validation;
mod validator_factory;

pub(crate) use block_inserter::{BlockInserter, BlockInsertInstructions};
pub(crate) use validator_factory::BlockValidatorFactory;
