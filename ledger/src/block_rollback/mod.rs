mod instructions_executor;
mod planner_factory;
mod rollback_performer;
mod rollback_planner;
#[cfg(test)]
mod tests;

pub(crate) use rollback_performer::BlockRollbackPerformer;
