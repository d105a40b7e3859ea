mod active_elections;
mod confirmation_solicitor;
mod election;
mod recently_confirmed_cache;
mod request_aggregator;
mod vote_broadcaster;
mod vote_cache;
mod vote_generation;

pub use active_elections::*;
pub use confirmation_solicitor::ConfirmationSolicitor;
pub use election::*;
pub use recently_confirmed_cache::RecentlyConfirmedCache;
pub use request_aggregator::*;
pub use vote_broadcaster::*;
pub use vote_cache::{VoteCache, VoteCacheConfig};
pub use vote_generation::*;
