mod local_vote_history;
mod vote_generator;
mod vote_generators;
mod vote_spacing;

pub use local_vote_history::LocalVoteHistory;
pub use vote_generators::VoteGenerators;
pub use vote_spacing::VoteSpacing;

/// Hashes per generated vote
pub const MAX_HASHES_PER_VOTE: usize = vote_generator::VoteGenerator::MAX_HASHES;
