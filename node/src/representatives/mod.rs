mod online_reps;

pub use online_reps::{OnlineReps, ONLINE_WEIGHT_QUORUM};
