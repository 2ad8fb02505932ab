pub mod engine;
pub mod filter;

pub use engine::{assign_ranks, leaderboard, rank, RankedParticipant};
pub use filter::{filter_by_level, LevelFilter};
