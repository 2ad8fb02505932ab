//! Multi-judge, multi-criterion scoring over a replicated document store,
//! with a tie-aware competition leaderboard.

pub mod browser;
pub mod commands;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod scoring;
pub mod store;
pub mod sync;
