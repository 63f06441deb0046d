//! mz-eval: arena games + gate decision for candidate vs best oracles.

pub mod arena;
pub mod gate;

pub use arena::{eval_games, play_game, ArenaError, GameResult, MatchTally, MctsPolicy, MovePolicy};
pub use gate::{GateDecision, GateReport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod arena_tests;
