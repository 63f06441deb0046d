//! mz-mcts: PUCT search for AlphaZero-style self-play.
//!
//! The design uses:
//! - the abstract `mz_core::Game` contract (no concrete rules here)
//! - canonical-string node keys into an explicit statistics table
//! - one oracle per role, selected by the state's current player
//! - rollout-free leaf evaluation: one oracle call per expansion

pub mod mcts;
pub mod table;

pub use mcts::{Mcts, MctsConfig, MctsError, SearchStats, EPS};
pub use table::{EdgeStats, NodeStats, StatsTable};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
