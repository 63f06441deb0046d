//! mz-core: game contract + unified configuration.
//!
//! The `Game` trait is the seam between the learning core and any concrete
//! two-phase game; `Config` is the shared configuration surface consumed by
//! search, self-play and the iteration controller.

pub mod config;
pub mod game;
pub mod state;

pub use config::{
    Config, ConfigError, ControllerSection, GatingSection, MctsSection, ReplaySection,
    SelfplaySection,
};
pub use game::{EncodedState, Game, GameError, NodeKey};
pub use state::{Outcome, Role, RoleTable, State, DRAW_EPS};

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

#[cfg(test)]
mod state_tests;

#[cfg(test)]
mod config_tests;
