//! The abstract game contract every concrete game implements.

use crate::state::{Role, State};
use thiserror::Error;

/// Canonical node key for search statistics.
///
/// Must be injective over game-semantically-distinct states, must fold in the
/// current player (so a state and its role-swapped counterpart never collide),
/// and must be stable: same state, same key, every call.
pub type NodeKey = String;

/// Fixed-shape feature pair fed to the policy-value oracle.
///
/// `active` encodes the acting side's view, `other` the opposing side's.
/// Encoding must be deterministic given the state.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState {
    pub active: Vec<f32>,
    pub other: Vec<f32>,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("illegal action {action} for {role:?} in current state")]
    IllegalAction { action: usize, role: Role },
    #[error("invalid state: {msg}")]
    InvalidState { msg: &'static str },
}

/// Rules contract for a two-phase, alternating-player game.
///
/// Two strategy flags shape how the search interprets states:
/// - `alternate_turn`: turns are symmetric in sign, so backed-up values follow
///   the zero-sum negation convention at every level of the recursion.
/// - `player_agnostic_state`: successor states must be projected through
///   `canonicalize` before they are reused as search keys.
pub trait Game {
    /// Game-specific representation of one side's visible information.
    type View: Clone;

    fn alternate_turn(&self) -> bool;
    fn player_agnostic_state(&self) -> bool;

    /// Fresh game start.
    fn initial_state(&self) -> State<Self::View>;

    /// Feature extraction; total and deterministic.
    fn encode(&self, state: &State<Self::View>) -> EncodedState;

    /// Static feature sizing info for the oracle.
    fn shape(&self) -> Vec<usize>;

    /// Number of actions; actions are indices `0..action_count()`.
    fn action_count(&self) -> usize;

    /// Advance the game by one action.
    ///
    /// Fails with `GameError::IllegalAction` when the action is not legal for
    /// `player` in `state`. Referentially transparent apart from game chance:
    /// any randomness (e.g. dealing a card) is drawn fresh per call.
    fn transition(
        &self,
        state: &State<Self::View>,
        player: Role,
        action: usize,
    ) -> Result<State<Self::View>, GameError>;

    /// Legality vector of length `action_count()`: `true` where playable.
    fn legal_actions(&self, state: &State<Self::View>, player: Role) -> Vec<bool>;

    /// Project to a player-agnostic form; identity when the game does not set
    /// `player_agnostic_state`.
    fn canonicalize(&self, state: State<Self::View>, player: Role) -> State<Self::View> {
        let _ = player;
        state
    }

    /// Game-symmetric `(state, policy)` augmentations for training.
    fn symmetries(
        &self,
        state: &State<Self::View>,
        pi: &[f32],
    ) -> Vec<(State<Self::View>, Vec<f32>)> {
        vec![(state.clone(), pi.to_vec())]
    }

    /// Terminal sentinel relative to `player`; 0 while ongoing.
    fn terminal_value(&self, state: &State<Self::View>, player: Role) -> f32 {
        let _ = player;
        state.outcome.value()
    }

    /// Canonical search key; see `NodeKey` invariants.
    fn canonical_key(&self, state: &State<Self::View>) -> NodeKey;
}
