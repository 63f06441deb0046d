//! Self-play episode generation.

use mz_core::{Game, RoleTable};
use mz_mcts::{Mcts, MctsConfig};
use mz_oracle::{Oracle, TrainingExample};
use rand::distributions::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::CoachError;

/// Defensive cap on episode length; a contract-honoring game terminates well
/// before this.
const MAX_PLIES: u32 = 4096;

/// Play one self-play episode to termination and return its labelled
/// training examples.
///
/// A fresh search tree is built per episode. Executed moves are sampled from
/// the visit-count distribution at temperature 1 while the ply count is below
/// `temp_threshold` and greedily (temperature 0) after. Examples are recorded
/// before each move, one per symmetry, and the terminal outcome is
/// back-filled relative to each example's recording role once the episode
/// ends.
pub fn run_episode<G: Game, O: Oracle>(
    game: &G,
    oracles: &RoleTable<O>,
    cfg: MctsConfig,
    temp_threshold: u32,
    seed: u64,
) -> Result<Vec<TrainingExample>, CoachError> {
    let mut mcts = Mcts::new(game, oracles, cfg, seed)?;
    // Move sampling draws from a stream independent of the search's.
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x51_7CC1_B727_220A95);

    let mut state = game.initial_state();
    let mut pending: Vec<TrainingExample> = Vec::new();
    let mut step = 0u32;

    while !state.is_terminal() {
        if step >= MAX_PLIES {
            return Err(CoachError::EpisodeStalled { plies: step });
        }
        step += 1;
        let temperature = if step < temp_threshold { 1.0 } else { 0.0 };

        let pi = mcts.action_distribution(&state, temperature)?;
        let recorder = state.to_move;
        for (sym_state, sym_pi) in game.symmetries(&state, &pi) {
            pending.push(TrainingExample {
                features: game.encode(&sym_state).active,
                role: recorder,
                pi: sym_pi,
                z: 0.0,
            });
        }

        let dist = WeightedIndex::new(&pi).map_err(|_| CoachError::DegenerateMoveDistribution)?;
        let action = rng.sample(dist);
        state = game.transition(&state, recorder, action)?;
    }

    // Terminal value is relative to whoever holds the move at the end; flip
    // it for examples the other side recorded.
    let r = game.terminal_value(&state, state.to_move);
    let terminal_mover = state.to_move;
    for ex in &mut pending {
        ex.z = if ex.role == terminal_mover { r } else { -r };
    }
    Ok(pending)
}
