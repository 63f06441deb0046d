//! Arena: pit two move policies against each other and tally outcomes.

use mz_core::{Game, GameError, Outcome, Role, RoleTable, State};
use mz_mcts::{Mcts, MctsConfig, MctsError};
use mz_oracle::Oracle;
use thiserror::Error;

/// Defensive cap on game length; a contract-honoring game terminates well
/// before this.
const MAX_PLIES: u32 = 4096;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("game exceeded {plies} plies without terminating")]
    GameStalled { plies: u32 },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Search(#[from] MctsError),
}

/// An action-selection policy playing one side of an arena game.
pub trait MovePolicy<G: Game> {
    fn choose(&mut self, state: &State<G::View>) -> Result<usize, ArenaError>;
}

/// Greedy MCTS policy: arg-max of the visit-count distribution at zero
/// temperature, searching with its own pair of role oracles.
pub struct MctsPolicy<'g, G: Game, O: Oracle> {
    mcts: Mcts<'g, G, O>,
}

impl<'g, G: Game, O: Oracle> MctsPolicy<'g, G, O> {
    pub fn new(
        game: &'g G,
        oracles: &'g RoleTable<O>,
        cfg: MctsConfig,
        seed: u64,
    ) -> Result<Self, MctsError> {
        Ok(Self {
            mcts: Mcts::new(game, oracles, cfg, seed)?,
        })
    }
}

impl<'g, G: Game, O: Oracle> MovePolicy<G> for MctsPolicy<'g, G, O> {
    fn choose(&mut self, state: &State<G::View>) -> Result<usize, ArenaError> {
        let pi = self.mcts.action_distribution(state, 0.0)?;
        let best = pi
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(a, _)| a)
            .unwrap_or(0);
        Ok(best)
    }
}

/// Outcome of a single arena game, attributed to roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    FirstWins,
    SecondWins,
    Draw,
}

/// Aggregate tally over an arena match. The first policy always plays
/// `Role::First`, the second `Role::Second`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchTally {
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
}

impl MatchTally {
    pub fn games(&self) -> u32 {
        self.first_wins + self.second_wins + self.draws
    }
}

/// Play a single game to termination and attribute the outcome.
pub fn play_game<G: Game>(
    game: &G,
    first: &mut impl MovePolicy<G>,
    second: &mut impl MovePolicy<G>,
) -> Result<GameResult, ArenaError> {
    let mut state = game.initial_state();
    let mut plies = 0u32;

    while !state.is_terminal() {
        if plies >= MAX_PLIES {
            return Err(ArenaError::GameStalled { plies });
        }
        let actor = state.to_move;
        let action = match actor {
            Role::First => first.choose(&state)?,
            Role::Second => second.choose(&state)?,
        };
        state = game.transition(&state, actor, action)?;
        plies += 1;
    }

    // The outcome is relative to the current player at the moment the game
    // ended.
    let result = match state.outcome {
        Outcome::Draw => GameResult::Draw,
        Outcome::Win => role_result(state.to_move),
        Outcome::Loss => role_result(state.to_move.other()),
        Outcome::Ongoing => unreachable!("loop exits only on terminal states"),
    };
    Ok(result)
}

fn role_result(winner: Role) -> GameResult {
    match winner {
        Role::First => GameResult::FirstWins,
        Role::Second => GameResult::SecondWins,
    }
}

/// Play `games` games between the two policies and tally results.
pub fn eval_games<G: Game>(
    game: &G,
    first: &mut impl MovePolicy<G>,
    second: &mut impl MovePolicy<G>,
    games: u32,
) -> Result<MatchTally, ArenaError> {
    let mut tally = MatchTally::default();
    for i in 0..games {
        match play_game(game, first, second)? {
            GameResult::FirstWins => tally.first_wins += 1,
            GameResult::SecondWins => tally.second_wins += 1,
            GameResult::Draw => tally.draws += 1,
        }
        log::debug!(
            "arena game {}/{}: {}W/{}L/{}D",
            i + 1,
            games,
            tally.first_wins,
            tally.second_wins,
            tally.draws
        );
    }
    Ok(tally)
}
