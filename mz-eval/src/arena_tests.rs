use crate::arena::{eval_games, play_game, ArenaError, GameResult, MovePolicy};
use crate::gate::{GateDecision, GateReport};
use crate::MatchTally;
use mz_core::{EncodedState, Game, GameError, NodeKey, Outcome, Role, State};

/// Deterministic one-move game: action 0 wins for the mover, action 1 loses.
struct OpeningDecides;

impl Game for OpeningDecides {
    type View = ();

    fn alternate_turn(&self) -> bool {
        false
    }

    fn player_agnostic_state(&self) -> bool {
        false
    }

    fn initial_state(&self) -> State<()> {
        State::new((), (), Role::First)
    }

    fn encode(&self, _state: &State<()>) -> EncodedState {
        EncodedState {
            active: vec![0.0],
            other: vec![0.0],
        }
    }

    fn shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_count(&self) -> usize {
        2
    }

    fn transition(&self, state: &State<()>, player: Role, action: usize) -> Result<State<()>, GameError> {
        if state.is_terminal() || action >= 2 {
            return Err(GameError::IllegalAction {
                action,
                role: player,
            });
        }
        let mut next = state.clone();
        next.outcome = if action == 0 {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        Ok(next)
    }

    fn legal_actions(&self, _state: &State<()>, _player: Role) -> Vec<bool> {
        vec![true, true]
    }

    fn canonical_key(&self, state: &State<()>) -> NodeKey {
        format!("opening:{}", state.to_move.sign())
    }
}

struct Always(usize);

impl<G: Game> MovePolicy<G> for Always {
    fn choose(&mut self, _state: &State<G::View>) -> Result<usize, ArenaError> {
        Ok(self.0)
    }
}

#[test]
fn winning_opener_wins_every_game() {
    let game = OpeningDecides;
    let mut first = Always(0);
    let mut second = Always(1);

    let tally = eval_games(&game, &mut first, &mut second, 6).unwrap();
    assert_eq!(
        tally,
        MatchTally {
            first_wins: 6,
            second_wins: 0,
            draws: 0
        }
    );
}

#[test]
fn losing_opener_loses_every_game() {
    let game = OpeningDecides;
    let mut first = Always(1);
    let mut second = Always(0);

    // First's losing opener ends the game before Second ever moves, and the
    // loss is attributed relative to the terminal mover.
    let result = play_game(&game, &mut first, &mut second).unwrap();
    assert_eq!(result, GameResult::SecondWins);
}

#[test]
fn gate_rejects_at_even_split() {
    let report = GateReport {
        games: 10,
        new_wins: 5,
        prev_wins: 5,
        draws: 0,
    };
    assert!((report.win_rate() - 0.5).abs() < 1e-12);
    assert_eq!(report.decide(0.6), GateDecision::Reject);
}

#[test]
fn gate_promotes_above_threshold() {
    let report = GateReport {
        games: 10,
        new_wins: 7,
        prev_wins: 3,
        draws: 0,
    };
    assert!((report.win_rate() - 0.7).abs() < 1e-12);
    assert_eq!(report.decide(0.6), GateDecision::Promote);
}

#[test]
fn gate_treats_all_draws_as_rejection() {
    let report = GateReport {
        games: 8,
        new_wins: 0,
        prev_wins: 0,
        draws: 8,
    };
    assert_eq!(report.win_rate(), 0.0);
    assert_eq!(report.decide(0.6), GateDecision::Reject);
}

#[test]
fn report_maps_tally_sides() {
    let tally = MatchTally {
        first_wins: 3,
        second_wins: 2,
        draws: 1,
    };
    let report = GateReport::from_tally(tally);
    assert_eq!(report.games, 6);
    assert_eq!(report.new_wins, 3);
    assert_eq!(report.prev_wins, 2);
    assert_eq!(report.draws, 1);
}
