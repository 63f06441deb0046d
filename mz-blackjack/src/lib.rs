//! mz-blackjack: player-vs-dealer blackjack as a two-phase game.
//!
//! `Role::First` is the player, `Role::Second` the dealer. The game is not
//! turn-alternating: a player keeps the move while hitting and only a stand
//! hands the deal over, so search values are negated only at the handoff.

use std::cell::RefCell;

use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mz_core::{EncodedState, Game, GameError, NodeKey, Outcome, Role, State};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ACTION_HIT: usize = 0;
pub const ACTION_STAND: usize = 1;

/// Ranks A, 2..10, J, Q, K by index.
pub const NUM_RANKS: usize = 13;

/// Ace counts as 1 here; the soft +10 is applied in `hand_values`.
const CARD_VALUES: [u32; NUM_RANKS] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

const COPIES_PER_RANK: u8 = 4;

/// A hand is the ordered list of rank indices as dealt. Order matters for one
/// thing only: `hand[0]` is the dealer's face-up card.
pub type Hand = Vec<u8>;

#[derive(Debug)]
pub struct Blackjack {
    rng: RefCell<ChaCha8Rng>,
}

impl Blackjack {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Draw one card weighted by the counts remaining in the deck after
    /// removing both hands.
    fn deal_card(&self, active: &Hand, other: &Hand) -> Result<u8, GameError> {
        let mut remaining = [COPIES_PER_RANK; NUM_RANKS];
        for &card in active.iter().chain(other.iter()) {
            let slot = remaining
                .get_mut(card as usize)
                .ok_or(GameError::InvalidState {
                    msg: "hand holds an out-of-range rank",
                })?;
            *slot = slot.checked_sub(1).ok_or(GameError::InvalidState {
                msg: "more copies of a rank in play than the deck holds",
            })?;
        }
        let dist =
            WeightedIndex::new(remaining.iter().map(|&n| u32::from(n))).map_err(|_| {
                GameError::InvalidState {
                    msg: "deck exhausted",
                }
            })?;
        Ok(self.rng.borrow_mut().sample(dist) as u8)
    }
}

fn rank_counts(hand: &Hand) -> [u8; NUM_RANKS] {
    let mut counts = [0u8; NUM_RANKS];
    for &card in hand {
        counts[card as usize] += 1;
    }
    counts
}

/// All totals a hand can stand on: the hard total plus one entry per ace
/// promoted from 1 to 11, dropping anything over 21. A busted hand yields
/// just its hard total.
fn hand_values(counts: &[u8; NUM_RANKS]) -> Vec<u32> {
    let base: u32 = counts
        .iter()
        .zip(CARD_VALUES.iter())
        .map(|(&n, &v)| u32::from(n) * v)
        .sum();
    let aces = u32::from(counts[0]);
    if aces == 0 || base > 21 {
        return vec![base];
    }
    (0..=aces)
        .map(|i| base + 10 * i)
        .filter(|&v| v <= 21)
        .collect()
}

fn min_value(counts: &[u8; NUM_RANKS]) -> u32 {
    hand_values(counts)[0]
}

fn best_value(counts: &[u8; NUM_RANKS]) -> u32 {
    *hand_values(counts)
        .last()
        .expect("hand_values is never empty")
}

/// The player's hand and the scalar the mover conditions on: the dealer's
/// up-card while the player acts, the dealer's best total once the dealer
/// does.
fn player_counts_and_context(state: &State<Hand>) -> ([u8; NUM_RANKS], u32) {
    match state.to_move {
        Role::First => {
            let counts = rank_counts(&state.active);
            let upcard = CARD_VALUES[state.other[0] as usize];
            (counts, upcard)
        }
        Role::Second => {
            let counts = rank_counts(&state.other);
            let dealer_best = best_value(&rank_counts(&state.active));
            (counts, dealer_best)
        }
    }
}

fn encode_hand(counts: &[u8; NUM_RANKS], context: u32) -> Vec<f32> {
    let mut v: Vec<f32> = counts.iter().map(|&n| f32::from(n)).collect();
    v.push(context as f32);
    v
}

impl Game for Blackjack {
    type View = Hand;

    fn alternate_turn(&self) -> bool {
        false
    }

    fn player_agnostic_state(&self) -> bool {
        false
    }

    fn initial_state(&self) -> State<Hand> {
        let mut player: Hand = Vec::with_capacity(4);
        let mut dealer: Hand = Vec::with_capacity(4);
        for _ in 0..2 {
            // Four cards from a fresh deck can't exhaust it.
            let card = self
                .deal_card(&player, &dealer)
                .expect("fresh deck has cards");
            player.push(card);
            let card = self
                .deal_card(&player, &dealer)
                .expect("fresh deck has cards");
            dealer.push(card);
        }
        State::new(player, dealer, Role::First)
    }

    fn encode(&self, state: &State<Hand>) -> EncodedState {
        match state.to_move {
            Role::First => {
                let player = rank_counts(&state.active);
                let dealer = rank_counts(&state.other);
                let upcard = CARD_VALUES[state.other[0] as usize];
                EncodedState {
                    active: encode_hand(&player, upcard),
                    other: encode_hand(&dealer, best_value(&player)),
                }
            }
            Role::Second => {
                let dealer = rank_counts(&state.active);
                let player = rank_counts(&state.other);
                let upcard = CARD_VALUES[state.active[0] as usize];
                EncodedState {
                    active: encode_hand(&dealer, best_value(&player)),
                    other: encode_hand(&player, upcard),
                }
            }
        }
    }

    fn shape(&self) -> Vec<usize> {
        vec![NUM_RANKS + 1]
    }

    fn action_count(&self) -> usize {
        2
    }

    fn transition(
        &self,
        state: &State<Hand>,
        player: Role,
        action: usize,
    ) -> Result<State<Hand>, GameError> {
        if state.is_terminal() {
            return Err(GameError::InvalidState {
                msg: "transition on a terminal state",
            });
        }
        let legal = self.legal_actions(state, player);
        if action >= legal.len() || !legal[action] {
            return Err(GameError::IllegalAction {
                action,
                role: player,
            });
        }

        let mut next = state.clone();
        match action {
            ACTION_HIT => {
                let card = self.deal_card(&next.active, &next.other)?;
                next.active.push(card);
                if min_value(&rank_counts(&next.active)) > 21 {
                    // Bust; the move does not pass, the mover just lost.
                    next.outcome = Outcome::Loss;
                }
                Ok(next)
            }
            ACTION_STAND => match player {
                Role::First => Ok(next.swap_views()),
                Role::Second => {
                    let dealer_sum = best_value(&rank_counts(&next.active));
                    let player_sum = best_value(&rank_counts(&next.other));
                    next.outcome = if player_sum > dealer_sum {
                        Outcome::Loss
                    } else if player_sum == dealer_sum {
                        Outcome::Draw
                    } else {
                        Outcome::Win
                    };
                    Ok(next)
                }
            },
            _ => unreachable!("legality check rejects out-of-range actions"),
        }
    }

    fn legal_actions(&self, state: &State<Hand>, player: Role) -> Vec<bool> {
        let values = hand_values(&rank_counts(&state.active));
        let min = values[0];
        let max = *values.last().expect("hand_values is never empty");
        match player {
            Role::First => {
                if min > 21 {
                    vec![false, false]
                } else {
                    vec![true, true]
                }
            }
            Role::Second => {
                if min > 21 {
                    vec![false, false]
                } else if max < 17 {
                    // House rule: the dealer must hit below 17.
                    vec![true, false]
                } else {
                    vec![true, true]
                }
            }
        }
    }

    fn canonical_key(&self, state: &State<Hand>) -> NodeKey {
        let (counts, context) = player_counts_and_context(state);
        let mut key = String::with_capacity(NUM_RANKS + 8);
        for n in counts {
            key.push_str(&n.to_string());
        }
        format!("{key}:{context}:{}", state.to_move.sign())
    }
}
