//! Core PUCT MCTS: recursive simulated descents guided by per-role oracles.

use crate::table::StatsTable;
use mz_core::{Game, GameError, Role, RoleTable, State};
use mz_oracle::Oracle;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Exploration bonus floor for unvisited nodes (keeps the PUCT numerator
/// non-zero when `N[s] == 0`).
pub const EPS: f32 = 1e-8;

/// Defensive recursion cap; a contract-honoring game terminates well before
/// this, a non-terminating transition chain surfaces as an error instead of a
/// stack overflow.
const MAX_SEARCH_DEPTH: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct MctsConfig {
    /// PUCT exploration constant.
    pub c_puct: f32,
    /// Simulated descents per action decision.
    pub num_simulations: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            c_puct: 1.5,
            num_simulations: 64,
        }
    }
}

impl From<&mz_core::MctsSection> for MctsConfig {
    fn from(s: &mz_core::MctsSection) -> Self {
        Self {
            c_puct: s.c_puct,
            num_simulations: s.num_simulations,
        }
    }
}

#[derive(Debug, Error)]
pub enum MctsError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("no legal actions at non-terminal node {key} (game contract violation)")]
    NoLegalActions { key: String },
    #[error("root has no visits; action distribution is undefined")]
    NoRootVisits,
    #[error("search depth {depth} exceeded; transition chain may not terminate")]
    DepthExceeded { depth: usize },
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Per-search observability counters.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    pub simulations: u32,
    pub expansions: u32,
    /// Times the oracle policy zeroed out every legal action and the priors
    /// fell back to uniform-over-legal.
    pub prior_fallbacks: u32,
}

/// One search engine instance: owns one statistics table, scoped to one
/// episode's searches. Never shared across episodes.
pub struct Mcts<'g, G: Game, O: Oracle> {
    game: &'g G,
    oracles: &'g RoleTable<O>,
    cfg: MctsConfig,
    table: StatsTable,
    stats: SearchStats,
    rng: ChaCha8Rng,
}

impl<'g, G: Game, O: Oracle> Mcts<'g, G, O> {
    pub fn new(
        game: &'g G,
        oracles: &'g RoleTable<O>,
        cfg: MctsConfig,
        seed: u64,
    ) -> Result<Self, MctsError> {
        if !(cfg.c_puct.is_finite() && cfg.c_puct > 0.0) {
            return Err(MctsError::InvalidConfig {
                msg: "c_puct must be finite and > 0",
            });
        }
        if cfg.num_simulations == 0 {
            return Err(MctsError::InvalidConfig {
                msg: "num_simulations must be > 0",
            });
        }
        Ok(Self {
            game,
            oracles,
            cfg,
            table: StatsTable::new(),
            stats: SearchStats::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn table(&self) -> &StatsTable {
        &self.table
    }

    /// Run `num_simulations` descents from `state`, then derive an action
    /// distribution from the root visit counts.
    ///
    /// - `temperature == 0`: one-hot on an action with maximal visit count,
    ///   ties broken uniformly at random.
    /// - `temperature > 0`: counts raised to `1/temperature`, normalized.
    pub fn action_distribution(
        &mut self,
        state: &State<G::View>,
        temperature: f32,
    ) -> Result<Vec<f32>, MctsError> {
        let root_key = self.game.canonical_key(state);

        // Expand the root up front (outside the simulation budget) so every
        // counted descent traverses at least one root edge.
        if !self.table.is_expanded(&root_key) {
            self.simulate(state)?;
        }
        for _ in 0..self.cfg.num_simulations {
            self.simulate(state)?;
        }

        let counts = self.table.visit_counts(&root_key, self.game.action_count());

        if temperature == 0.0 {
            let max = counts.iter().copied().max().unwrap_or(0);
            if max == 0 {
                return Err(MctsError::NoRootVisits);
            }
            let best: Vec<usize> = counts
                .iter()
                .enumerate()
                .filter(|(_, &n)| n == max)
                .map(|(a, _)| a)
                .collect();
            let chosen = best[self.rng.gen_range(0..best.len())];
            let mut pi = vec![0.0f32; counts.len()];
            pi[chosen] = 1.0;
            return Ok(pi);
        }

        let inv_t = 1.0f64 / (temperature as f64);
        let weights: Vec<f64> = counts.iter().map(|&n| (n as f64).powf(inv_t)).collect();
        let sum: f64 = weights.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(MctsError::NoRootVisits);
        }
        Ok(weights.iter().map(|w| (w / sum) as f32).collect())
    }

    /// One simulated descent; returns the backed-up value for the caller's
    /// level of the recursion.
    pub fn simulate(&mut self, state: &State<G::View>) -> Result<f32, MctsError> {
        self.stats.simulations += 1;
        self.descend(state, 0)
    }

    fn descend(&mut self, state: &State<G::View>, depth: usize) -> Result<f32, MctsError> {
        if depth >= MAX_SEARCH_DEPTH {
            return Err(MctsError::DepthExceeded { depth });
        }

        let key = self.game.canonical_key(state);
        // Alternate-turn games are evaluated canonically from role First;
        // two-phase games evaluate from the mover's own perspective.
        let player = if self.game.alternate_turn() {
            Role::First
        } else {
            state.to_move
        };

        let v = self.game.terminal_value(state, player);
        if v != 0.0 {
            return Ok(self.signed(v));
        }

        if !self.table.is_expanded(&key) {
            // Leaf expansion: one oracle evaluation. The oracle belongs to the
            // acting role (each role may carry a differently trained model).
            let encoded = self.game.encode(state);
            let (raw, value) = self.oracles[state.to_move].predict(&encoded.active);
            let legal = self.game.legal_actions(state, player);
            let priors = self.masked_priors(&raw, &legal, &key)?;
            self.table.expand(key, priors);
            self.stats.expansions += 1;
            return Ok(self.signed(value));
        }

        let legal = self.game.legal_actions(state, player);
        let action = self.select_action(&key, &legal)?;

        let next = self.game.transition(state, player, action)?;
        let next = if self.game.player_agnostic_state() {
            let to_move = next.to_move;
            self.game.canonicalize(next, to_move)
        } else {
            next
        };

        let mut child_value = self.descend(&next, depth + 1)?;
        // Asymmetric games switch roles without the automatic zero-sum
        // negation; reconcile the sign when the mover changed mid-tree.
        if !self.game.alternate_turn() && state.to_move != next.to_move {
            child_value = -child_value;
        }

        self.table.record_visit(&key, action, child_value);
        Ok(self.signed(child_value))
    }

    fn signed(&self, v: f32) -> f32 {
        if self.game.alternate_turn() {
            -v
        } else {
            v
        }
    }

    /// Mask raw oracle priors by legality and renormalize.
    ///
    /// If the oracle assigned ~zero probability to every legal action, fall
    /// back to uniform over legal actions; this is recoverable but indicates a
    /// poorly calibrated oracle, so it is warned and counted.
    fn masked_priors(
        &mut self,
        raw: &[f32],
        legal: &[bool],
        key: &str,
    ) -> Result<Vec<f32>, MctsError> {
        if !legal.iter().any(|&ok| ok) {
            return Err(MctsError::NoLegalActions {
                key: key.to_string(),
            });
        }

        let mut priors: Vec<f32> = legal
            .iter()
            .enumerate()
            .map(|(a, &ok)| {
                if ok {
                    raw.get(a).copied().unwrap_or(0.0).max(0.0)
                } else {
                    0.0
                }
            })
            .collect();

        let sum: f32 = priors.iter().sum();
        if sum > 0.0 && sum.is_finite() {
            for p in &mut priors {
                *p /= sum;
            }
        } else {
            log::warn!("all legal actions were masked by the oracle policy; using uniform priors");
            self.stats.prior_fallbacks += 1;
            let count = legal.iter().filter(|&&ok| ok).count() as f32;
            for (p, &ok) in priors.iter_mut().zip(legal.iter()) {
                *p = if ok { 1.0 / count } else { 0.0 };
            }
        }
        Ok(priors)
    }

    /// Pick the legal action maximizing the upper-confidence score; ties keep
    /// the first-encountered action in enumeration order.
    fn select_action(&self, key: &str, legal: &[bool]) -> Result<usize, MctsError> {
        let node = self.table.node(key).expect("select_action on leaf");
        let sqrt_n = (node.n as f32 + EPS).sqrt();
        let sqrt_n_visited = (node.n as f32).sqrt();

        let mut best: Option<(usize, f32)> = None;
        for (a, &ok) in legal.iter().enumerate() {
            if !ok {
                continue;
            }
            let score = match node.edge(a) {
                Some(e) => e.q + self.cfg.c_puct * node.p[a] * sqrt_n_visited / (1.0 + e.n as f32),
                None => self.cfg.c_puct * node.p[a] * sqrt_n,
            };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((a, score)),
            }
        }

        best.map(|(a, _)| a).ok_or_else(|| MctsError::NoLegalActions {
            key: key.to_string(),
        })
    }
}
