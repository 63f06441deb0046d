//! mz-controller: the iterate/train/gate learning loop.
//!
//! Each iteration generates self-play episodes with the current oracle pair,
//! fits the pair on the pooled replay buffer split by role, then gates the
//! fitted candidate against the pre-fit snapshot in the arena. Rejected
//! candidates roll back; promoted ones become the new best line.

pub mod buffer;
pub mod episode;

use mz_core::{Config, Game, GameError, Role, RoleTable};
use mz_eval::{eval_games, ArenaError, GateDecision, GateReport, MctsPolicy};
use mz_logging::{IterationEventV1, NdjsonError, NdjsonWriter, RunSummaryEventV1};
use mz_mcts::{MctsConfig, MctsError};
use mz_oracle::{Oracle, OracleError, TrainingExample, TAG_BEST, TAG_TEMP};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use buffer::ReplayBuffer;
pub use episode::run_episode;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("episode exceeded {plies} plies without terminating")]
    EpisodeStalled { plies: u32 },
    #[error("move distribution has no positive mass")]
    DegenerateMoveDistribution,
    #[error(transparent)]
    Search(#[from] MctsError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Arena(#[from] ArenaError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Events(#[from] NdjsonError),
}

/// Where the learning loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selfplay,
    Train,
    Gate,
    Done,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Selfplay => "selfplay",
            Phase::Train => "train",
            Phase::Gate => "gate",
            Phase::Done => "done",
            Phase::Error => "error",
        }
    }
}

/// One iteration's ledger entry.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration: u32,
    pub new_examples: usize,
    pub gate: GateReport,
    pub decision: GateDecision,
}

/// Full-run ledger returned by [`Coach::learn`].
#[derive(Debug, Clone, Default)]
pub struct LearnReport {
    pub iterations: Vec<IterationReport>,
    pub promotions: u32,
    pub rejections: u32,
}

/// Drives the self-play / train / gate loop over a role-indexed oracle pair.
///
/// `oracles` is the live candidate pair; `prev` is a second pair of
/// instances whose only job is to hold the pre-fit parameters during gating.
/// The two pairs must share snapshot persistence per role (for
/// `mz_oracle::TableOracle`, the same `SnapshotStore`), otherwise `prev`
/// cannot load what the candidate saves.
#[derive(Debug)]
pub struct Coach<'g, G: Game, O: Oracle> {
    game: &'g G,
    oracles: RoleTable<O>,
    prev: RoleTable<O>,
    cfg: Config,
    buffer: ReplayBuffer,
    rng: ChaCha8Rng,
    phase: Phase,
    events: Option<NdjsonWriter>,
}

impl<'g, G: Game, O: Oracle> Coach<'g, G, O> {
    pub fn new(
        game: &'g G,
        oracles: RoleTable<O>,
        prev: RoleTable<O>,
        cfg: Config,
        events: Option<NdjsonWriter>,
    ) -> Result<Self, CoachError> {
        if cfg.selfplay.episodes_per_iteration == 0 {
            return Err(CoachError::InvalidConfig {
                msg: "episodes_per_iteration must be > 0",
            });
        }
        if cfg.gating.games == 0 {
            return Err(CoachError::InvalidConfig {
                msg: "gating.games must be > 0",
            });
        }
        if !(cfg.gating.update_threshold.is_finite()
            && cfg.gating.update_threshold > 0.0
            && cfg.gating.update_threshold <= 1.0)
        {
            return Err(CoachError::InvalidConfig {
                msg: "gating.update_threshold must be in (0, 1]",
            });
        }
        let buffer = ReplayBuffer::new(&cfg.replay);
        let rng = ChaCha8Rng::seed_from_u64(cfg.selfplay.seed);
        Ok(Self {
            game,
            oracles,
            prev,
            cfg,
            buffer,
            rng,
            phase: Phase::Idle,
            events,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    /// Run `controller.num_iterations` iterations of the full loop.
    pub fn learn(&mut self) -> Result<LearnReport, CoachError> {
        match self.run_iterations() {
            Ok(report) => {
                self.phase = Phase::Done;
                Ok(report)
            }
            Err(e) => {
                self.phase = Phase::Error;
                Err(e)
            }
        }
    }

    fn run_iterations(&mut self) -> Result<LearnReport, CoachError> {
        let mut report = LearnReport::default();

        for i in 1..=self.cfg.controller.num_iterations {
            log::info!("starting iteration {i}");
            let entry = self.run_iteration(i)?;
            match entry.decision {
                GateDecision::Promote => report.promotions += 1,
                GateDecision::Reject => report.rejections += 1,
            }
            report.iterations.push(entry);
        }

        if let Some(w) = self.events.as_mut() {
            w.write_event(&RunSummaryEventV1 {
                event: RunSummaryEventV1::EVENT,
                ts_ms: mz_logging::now_ms(),
                iterations: report.iterations.len() as u32,
                promotions: report.promotions,
                rejections: report.rejections,
            })?;
            w.flush()?;
        }
        Ok(report)
    }

    fn run_iteration(&mut self, iteration: u32) -> Result<IterationReport, CoachError> {
        let mcts_cfg = MctsConfig::from(&self.cfg.mcts);

        // Self-play with the current pair.
        self.phase = Phase::Selfplay;
        let mut new_examples: Vec<TrainingExample> = Vec::new();
        for ep in 0..self.cfg.selfplay.episodes_per_iteration {
            let seed = derive_seed(self.cfg.selfplay.seed, iteration, ep);
            let episode = run_episode(
                self.game,
                &self.oracles,
                mcts_cfg,
                self.cfg.selfplay.temp_threshold,
                seed,
            )?;
            new_examples.extend(episode);
        }
        let generated = new_examples.len();
        log::debug!("iteration {iteration}: {generated} new examples");
        self.buffer.push_iteration(new_examples);

        // Snapshot the pre-fit parameters and fit the candidate per role.
        self.phase = Phase::Train;
        for role in [Role::First, Role::Second] {
            self.oracles[role].save_snapshot(TAG_TEMP)?;
            self.prev[role].load_snapshot(TAG_TEMP)?;
        }
        let pooled = self.buffer.pooled_shuffled(&mut self.rng);
        for role in [Role::First, Role::Second] {
            let batch: Vec<TrainingExample> = pooled
                .iter()
                .filter(|ex| ex.role == role)
                .cloned()
                .collect();
            self.oracles[role].fit(&batch)?;
        }

        // Gate the fitted candidate against the pre-fit snapshot.
        self.phase = Phase::Gate;
        let gate = self.gate(iteration, mcts_cfg)?;

        // The first pair ever gated seeds the best line unconditionally.
        if iteration == 1 {
            for role in [Role::First, Role::Second] {
                self.oracles[role].save_snapshot(TAG_BEST)?;
            }
        }

        log::info!(
            "iteration {iteration}: new/prev wins {}/{}; draws {}",
            gate.new_wins,
            gate.prev_wins,
            gate.draws
        );
        let decision = gate.decide(self.cfg.gating.update_threshold);
        match decision {
            GateDecision::Reject => {
                log::info!("iteration {iteration}: rejecting candidate");
                for role in [Role::First, Role::Second] {
                    self.oracles[role].load_snapshot(TAG_TEMP)?;
                }
            }
            GateDecision::Promote => {
                log::info!("iteration {iteration}: promoting candidate");
                for role in [Role::First, Role::Second] {
                    self.oracles[role].save_snapshot(TAG_BEST)?;
                }
            }
        }

        if let Some(w) = self.events.as_mut() {
            w.write_event(&IterationEventV1 {
                event: IterationEventV1::EVENT,
                ts_ms: mz_logging::now_ms(),
                iteration,
                episodes: self.cfg.selfplay.episodes_per_iteration,
                new_examples: generated,
                buffer_examples: self.buffer.len(),
                gate_games: gate.games,
                new_wins: gate.new_wins,
                prev_wins: gate.prev_wins,
                draws: gate.draws,
                win_rate: gate.win_rate(),
                decision: match decision {
                    GateDecision::Promote => "promote",
                    GateDecision::Reject => "reject",
                },
            })?;
        }

        Ok(IterationReport {
            iteration,
            new_examples: generated,
            gate,
            decision,
        })
    }

    /// Candidate plays `Role::First` against the pre-fit pair; one search
    /// tree per side is reused across the whole match.
    fn gate(&mut self, iteration: u32, mcts_cfg: MctsConfig) -> Result<GateReport, CoachError> {
        let new_seed = derive_seed(self.cfg.selfplay.seed, iteration, u32::MAX);
        let prev_seed = derive_seed(self.cfg.selfplay.seed, iteration, u32::MAX - 1);
        let mut candidate = MctsPolicy::new(self.game, &self.oracles, mcts_cfg, new_seed)?;
        let mut incumbent = MctsPolicy::new(self.game, &self.prev, mcts_cfg, prev_seed)?;
        let tally = eval_games(
            self.game,
            &mut candidate,
            &mut incumbent,
            self.cfg.gating.games,
        )?;
        Ok(GateReport::from_tally(tally))
    }
}

/// Per-episode seed stream derived from the run seed.
fn derive_seed(base: u64, iteration: u32, episode: u32) -> u64 {
    let counter = (u64::from(iteration) << 32) | u64::from(episode);
    base ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}


#[cfg(test)]
mod buffer_tests;
#[cfg(test)]
mod coach_tests;
