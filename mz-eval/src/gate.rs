//! Gate: accept or reject a candidate oracle pair from arena tallies.

use crate::arena::MatchTally;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Promote,
    Reject,
}

/// Arena result for candidate-vs-best, plus the acceptance rule.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GateReport {
    pub games: u32,
    pub new_wins: u32,
    pub prev_wins: u32,
    pub draws: u32,
}

impl GateReport {
    /// Tally from an arena match where the candidate played `Role::First`.
    pub fn from_tally(tally: MatchTally) -> Self {
        Self {
            games: tally.games(),
            new_wins: tally.first_wins,
            prev_wins: tally.second_wins,
            draws: tally.draws,
        }
    }

    /// Win rate over decisive games; 0 when there were none.
    pub fn win_rate(&self) -> f64 {
        let decisive = self.new_wins + self.prev_wins;
        if decisive == 0 {
            return 0.0;
        }
        f64::from(self.new_wins) / f64::from(decisive)
    }

    /// Accept only if the candidate won at least `update_threshold` of the
    /// decisive games and there was at least one decisive game. An all-draw
    /// match rejects; it is not a division fault.
    pub fn decide(&self, update_threshold: f64) -> GateDecision {
        let decisive = self.new_wins + self.prev_wins;
        if decisive == 0 || self.win_rate() < update_threshold {
            GateDecision::Reject
        } else {
            GateDecision::Promote
        }
    }
}
