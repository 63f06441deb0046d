//! Canonical game state and outcome/role sign conventions.

use serde::{Deserialize, Serialize};

/// Tie sentinel: small, non-zero, so terminal draws are distinguishable from
/// an ongoing game without leaving the scalar outcome domain.
pub const DRAW_EPS: f32 = 1e-4;

/// The two acting roles of a two-phase game (e.g. player and dealer).
///
/// Roles are a fixed two-element set rather than a raw signed integer so that
/// role-indexed tables (`RoleTable`) cannot be keyed by an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    First,
    Second,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }

    /// Sign convention used by the learning rules: First = +1, Second = -1.
    pub fn sign(self) -> i8 {
        match self {
            Role::First => 1,
            Role::Second => -1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Role::First => 0,
            Role::Second => 1,
        }
    }
}

/// Terminal status of a state, always relative to the state's current player
/// at the moment the outcome became non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn is_ongoing(self) -> bool {
        matches!(self, Outcome::Ongoing)
    }

    /// Scalar sentinel: 0 ongoing, +1 win, -1 loss, `DRAW_EPS` tie.
    pub fn value(self) -> f32 {
        match self {
            Outcome::Ongoing => 0.0,
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
            Outcome::Draw => DRAW_EPS,
        }
    }
}

/// Game state as seen by the engine: the acting side's view, the other side's
/// view, whose turn is encoded, and the terminal status.
///
/// `active` always describes the side identified by `to_move`. Games that
/// switch the mover swap the two views in the successor state. Once `outcome`
/// is non-zero the state is terminal and must not be transitioned again.
#[derive(Debug, Clone, PartialEq)]
pub struct State<V> {
    pub active: V,
    pub other: V,
    pub to_move: Role,
    pub outcome: Outcome,
}

impl<V> State<V> {
    pub fn new(active: V, other: V, to_move: Role) -> Self {
        Self {
            active,
            other,
            to_move,
            outcome: Outcome::Ongoing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !self.outcome.is_ongoing()
    }

    /// Swap the two views and hand the turn to the other role.
    pub fn swap_views(self) -> Self {
        Self {
            active: self.other,
            other: self.active,
            to_move: self.to_move.other(),
            outcome: self.outcome,
        }
    }
}

/// Fixed-size role-indexed table, e.g. one oracle per role.
///
/// This replaces "pick a model by the sign of an integer" with an explicit
/// enum-keyed mapping.
#[derive(Debug, Clone, Default)]
pub struct RoleTable<T> {
    slots: [T; 2],
}

impl<T> RoleTable<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
        }
    }

    pub fn get(&self, role: Role) -> &T {
        &self.slots[role.index()]
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        &mut self.slots[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [Role::First, Role::Second]
            .into_iter()
            .zip(self.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Role, &mut T)> {
        [Role::First, Role::Second]
            .into_iter()
            .zip(self.slots.iter_mut())
    }
}

impl<T> std::ops::Index<Role> for RoleTable<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        self.get(role)
    }
}

impl<T> std::ops::IndexMut<Role> for RoleTable<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        self.get_mut(role)
    }
}
