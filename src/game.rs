use std::fmt::Debug;

use enum_map::EnumMap;

use crate::types::{
    action::{Action, Vec2},
    board::{Board, PlayerId},
};

/// Actions for every actor, applied together in one simulator step.
pub type JointAction = EnumMap<PlayerId, Action>;

/// Schedule of the shrinking safe area: starting at tick `start`, one more
/// ring of border tiles collapses every `step` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollapseSchedule {
    pub start: i32,
    pub step: i32,
}

impl CollapseSchedule {
    pub const STANDARD: Self = Self { start: 500, step: 10 };
}

impl Default for CollapseSchedule {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Forward model of a match, seen from the actor it was observed by.
///
/// Cloning must produce an independent deep copy: the search clones the root
/// state once per iteration and mutates the clone freely.
pub trait GameState: Clone + Debug {
    fn is_terminal(&self) -> bool;

    /// Advances the state by one tick with every actor acting at once.
    fn next(&mut self, actions: &JointAction);

    fn tick(&self) -> i32;

    fn board(&self) -> &Board;

    /// Position of the observing actor.
    fn position(&self) -> Vec2;

    /// The observing actor.
    fn player_id(&self) -> PlayerId;

    /// Number of legal actions per actor. Indices below this value map to
    /// [`Action::ALL`].
    fn n_actions(&self) -> usize {
        Action::ALL.len()
    }

    fn collapse_schedule(&self) -> CollapseSchedule {
        CollapseSchedule::STANDARD
    }
}

/// Scalar evaluation of a state from a fixed actor's point of view. Higher is
/// better.
pub trait StateHeuristic<G: GameState> {
    fn evaluate_state(&self, state: &G) -> f64;
}
