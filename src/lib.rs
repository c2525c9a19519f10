#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![doc = include_str!("../README.md")]

#[macro_export]
#[doc(hidden)]
macro_rules! impl_display_from_debug {
    (@single $Type: ident) => {
        impl ::std::fmt::Display for $Type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
    };
    ($($Type: ident)+) => {
        $($crate::impl_display_from_debug!(@single $Type);)+
    };
}

/// Actions, directions, tiles and the board.
pub mod types;

/// Interfaces of the forward model and the state evaluator.
pub mod game;

/// Wall-clock budgets
pub mod timer;

pub mod utils;

pub mod agent;

/// Re-exports the `rand` crate
pub use rand;

/// Re-exports the `smallvec` crate
pub use smallvec;

/// Re-exports the `enum_map` crate
pub use enum_map;

/// Re-exports the `enumset` crate
pub use enumset;

/// Re-exports the `thiserror` crate
pub use thiserror;

pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::game::{CollapseSchedule, GameState, JointAction, StateHeuristic};
    pub use crate::timer::{ElapsedTimer, Timer};
    pub use crate::types::action::{Action, Direction, Vec2};
    pub use crate::types::board::{Board, BoardError, PlayerId, Tile, NUM_PLAYERS};
    pub use crate::utils::{jitter, normalize};
}
