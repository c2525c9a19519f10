#![cfg_attr(not(test), forbid(clippy::unwrap_used))]

/// Implementation for Monte-Carlo Tree Search
pub mod mcts;

/// Decision driver that reuses the search tree across ticks
pub mod player;

pub use mcts::{MctsParams, SearchCounter, SearchError, MCTS};
pub use player::MCTSPlayer;

#[cfg(test)]
mod tests;
