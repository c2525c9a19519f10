use blastgrid::{prelude::*, rand::Rng};

use crate::mcts::{ConfigError, HeuristicFactory, MctsParams, SearchCounter, SearchError, StopCondition, MCTS};

/// Depth of the tree logged after each decision in debug mode.
const DEBUG_TREE_DEPTH: u8 = 2;

/// Plays one actor by running a search every tick, keeping the subtree of
/// the chosen action for the next decision.
#[derive(Debug)]
pub struct MCTSPlayer<G: GameState, F: HeuristicFactory<G>, R: Rng> {
    tree: MCTS<G, F, R>,
    last_action: Option<usize>,
    last_counter: SearchCounter,
}

impl<G: GameState, F: HeuristicFactory<G>, R: Rng> MCTSPlayer<G, F, R> {
    pub fn new(params: MctsParams, rng: R, actions: &[Action], heuristic_factory: F) -> Result<Self, ConfigError> {
        Ok(Self {
            tree: MCTS::new(params, rng, actions, heuristic_factory)?,
            last_action: None,
            last_counter: SearchCounter::default(),
        })
    }

    #[inline]
    pub fn tree(&self) -> &MCTS<G, F, R> {
        &self.tree
    }

    /// Statistics of the most recent search.
    #[inline]
    pub fn last_counter(&self) -> SearchCounter {
        self.last_counter
    }

    /// Forgets the previous decision so the next one starts from an empty
    /// tree, e.g. at the start of a new match.
    pub fn reset(&mut self) {
        self.last_action = None;
        self.tree.reset();
    }

    fn prepare_tree(&mut self) {
        let reuse = self.tree.params().reuse_tree;
        match self.last_action.take() {
            Some(action_idx) if reuse && self.tree.reroot(action_idx) => self.tree.update_tree(),
            _ => self.tree.reset(),
        }
    }

    fn timer(&self) -> ElapsedTimer {
        match self.tree.params().stop_condition {
            StopCondition::Time { millis } => ElapsedTimer::with_max_millis(millis),
            StopCondition::Iterations(_) | StopCondition::FmCalls(_) => ElapsedTimer::unbounded(),
        }
    }
}

impl<G: GameState, F: HeuristicFactory<G>, R: Rng> Agent<G> for MCTSPlayer<G, F, R> {
    type Error = SearchError;

    fn act(&mut self, state: &G) -> Result<Action, SearchError> {
        let timer = self.timer();
        self.prepare_tree();
        self.tree.set_root_state(state.clone());
        self.last_counter = self.tree.search(&timer)?;

        let action_idx = self.tree.most_visited_action();
        if self.tree.params().debug {
            self.tree.log_tree(self.tree.root(), DEBUG_TREE_DEPTH, 1);
        }
        self.last_action = Some(action_idx);
        Ok(self.tree.actions()[action_idx])
    }
}
