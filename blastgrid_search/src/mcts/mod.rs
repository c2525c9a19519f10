//! Monte Carlo Tree Search over a simultaneous-move grid game.
//!
//! Each iteration clones the root state, descends the tree with UCT until it
//! finds a node with an unexpanded action (or reaches the depth ceiling),
//! expands one random action, runs a safe random rollout to the depth
//! ceiling and backpropagates the heuristic score of the reached state.
//!
//! The tree can be kept between decisions: [`MCTS::reroot`] promotes a child
//! of the root and [`MCTS::update_tree`] decays its statistics and relabels
//! depths.

use std::collections::VecDeque;

use atree::{Arena, Token};
use blastgrid::{
    prelude::*,
    rand::Rng,
    smallvec::SmallVec,
};
use instant::Instant;
use itertools::Itertools;

pub mod bounds;
pub mod config;
pub mod node;
pub mod policy;

pub mod debug;
pub use debug::*;

pub use bounds::ValueBounds;
pub use config::{ConfigError, HeuristicMethod, MctsParams, OpponentModel, StopCondition};
pub use node::{ChildSlot, NodeData};
pub use policy::HeuristicFactory;

/// Remaining time, in milliseconds, below which a time-limited search stops
/// regardless of the average iteration time.
pub const REMAINING_LIMIT_MS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("search started before a root state was set")]
    RootStateNotSet,
    #[error("UCT selection found no child: bounds = [{lower}, {upper}], children = {children}")]
    SelectionInvariantViolated { lower: f64, upper: f64, children: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchCounter {
    pub iterations: u32,
    /// Number of nodes added to the tree.
    pub expansions: u32,
    /// Forward-model calls charged by the budget accounting.
    pub fm_calls: u32,
    pub elapsed_ms: u64,
}

impl SearchCounter {
    pub fn summary(&self) -> String {
        let rate = if self.elapsed_ms > 0 {
            (self.iterations as f64) / (self.elapsed_ms as f64)
        } else {
            self.iterations as f64
        };
        format!(
            "iters={} expansions={} fm_calls={} dt={}ms rate={rate:.2} iters/ms",
            self.iterations, self.expansions, self.fm_calls, self.elapsed_ms
        )
    }
}

/// State and evaluator shared by every node for one decision.
#[derive(Debug)]
struct RootContext<G, H> {
    state: G,
    heuristic: H,
}

pub struct MCTS<G: GameState, F: HeuristicFactory<G>, R: Rng> {
    params: MctsParams,
    actions: SmallVec<[Action; 6]>,
    tree: Arena<NodeData>,
    root: Token,
    root_ctx: Option<RootContext<G, F::Heuristic>>,
    heuristic_factory: F,
    rng: R,
}

impl<G: GameState, F: HeuristicFactory<G>, R: Rng> std::fmt::Debug for MCTS<G, F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MCTS")
            .field("params", &self.params)
            .field("actions", &self.actions)
            .field("root", self.root_node())
            .field("has_root_state", &self.root_ctx.is_some())
            .finish()
    }
}

impl<G: GameState, F: HeuristicFactory<G>, R: Rng> MCTS<G, F, R> {
    /// Creates an empty tree over the given legal action table. Child slot `i`
    /// of every node corresponds to `actions[i]`.
    pub fn new(params: MctsParams, rng: R, actions: &[Action], heuristic_factory: F) -> Result<Self, ConfigError> {
        params.validate()?;
        if actions.is_empty() {
            return Err(ConfigError::EmptyActionSet);
        }
        let (tree, root) = Arena::with_data(NodeData::new_root(actions.len()));
        Ok(Self {
            params,
            actions: actions.iter().copied().collect(),
            tree,
            root,
            root_ctx: None,
            heuristic_factory,
            rng,
        })
    }

    #[inline]
    pub fn params(&self) -> &MctsParams {
        &self.params
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[inline]
    pub fn root(&self) -> Token {
        self.root
    }

    #[inline]
    pub fn node(&self, token: Token) -> Option<&NodeData> {
        self.tree.get(token).map(|n| &n.data)
    }

    #[inline]
    pub fn root_node(&self) -> &NodeData {
        self.data(self.root)
    }

    /// Child of `token` reached through action index `action_idx`, if expanded.
    pub fn child(&self, token: Token, action_idx: usize) -> Option<Token> {
        self.node(token)?.children.get(action_idx)?.token()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut queue = VecDeque::from([self.root]);
        while let Some(token) = queue.pop_front() {
            count += 1;
            queue.extend(self.data(token).expanded_children().map(|(_, t)| t));
        }
        count
    }

    /// Sets the state to search from and builds the shared evaluator for it.
    pub fn set_root_state(&mut self, state: G) {
        let heuristic = self.heuristic_factory.create(self.params.heuristic_method, &state);
        self.root_ctx = Some(RootContext { state, heuristic });
    }

    /// Discards the whole tree.
    pub fn reset(&mut self) {
        let (tree, root) = Arena::with_data(NodeData::new_root(self.actions.len()));
        self.tree = tree;
        self.root = root;
    }

    /// Makes the root's child at `action_idx` the new root and drops every
    /// other node. Returns `false` (leaving the tree untouched) when that child
    /// was never expanded.
    ///
    /// Depth labels are stale afterwards until [`MCTS::update_tree`] runs.
    pub fn reroot(&mut self, action_idx: usize) -> bool {
        let Some(new_root) = self.child(self.root, action_idx) else {
            return false;
        };

        let mut root_data = self.data(new_root).clone();
        root_data.parent = None;
        root_data.child_idx = None;
        let (mut tree, root) = Arena::with_data(root_data);

        let mut queue = VecDeque::from([(new_root, root)]);
        while let Some((old, new)) = queue.pop_front() {
            let old_children: SmallVec<[(usize, Token); 6]> = self.data(old).expanded_children().collect();
            for (idx, old_child) in old_children {
                let mut data = self.data(old_child).clone();
                data.parent = Some(new);
                let new_child = new.append(&mut tree, data);
                tree.get_mut(new).expect("reroot: copied node must exist").data.children[idx] =
                    ChildSlot::Expanded(new_child);
                queue.push_back((old_child, new_child));
            }
        }

        log::trace!("reroot: kept subtree of action {action_idx}");
        self.tree = tree;
        self.root = root;
        true
    }

    /// Runs search iterations from the root state until the configured stop
    /// condition is met. At least one iteration always runs.
    pub fn search<T: Timer>(&mut self, timer: &T) -> Result<SearchCounter, SearchError> {
        let ctx = self.root_ctx.take().ok_or(SearchError::RootStateNotSet)?;
        let result = self.search_loop(&ctx, timer);
        self.root_ctx = Some(ctx);
        result
    }

    fn search_loop<T: Timer>(
        &mut self,
        ctx: &RootContext<G, F::Heuristic>,
        timer: &T,
    ) -> Result<SearchCounter, SearchError> {
        let t0 = Instant::now();
        let rollout_depth = self.params.rollout_depth;
        let mut counter = SearchCounter::default();
        let mut acc_time_ms = 0.0;
        let root = self.root;
        self.data_mut(root).fm_calls_count = 0;

        loop {
            let iteration_start = Instant::now();
            counter.expansions += self.iteration(ctx)?;
            counter.iterations += 1;

            let stop = match self.params.stop_condition {
                StopCondition::Time { .. } => {
                    acc_time_ms += iteration_start.elapsed().as_secs_f64() * 1e3;
                    let avg_time_ms = acc_time_ms / counter.iterations as f64;
                    let remaining = timer.remaining_time_millis() as f64;
                    remaining <= 2.0 * avg_time_ms || remaining <= REMAINING_LIMIT_MS
                }
                StopCondition::Iterations(n) => counter.iterations >= n,
                StopCondition::FmCalls(budget) => {
                    let root = self.data_mut(root);
                    root.fm_calls_count = root.fm_calls_count.saturating_add(rollout_depth);
                    root.fm_calls_count
                        .checked_add(rollout_depth)
                        .map_or(true, |next| next > budget)
                }
            };
            if stop {
                break;
            }
        }

        counter.fm_calls = self.root_node().fm_calls_count;
        counter.elapsed_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::debug!("search: {}", counter.summary());
        Ok(counter)
    }

    /// One select/expand, rollout, backpropagate pass. Returns the number of
    /// nodes added.
    fn iteration(&mut self, ctx: &RootContext<G, F::Heuristic>) -> Result<u32, SearchError> {
        let mut state = ctx.state.clone();
        let (selected, expanded) = self.tree_policy(&mut state)?;
        let delta = self.roll_out(selected, &mut state, &ctx.heuristic);
        self.back_up(selected, delta);
        Ok(expanded as u32)
    }

    /// Descends from the root, advancing `state` along the way. Returns the
    /// node to roll out from and whether it was just created.
    pub(crate) fn tree_policy(&mut self, state: &mut G) -> Result<(Token, bool), SearchError> {
        let mut cur = self.root;
        while !state.is_terminal() && self.data(cur).depth < self.params.rollout_depth {
            if !self.data(cur).is_fully_expanded() {
                return Ok((self.expand(cur, state), true));
            }
            cur = self.uct(cur, state)?;
        }
        Ok((cur, false))
    }

    /// Expands a uniformly random unexpanded action of `token`.
    ///
    /// Panics if `token` is fully expanded.
    pub(crate) fn expand(&mut self, token: Token, state: &mut G) -> Token {
        let Self { tree, rng, .. } = self;
        let parent = &tree.get(token).expect("expand: node must exist").data;

        let mut best_action = None;
        let mut best_value = -1.0;
        for i in parent.unexpanded_indices() {
            let x: f64 = rng.gen();
            if x > best_value {
                best_action = Some(i);
                best_value = x;
            }
        }
        let action_idx = best_action.expect("expand: node must have an unexpanded action");
        let data = parent.new_child(token, action_idx);

        self.roll(state, self.actions[action_idx]);

        let child = token.append(&mut self.tree, data);
        self.data_mut(token).children[action_idx] = ChildSlot::Expanded(child);
        child
    }

    /// Picks the child of a fully expanded node with the highest UCT score
    /// and advances `state` through its action.
    pub(crate) fn uct(&mut self, token: Token, state: &mut G) -> Result<Token, SearchError> {
        let Self { tree, rng, params, .. } = self;
        let node = &tree.get(token).expect("uct: node must exist").data;
        let eps = params.epsilon;
        let log_parent_visits = (node.n_visits as f64 + 1.0).ln();

        let mut selected = None;
        let mut best_value = f64::MIN;
        for (idx, child_token) in node.expanded_children() {
            let child = &tree.get(child_token).expect("uct: child must exist").data;
            let exploitation = normalize(child.mean_value(eps), node.bounds.min, node.bounds.max);
            let exploration = params.k * (log_parent_visits / (child.n_visits as f64 + eps)).sqrt();
            let uct_value = jitter(exploitation + exploration, eps, rng.gen());
            if uct_value > best_value {
                selected = Some((idx, child_token));
                best_value = uct_value;
            }
        }

        let Some((idx, child)) = selected else {
            return Err(SearchError::SelectionInvariantViolated {
                lower: node.bounds.min,
                upper: node.bounds.max,
                children: node.children.len(),
            });
        };

        self.roll(state, self.actions[idx]);
        Ok(child)
    }

    /// Advances `state` by one step: the observing actor plays `action`, every
    /// other actor follows the opponent model.
    fn roll(&mut self, state: &mut G, action: Action) {
        let joint = self
            .params
            .opponent_model
            .joint_action(state.player_id(), action, state.n_actions(), &mut self.rng);
        state.next(&joint);
    }

    /// Plays safe random actions until the state is terminal or the absolute
    /// depth ceiling is reached, then scores the state.
    fn roll_out<H: StateHeuristic<G>>(&mut self, token: Token, state: &mut G, heuristic: &H) -> f64 {
        let mut depth = self.data(token).depth;
        while !self.finish_rollout(state, depth) {
            let action = policy::safe_random_action(state, &self.actions, self.params.pre_collapse_steps, &mut self.rng);
            self.roll(state, action);
            depth += 1;
        }
        heuristic.evaluate_state(state)
    }

    #[inline]
    fn finish_rollout(&self, state: &G, depth: u32) -> bool {
        depth >= self.params.rollout_depth || state.is_terminal()
    }

    /// Adds `result` to `token` and every ancestor up to the root.
    pub(crate) fn back_up(&mut self, token: Token, result: f64) {
        let mut current = Some(token);
        while let Some(t) = current {
            let data = self.data_mut(t);
            data.record(result);
            current = data.parent;
        }
    }

    /// Index of the root's most visited child. When every expanded child has
    /// the same number of visits, falls back to [`MCTS::best_action`].
    pub fn most_visited_action(&mut self) -> usize {
        let Self { tree, rng, params, root, .. } = self;
        let root_node = &tree.get(*root).expect("most_visited_action: root must exist").data;

        let mut selected = None;
        let mut best_value = f64::MIN;
        let mut visits: SmallVec<[u32; 6]> = SmallVec::new();
        for (idx, child_token) in root_node.expanded_children() {
            let n_visits = tree.get(child_token).expect("most_visited_action: child must exist").data.n_visits;
            visits.push(n_visits);
            let value = jitter(n_visits as f64, params.epsilon, rng.gen());
            if value > best_value {
                best_value = value;
                selected = Some(idx);
            }
        }

        match selected {
            None => {
                log::warn!("most_visited_action: root has no expanded child, falling back to action 0");
                0
            }
            Some(_) if visits.iter().all_equal() => self.best_action(),
            Some(idx) => idx,
        }
    }

    /// Index of the root's child with the highest mean value.
    pub fn best_action(&mut self) -> usize {
        let Self { tree, rng, params, root, .. } = self;
        let root_node = &tree.get(*root).expect("best_action: root must exist").data;

        let mut selected = None;
        let mut best_value = f64::MIN;
        for (idx, child_token) in root_node.expanded_children() {
            let child = &tree.get(child_token).expect("best_action: child must exist").data;
            let value = jitter(child.mean_value(params.epsilon), params.epsilon, rng.gen());
            if value > best_value {
                best_value = value;
                selected = Some(idx);
            }
        }

        selected.unwrap_or_else(|| {
            log::warn!("best_action: root has no expanded child, falling back to action 0");
            0
        })
    }

    /// Decays every node's statistics by the decay factor and relabels depths
    /// with the breadth-first distance from the root.
    pub fn update_tree(&mut self) {
        let decay_factor = self.params.decay_factor;
        let mut queue = VecDeque::from([(self.root, 0)]);
        while let Some((token, level)) = queue.pop_front() {
            let Some(node) = self.tree.get_mut(token) else {
                continue;
            };
            let data = &mut node.data;
            data.discount(decay_factor);
            data.depth = level;
            queue.extend(data.expanded_children().map(|(_, child)| (child, level + 1)));
        }
    }

    #[inline]
    fn data(&self, token: Token) -> &NodeData {
        &self.tree.get(token).expect("node token must belong to the tree").data
    }

    #[inline]
    fn data_mut(&mut self, token: Token) -> &mut NodeData {
        &mut self.tree.get_mut(token).expect("node token must belong to the tree").data
    }
}
