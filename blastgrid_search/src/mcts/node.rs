use atree::Token;
use blastgrid::smallvec::{smallvec, SmallVec};

use super::bounds::ValueBounds;

/// One slot per legal action index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ChildSlot {
    #[default]
    Unexpanded,
    Expanded(Token),
}

impl ChildSlot {
    #[inline]
    pub fn token(self) -> Option<Token> {
        match self {
            ChildSlot::Unexpanded => None,
            ChildSlot::Expanded(token) => Some(token),
        }
    }

    #[inline]
    pub fn is_expanded(self) -> bool {
        matches!(self, ChildSlot::Expanded(..))
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    /// Sum of every result backpropagated through this node.
    pub tot_value: f64,
    pub n_visits: u32,
    pub bounds: ValueBounds,
    /// Distance from the current root. Rewritten by `MCTS::update_tree`.
    pub depth: u32,
    pub children: SmallVec<[ChildSlot; 6]>,
    /// Back-reference to the owning node, `None` for the root.
    pub parent: Option<Token>,
    /// Action index that led from the parent to this node.
    pub child_idx: Option<usize>,
    /// Forward-model calls charged to the search when this node was created
    /// (the root keeps counting during a search).
    pub fm_calls_count: u32,
}

impl NodeData {
    pub fn new_root(num_actions: usize) -> Self {
        Self {
            tot_value: 0.0,
            n_visits: 0,
            bounds: ValueBounds::EMPTY,
            depth: 0,
            children: smallvec![ChildSlot::Unexpanded; num_actions],
            parent: None,
            child_idx: None,
            fm_calls_count: 0,
        }
    }

    pub fn new_child(&self, parent: Token, child_idx: usize) -> Self {
        Self {
            depth: self.depth + 1,
            parent: Some(parent),
            child_idx: Some(child_idx),
            fm_calls_count: self.fm_calls_count,
            ..Self::new_root(self.children.len())
        }
    }

    #[inline]
    pub fn mean_value(&self, epsilon: f64) -> f64 {
        self.tot_value / (self.n_visits as f64 + epsilon)
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.children.iter().all(|c| c.is_expanded())
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.children.iter().any(|c| c.is_expanded())
    }

    /// `(action index, child token)` for every expanded slot, in index order.
    pub fn expanded_children(&self) -> impl Iterator<Item = (usize, Token)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.token().map(|t| (i, t)))
    }

    /// Indices of the slots that have not been expanded yet.
    pub fn unexpanded_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| (!slot.is_expanded()).then_some(i))
    }

    #[inline]
    pub(crate) fn record(&mut self, result: f64) {
        self.n_visits += 1;
        self.tot_value += result;
        self.bounds.widen(result);
    }

    #[inline]
    pub(crate) fn discount(&mut self, decay_factor: f64) {
        self.n_visits = (self.n_visits as f64 * decay_factor) as u32;
        self.tot_value *= decay_factor;
    }
}
