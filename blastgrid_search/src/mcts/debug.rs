use std::rc::Rc;

use super::*;

#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeDump<T> {
    #[cfg_attr(feature = "serde", serde(rename = "_"))]
    pub value: T,
    #[cfg_attr(feature = "serde", serde(rename = "children"))]
    pub children: Vec<Rc<TreeDump<T>>>,
}

impl<T> TreeDump<T> {
    pub fn new(value: T, children: Vec<Rc<TreeDump<T>>>) -> Self {
        Self { value, children }
    }
}

impl NodeData {
    fn debug_description(&self, actions: &[Action], epsilon: f64) -> String {
        let action_part = match self.child_idx.and_then(|i| actions.get(i)) {
            Some(action) => format!("{action}"),
            None => "[Root]".to_string(),
        };
        format!(
            "{action_part} (n={}, mean={:.4}, bounds={}), #children = {}, depth={}",
            self.n_visits,
            self.mean_value(epsilon),
            self.bounds,
            self.expanded_children().count(),
            self.depth
        )
    }
}

impl<G: GameState, F: HeuristicFactory<G>, R: Rng> MCTS<G, F, R> {
    pub fn dump_tree(&self, token: Token, max_depth: u8) -> TreeDump<String> {
        if max_depth == 0 {
            return Default::default();
        }

        let Some(node) = self.node(token) else {
            return Default::default();
        };

        let desc = node.debug_description(&self.actions, self.params.epsilon);
        let children = node
            .expanded_children()
            .map(|(_, child)| Rc::new(self.dump_tree(child, max_depth - 1)))
            .filter(|child| !(child.children.is_empty() && child.value.is_empty()))
            .collect();
        TreeDump::new(desc, children)
    }

    /// Writes the tree under `token` at debug level. Children with fewer than
    /// `min_visits` visits are summarized, except for the most visited one.
    pub fn log_tree(&self, token: Token, max_depth: u8, min_visits: u32) {
        if log::log_enabled!(log::Level::Debug) {
            self.log_tree_rec(token, 0, max_depth, min_visits);
        }
    }

    fn log_tree_rec(&self, token: Token, depth: u8, max_depth: u8, min_visits: u32) {
        if depth > max_depth {
            return;
        }

        let Some(node) = self.node(token) else {
            return;
        };

        fn indent_prefix(indent_depth: u8) -> String {
            let mut s = "  ".repeat(indent_depth as usize);
            s += "- ";
            s
        }

        log::debug!(
            "{}{}",
            indent_prefix(depth),
            node.debug_description(&self.actions, self.params.epsilon)
        );

        let mut children: SmallVec<[(Token, &NodeData); 6]> = node
            .expanded_children()
            .filter_map(|(_, t)| self.node(t).map(|d| (t, d)))
            .collect();
        children.sort_by_key(|(_, d)| std::cmp::Reverse(d.n_visits));

        let c = children.len();
        let mut omitted = 0;
        let mut omitted_visits = 0;
        let mut found = false;
        for (i, (child_token, child)) in children.iter().copied().enumerate() {
            let n = child.n_visits;
            if n != 0 && (c <= 1 || depth == 0 || n >= min_visits || i == 0) {
                found = depth < max_depth;
                self.log_tree_rec(child_token, depth + 1, max_depth, min_visits);
            } else {
                omitted += 1;
                omitted_visits += n;
            }
        }

        if found && omitted > 0 {
            log::debug!(
                "{}...[{omitted} omitted] (n={omitted_visits})",
                indent_prefix(depth + 1)
            );
        }
    }
}
