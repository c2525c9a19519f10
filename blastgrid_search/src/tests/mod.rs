use std::cell::Cell;
use std::collections::VecDeque;

use atree::Token;
use blastgrid::{
    enum_map::{enum_map, EnumMap},
    prelude::*,
    rand::{rngs::SmallRng, SeedableRng},
};

use crate::mcts::{HeuristicMethod, MctsParams, StopCondition, MCTS};


pub mod player;




/// Open arena with the four actors in the corners. Actors never block each
/// other; they die when they end a tick on a lethal tile.
#[derive(Debug, Clone)]
pub struct ArenaGame {
    board: Board,
    positions: EnumMap<PlayerId, Vec2>,
    alive: EnumMap<PlayerId, bool>,
    me: PlayerId,
    tick: i32,
    max_ticks: i32,
    pub last_joint: Option<JointAction>,
}

impl ArenaGame {
    pub fn open(size: usize) -> Self {
        let far = size as i32 - 2;
        Self {
            board: Board::new(size, size, Tile::Passage),
            positions: enum_map! {
                PlayerId::Agent0 => Vec2::new(1, 1),
                PlayerId::Agent1 => Vec2::new(far, 1),
                PlayerId::Agent2 => Vec2::new(1, far),
                PlayerId::Agent3 => Vec2::new(far, far),
            },
            alive: enum_map! { _ => true },
            me: PlayerId::Agent0,
            tick: 0,
            max_ticks: 800,
            last_joint: None,
        }
    }

    pub fn with_tile(mut self, pos: Vec2, tile: Tile) -> Self {
        self.board.set(pos, tile).unwrap();
        self
    }

    pub fn with_position(mut self, player: PlayerId, pos: Vec2) -> Self {
        self.positions[player] = pos;
        self
    }

    pub fn at_tick(mut self, tick: i32) -> Self {
        self.tick = tick;
        self
    }

    pub fn as_player(mut self, me: PlayerId) -> Self {
        self.me = me;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive[self.me]
    }
}

impl GameState for ArenaGame {
    fn is_terminal(&self) -> bool {
        self.tick >= self.max_ticks || !self.is_alive()
    }

    fn next(&mut self, actions: &JointAction) {
        for (player, action) in actions.iter() {
            if !self.alive[player] {
                continue;
            }
            let dest = self.positions[player] + action.direction().delta();
            let passable = matches!(
                self.board.get(dest),
                Some(Tile::Passage | Tile::Flames | Tile::ExtraBomb | Tile::IncrRange | Tile::Kick)
            );
            if passable {
                self.positions[player] = dest;
            }
            if self.board.get(self.positions[player]).is_some_and(Tile::is_lethal) {
                self.alive[player] = false;
            }
        }
        self.tick += 1;
        self.last_joint = Some(actions.clone());
    }

    fn tick(&self) -> i32 {
        self.tick
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn position(&self) -> Vec2 {
        self.positions[self.me]
    }

    fn player_id(&self) -> PlayerId {
        self.me
    }
}

/// Negated Manhattan distance to a goal tile; dying scores far below any
/// distance.
#[derive(Debug, Clone, Copy)]
pub struct GoalHeuristic {
    pub goal: Vec2,
}

impl StateHeuristic<ArenaGame> for GoalHeuristic {
    fn evaluate_state(&self, state: &ArenaGame) -> f64 {
        if !state.is_alive() {
            return -100.0;
        }
        let pos = state.position();
        -(((pos.x - self.goal.x).abs() + (pos.y - self.goal.y).abs()) as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NanHeuristic;

impl StateHeuristic<ArenaGame> for NanHeuristic {
    fn evaluate_state(&self, _: &ArenaGame) -> f64 {
        f64::NAN
    }
}

pub const GOAL: Vec2 = Vec2::new(5, 5);

pub type GoalFactory = fn(HeuristicMethod, &ArenaGame) -> GoalHeuristic;

pub type TestTree = MCTS<ArenaGame, GoalFactory, SmallRng>;

pub fn goal_heuristic(_: HeuristicMethod, _: &ArenaGame) -> GoalHeuristic {
    GoalHeuristic { goal: GOAL }
}

pub fn iterations(n: u32) -> MctsParams {
    MctsParams::STANDARD.with_stop_condition(StopCondition::Iterations(n))
}

pub fn new_tree(params: MctsParams, seed: u64) -> TestTree {
    MCTS::new(params, SmallRng::seed_from_u64(seed), &Action::MOVES, goal_heuristic as GoalFactory).unwrap()
}

/// `(token, level, visits, total value, depth label)` of every node reachable
/// from the root, in breadth-first order.
pub fn bfs(tree: &TestTree) -> Vec<(Token, u32, u32, f64, u32)> {
    let mut out = vec![];
    let mut queue = VecDeque::from([(tree.root(), 0)]);
    while let Some((token, level)) = queue.pop_front() {
        let node = tree.node(token).unwrap();
        out.push((token, level, node.n_visits, node.tot_value, node.depth));
        queue.extend(node.expanded_children().map(|(_, t)| (t, level + 1)));
    }
    out
}

/// Timer whose remaining budget drops by `step` every time it is polled.
pub struct CountdownTimer {
    remaining: Cell<i64>,
    step: i64,
}

impl CountdownTimer {
    pub fn new(remaining: i64, step: i64) -> Self {
        Self {
            remaining: Cell::new(remaining),
            step,
        }
    }
}

impl Timer for CountdownTimer {
    fn elapsed_millis(&self) -> u64 {
        0
    }

    fn remaining_time_millis(&self) -> i64 {
        let r = self.remaining.get() - self.step;
        self.remaining.set(r);
        r
    }
}
