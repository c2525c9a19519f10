use blastgrid::{enum_map::EnumMap, enumset::EnumSet, prelude::*, rand::Rng};

use super::config::{HeuristicMethod, OpponentModel};

/// Builds the evaluator shared by every node of a tree, once per decision.
pub trait HeuristicFactory<G: GameState> {
    type Heuristic: StateHeuristic<G>;

    fn create(&self, method: HeuristicMethod, root_state: &G) -> Self::Heuristic;
}

impl<G, H, F> HeuristicFactory<G> for F
where
    G: GameState,
    H: StateHeuristic<G>,
    F: Fn(HeuristicMethod, &G) -> H,
{
    type Heuristic = H;

    #[inline]
    fn create(&self, method: HeuristicMethod, root_state: &G) -> H {
        self(method, root_state)
    }
}

impl OpponentModel {
    /// Actions for all actors when `player` plays `action`. `n_actions` bounds
    /// the random model's choice.
    pub fn joint_action<R: Rng>(
        self,
        player: PlayerId,
        action: Action,
        n_actions: usize,
        rng: &mut R,
    ) -> JointAction {
        let n_actions = n_actions.clamp(1, Action::ALL.len());
        EnumMap::from_fn(|p| {
            if p == player {
                return action;
            }
            match self {
                OpponentModel::SameAction => action,
                OpponentModel::Mirror => action.mirrored(),
                OpponentModel::Random => Action::ALL[rng.gen_range(0..n_actions)],
            }
        })
    }
}

/// Width of the collapsed border band that rollouts avoid at `tick`.
///
/// Avoidance starts `pre_collapse_steps` ticks ahead of the schedule. The
/// band never has negative width.
pub fn collapsed_width(schedule: CollapseSchedule, tick: i32, pre_collapse_steps: i32) -> i32 {
    if tick < schedule.start - pre_collapse_steps {
        return 0;
    }
    let step = schedule.step.max(1);
    let collapsed = (tick - schedule.start - pre_collapse_steps) / step + 1;
    collapsed.max(0)
}

/// Whether moving onto `dest` keeps the actor out of the collapsed band and
/// off lethal tiles.
#[inline]
pub fn is_safe_destination(board: &Board, dest: Vec2, collapsed: i32) -> bool {
    let width = board.width() as i32;
    let height = board.height() as i32;
    let inside_band =
        dest.x >= collapsed && dest.x < width - collapsed && dest.y >= collapsed && dest.y < height - collapsed;
    inside_band && board.get(dest).is_some_and(|tile| !tile.is_lethal())
}

/// Draws the moves and `Stop` found in `actions` in random order and returns
/// the first one whose destination is safe. Falls back to a uniformly random
/// entry of `actions` when none is.
///
/// `actions` must not be empty.
pub fn safe_random_action<G: GameState, R: Rng>(
    state: &G,
    actions: &[Action],
    pre_collapse_steps: i32,
    rng: &mut R,
) -> Action {
    let board = state.board();
    let collapsed = collapsed_width(state.collapse_schedule(), state.tick(), pre_collapse_steps);
    let pos = state.position();

    let mut to_try: EnumSet<Action> = Action::set_of(actions) & Action::set_of(&Action::MOVES);
    while !to_try.is_empty() {
        let n = rng.gen_range(0..to_try.len());
        let Some(action) = to_try.iter().nth(n) else {
            break;
        };
        if is_safe_destination(board, pos + action.direction().delta(), collapsed) {
            return action;
        }
        to_try.remove(action);
    }

    actions[rng.gen_range(0..actions.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastgrid::rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_collapsed_width_before_schedule_is_zero() {
        let s = CollapseSchedule { start: 500, step: 10 };
        assert_eq!(0, collapsed_width(s, 0, 10));
        assert_eq!(0, collapsed_width(s, 489, 10));
    }

    #[test]
    fn test_collapsed_width_is_never_negative() {
        let s = CollapseSchedule { start: 500, step: 10 };
        // (490 - 500 - 10) / 10 + 1 = -1
        assert_eq!(0, collapsed_width(s, 490, 10));
        assert_eq!(0, collapsed_width(s, 499, 10));
        assert_eq!(0, collapsed_width(s, 500, 10));
        assert_eq!(1, collapsed_width(s, 501, 10));
    }

    #[test]
    fn test_collapsed_width_grows_on_schedule() {
        let s = CollapseSchedule { start: 500, step: 10 };
        assert_eq!(1, collapsed_width(s, 510, 10));
        assert_eq!(1, collapsed_width(s, 519, 10));
        assert_eq!(2, collapsed_width(s, 520, 10));
        assert_eq!(1, collapsed_width(s, 500, 0));
        assert_eq!(3, collapsed_width(s, 520, 0));
    }

    #[test]
    fn test_joint_action_mirror() {
        let mut rng = SmallRng::seed_from_u64(1);
        let joint = OpponentModel::Mirror.joint_action(PlayerId::Agent1, Action::Up, 6, &mut rng);
        assert_eq!(Action::Up, joint[PlayerId::Agent1]);
        for p in [PlayerId::Agent0, PlayerId::Agent2, PlayerId::Agent3] {
            assert_eq!(Action::Down, joint[p]);
        }
        let joint = OpponentModel::Mirror.joint_action(PlayerId::Agent0, Action::Left, 6, &mut rng);
        assert_eq!(Action::Left, joint[PlayerId::Agent0]);
        assert_eq!(Action::Right, joint[PlayerId::Agent3]);
        for a in [Action::Stop, Action::Bomb] {
            let joint = OpponentModel::Mirror.joint_action(PlayerId::Agent2, a, 6, &mut rng);
            assert!(joint.values().all(|x| *x == a));
        }
    }

    #[test]
    fn test_joint_action_same_action() {
        let mut rng = SmallRng::seed_from_u64(2);
        let joint = OpponentModel::SameAction.joint_action(PlayerId::Agent3, Action::Right, 6, &mut rng);
        assert_eq!(NUM_PLAYERS, joint.len());
        assert!(joint.values().all(|x| *x == Action::Right));
    }

    #[test]
    fn test_joint_action_random_respects_action_count() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let joint = OpponentModel::Random.joint_action(PlayerId::Agent0, Action::Bomb, 3, &mut rng);
            assert_eq!(Action::Bomb, joint[PlayerId::Agent0]);
            for p in [PlayerId::Agent1, PlayerId::Agent2, PlayerId::Agent3] {
                assert!(joint[p].index() < 3);
            }
        }
    }

    #[test]
    fn test_is_safe_destination() {
        let mut board = Board::new(5, 5, Tile::Passage);
        board.set(Vec2::new(2, 1), Tile::Flames).unwrap();
        assert!(is_safe_destination(&board, Vec2::new(2, 2), 0));
        assert!(!is_safe_destination(&board, Vec2::new(2, 1), 0));
        assert!(!is_safe_destination(&board, Vec2::new(-1, 0), 0));
        assert!(is_safe_destination(&board, Vec2::new(0, 0), 0));
        assert!(!is_safe_destination(&board, Vec2::new(0, 2), 1));
        assert!(!is_safe_destination(&board, Vec2::new(4, 2), 1));
        assert!(is_safe_destination(&board, Vec2::new(1, 2), 1));
    }
}
