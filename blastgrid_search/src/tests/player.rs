use super::*;
use crate::player::MCTSPlayer;

type TestPlayer = MCTSPlayer<ArenaGame, GoalFactory, SmallRng>;

fn new_player(params: MctsParams, seed: u64) -> TestPlayer {
    MCTSPlayer::new(params, SmallRng::seed_from_u64(seed), &Action::MOVES, goal_heuristic as GoalFactory).unwrap()
}

fn chosen_child_visits(player: &TestPlayer, action: Action) -> u32 {
    let tree = player.tree();
    let idx = tree.actions().iter().position(|a| *a == action).unwrap();
    let child = tree.child(tree.root(), idx).unwrap();
    tree.node(child).unwrap().n_visits
}

#[test]
fn act_returns_legal_action() {
    let mut player = new_player(iterations(40), 40);
    let action = player.act(&ArenaGame::open(11)).unwrap();
    assert!(Action::MOVES.contains(&action));
    assert_eq!(40, player.last_counter().iterations);
}

#[test]
fn act_reuses_decayed_subtree() {
    let mut player = new_player(iterations(40), 41);
    let state = ArenaGame::open(11);
    let action = player.act(&state).unwrap();
    let visits = chosen_child_visits(&player, action);

    let next = ArenaGame::open(11).at_tick(1);
    player.act(&next).unwrap();
    assert_eq!((visits as f64 * 0.78) as u32 + 40, player.tree().root_node().n_visits);
    assert_eq!(0, player.tree().root_node().depth);
}

#[test]
fn act_without_reuse_starts_fresh() {
    let params = MctsParams {
        reuse_tree: false,
        ..iterations(40)
    };
    let mut player = new_player(params, 42);
    player.act(&ArenaGame::open(11)).unwrap();
    player.act(&ArenaGame::open(11).at_tick(1)).unwrap();
    assert_eq!(40, player.tree().root_node().n_visits);
}

#[test]
fn reset_discards_previous_tree() {
    let mut player = new_player(iterations(40), 43);
    player.act(&ArenaGame::open(11)).unwrap();
    player.reset();
    player.act(&ArenaGame::open(11)).unwrap();
    assert_eq!(40, player.tree().root_node().n_visits);
}

#[test]
fn act_heads_towards_goal() {
    let params = MctsParams {
        rollout_depth: 1,
        ..iterations(100)
    };
    let factory = |_: HeuristicMethod, _: &ArenaGame| GoalHeuristic { goal: Vec2::new(8, 4) };
    let mut player = MCTSPlayer::new(params, SmallRng::seed_from_u64(44), &Action::MOVES, factory).unwrap();
    let state = ArenaGame::open(9).with_position(PlayerId::Agent0, Vec2::new(4, 4));
    assert_eq!(Action::Right, player.act(&state).unwrap());
}

#[test]
fn act_with_debug_logging() {
    let params = MctsParams {
        debug: true,
        ..iterations(30)
    };
    let mut player = new_player(params, 45);
    let action = player.act(&ArenaGame::open(11)).unwrap();
    assert!(Action::MOVES.contains(&action));
}

#[test]
fn act_propagates_search_errors() {
    let nan_factory = |_: HeuristicMethod, _: &ArenaGame| NanHeuristic;
    let mut player = MCTSPlayer::new(iterations(40), SmallRng::seed_from_u64(46), &Action::MOVES, nan_factory).unwrap();
    assert!(matches!(
        player.act(&ArenaGame::open(11)),
        Err(crate::SearchError::SelectionInvariantViolated { .. })
    ));
}
