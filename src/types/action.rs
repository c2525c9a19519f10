use std::fmt::Display;
use std::ops::Add;

use enumset::{EnumSet, EnumSetType};

/// Integer grid coordinate. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Spatial component of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub const fn delta(self) -> Vec2 {
        match self {
            Direction::None => Vec2::new(0, 0),
            Direction::Up => Vec2::new(0, -1),
            Direction::Down => Vec2::new(0, 1),
            Direction::Left => Vec2::new(-1, 0),
            Direction::Right => Vec2::new(1, 0),
        }
    }
}

/// Move primitives available to every actor on every tick.
///
/// The discriminants are the action indices used by the search tree, so the
/// declaration order must not change.
#[derive(Debug, Hash, EnumSetType)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Stop,
    Up,
    Down,
    Left,
    Right,
    Bomb,
}

crate::impl_display_from_debug!(Action);

impl Action {
    /// Every action, ordered by index.
    pub const ALL: [Action; 6] = [
        Action::Stop,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Bomb,
    ];

    /// The four cardinal moves plus waiting in place.
    pub const MOVES: [Action; 5] = [Action::Stop, Action::Up, Action::Down, Action::Left, Action::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub const fn direction(self) -> Direction {
        match self {
            Action::Up => Direction::Up,
            Action::Down => Direction::Down,
            Action::Left => Direction::Left,
            Action::Right => Direction::Right,
            Action::Stop | Action::Bomb => Direction::None,
        }
    }

    /// The spatially mirrored action: up/down and left/right are swapped,
    /// non-directional actions are unchanged.
    #[inline]
    pub const fn mirrored(self) -> Self {
        match self {
            Action::Up => Action::Down,
            Action::Down => Action::Up,
            Action::Left => Action::Right,
            Action::Right => Action::Left,
            Action::Stop | Action::Bomb => self,
        }
    }

    pub fn set_of(actions: &[Action]) -> EnumSet<Action> {
        actions.iter().copied().collect()
    }
}
