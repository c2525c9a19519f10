use enum_map::Enum;

use super::action::Vec2;

/// Number of actors in a match.
pub const NUM_PLAYERS: usize = 4;

/// Identifies one of the four actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerId {
    Agent0,
    Agent1,
    Agent2,
    Agent3,
}

crate::impl_display_from_debug!(PlayerId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tile {
    #[default]
    Passage,
    Rigid,
    Wood,
    Bomb,
    Flames,
    Fog,
    ExtraBomb,
    IncrRange,
    Kick,
    AgentDummy,
    Agent(PlayerId),
}

impl Tile {
    /// Whether stepping onto this tile kills the actor on the same tick.
    #[inline]
    pub fn is_lethal(self) -> bool {
        matches!(self, Tile::Flames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board must have at least one row and one column")]
    Empty,
    #[error("row {row} has {len} tiles, expected {width}")]
    RaggedRow { row: usize, len: usize, width: usize },
    #[error("position {0} is outside of the board")]
    OutOfBounds(Vec2),
}

/// Row-major grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Board {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    /// Builds a board from rows, top row first.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or_default();
        if height == 0 || width == 0 {
            return Err(BoardError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (row, tiles_in_row) in rows.iter().enumerate() {
            let tiles_in_row = tiles_in_row.as_ref();
            if tiles_in_row.len() != width {
                return Err(BoardError::RaggedRow {
                    row,
                    len: tiles_in_row.len(),
                    width,
                });
            }
            tiles.extend_from_slice(tiles_in_row);
        }
        Ok(Self { width, height, tiles })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, pos: Vec2) -> Option<Tile> {
        self.offset(pos).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, pos: Vec2, tile: Tile) -> Result<(), BoardError> {
        let i = self.offset(pos).ok_or(BoardError::OutOfBounds(pos))?;
        self.tiles[i] = tile;
        Ok(())
    }

    #[inline]
    fn offset(&self, pos: Vec2) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }
}
