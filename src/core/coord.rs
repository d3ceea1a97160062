//! Board coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BOARD_CELLS, BOARD_SIZE};

/// Row-major index of a cell: `y * BOARD_SIZE + x`.
pub type CellIndex = u32;

/// A validated board coordinate (`x, y < BOARD_SIZE`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Coord {
    /// Create a coordinate, or `None` when off the board.
    pub fn new(x: u32, y: u32) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Coordinate for a row-major index.
    pub fn from_index(index: CellIndex) -> Option<Self> {
        if index < BOARD_CELLS {
            Some(Self {
                x: index % BOARD_SIZE,
                y: index / BOARD_SIZE,
            })
        } else {
            None
        }
    }

    /// Row-major index.
    #[inline]
    pub fn index(self) -> CellIndex {
        self.y * BOARD_SIZE + self.x
    }

    /// All coordinates in board order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_CELLS).filter_map(Coord::from_index)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Coord::new(0, 0).is_some());
        assert!(Coord::new(9, 9).is_some());
        assert!(Coord::new(10, 0).is_none());
        assert!(Coord::new(0, 10).is_none());
    }

    #[test]
    fn test_index_mapping() {
        let c = Coord::new(3, 7).unwrap();
        assert_eq!(c.index(), 73);
        assert_eq!(Coord::from_index(73), Some(c));
        assert_eq!(Coord::from_index(100), None);
    }

    #[test]
    fn test_all_is_board_order() {
        let all: Vec<_> = Coord::all().collect();
        assert_eq!(all.len(), BOARD_CELLS as usize);
        assert!(all.iter().enumerate().all(|(i, c)| c.index() == i as u32));
    }
}
