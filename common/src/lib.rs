//! A minesweeper player that reasons with a knowledge base.
//!
//! The player learns one fact per revealed cell ("exactly n of these
//! neighbors are mines"), keeps those facts as [`Constraint`]s and refines them
//! until nothing new follows. It only ever asserts what is logically certain;
//! when nothing is certain the caller falls back to a random guess.

pub mod constraint;
pub mod game;
pub mod knowledge;
pub mod oracle;
pub mod session;

pub use constraint::Constraint;
pub use game::{Game, GameState, Tile};
pub use knowledge::{IngestReport, InferenceEngine, KnowledgeBase};
pub use oracle::DeducedState;
pub use session::{Move, Session, StepOutcome};

use std::fmt;

/// A board coordinate. Ordered by row, then column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All in-bounds cells within one row and column of `cell`, excluding the cell
/// itself. Cells on an edge or corner have fewer than eight neighbors.
pub fn neighbors(cell: Cell, height: usize, width: usize) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dr| {
        (-1..=1).filter_map(move |dc| {
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;

            if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                Some(Cell {
                    row: row as usize,
                    col: col as usize,
                })
            } else {
                None
            }
        })
    })
}

/// Every cell of a `height` x `width` board in row-major order.
pub fn all_cells(height: usize, width: usize) -> impl Iterator<Item = Cell> {
    (0..height).flat_map(move |row| (0..width).map(move |col| Cell { row, col }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_neighbors() {
        // Corner cell (0,0) should have 3 neighbors
        assert_eq!(neighbors(Cell { row: 0, col: 0 }, 3, 3).count(), 3);

        // Center cell (1,1) should have 8 neighbors
        assert_eq!(neighbors(Cell { row: 1, col: 1 }, 3, 3).count(), 8);

        // Edge cell (0,1) should have 5 neighbors
        assert_eq!(neighbors(Cell { row: 0, col: 1 }, 3, 3).count(), 5);

        // A single row has no wraparound
        let row: Vec<Cell> = neighbors(Cell { row: 0, col: 0 }, 1, 3).collect();
        assert_eq!(row, vec![Cell { row: 0, col: 1 }]);
    }

    #[test]
    fn test_all_cells() {
        assert_eq!(all_cells(2, 3).count(), 6);
        assert_eq!(all_cells(0, 4).count(), 0);
        assert_eq!(all_cells(4, 0).count(), 0);
        assert_eq!(all_cells(2, 2).last(), Some(Cell { row: 1, col: 1 }));
    }

    #[test]
    fn test_cell_order() {
        assert!(Cell { row: 0, col: 5 } < Cell { row: 1, col: 0 });
        assert!(Cell { row: 1, col: 0 } < Cell { row: 1, col: 1 });
    }
}
