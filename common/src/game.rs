use crate::{Cell, all_cells, neighbors};
use rand::Rng;
use rand::seq::index;
use std::collections::BTreeSet;

/// The visible state of a single tile on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tile {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent mines.
    Flagged,
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// The environment the player acts on. It owns the mine layout and answers
/// "how many mines are next to this cell" for every cell it reveals.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    pub height: usize,
    pub width: usize,
    /// What the player sees.
    pub board: Vec<Vec<Tile>>,
    mines: BTreeSet<Cell>,
    pub game_state: GameState,
}

impl Game {
    /// Places `mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(height: usize, width: usize, mines: usize, rng: &mut R) -> Self {
        if mines > height * width {
            panic!("Total mines must not exceed the number of cells on the board.");
        }
        let layout = index::sample(rng, height * width, mines)
            .into_iter()
            .map(|i| Cell {
                row: i / width,
                col: i % width,
            });
        Game::with_mines(height, width, layout)
    }

    /// Builds a board with a fixed mine layout.
    pub fn with_mines(height: usize, width: usize, mines: impl IntoIterator<Item = Cell>) -> Self {
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|c| c.row >= height || c.col >= width) {
            panic!("Mine {} lies outside the {}x{} board.", outside, height, width);
        }
        Game {
            height,
            width,
            board: vec![vec![Tile::Hidden; width]; height],
            mines,
            game_state: GameState::Playing,
        }
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not counting the
    /// cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        neighbors(cell, self.height, self.width)
            .filter(|n| self.mines.contains(n))
            .count() as u8
    }

    /// Reveals a cell chosen by the player.
    ///
    /// Returns the adjacent mine count, or `None` if the cell was a mine and
    /// the game is lost.
    pub fn reveal(&mut self, cell: Cell) -> anyhow::Result<Option<u8>> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        if !self.in_bounds(cell) {
            anyhow::bail!("out_of_bounds");
        }

        if self.is_mine(cell) {
            self.game_state = GameState::Lost;
            return Ok(None);
        }

        let count = self.nearby_mines(cell);
        self.board[cell.row][cell.col] = Tile::Revealed(count);

        if self.check_win_condition() {
            self.game_state = GameState::Won;
        }
        Ok(Some(count))
    }

    /// Flags a cell the player has deduced to be a mine.
    pub fn flag(&mut self, cell: Cell) -> anyhow::Result<()> {
        if !self.in_bounds(cell) {
            anyhow::bail!("out_of_bounds");
        }
        if self.board[cell.row][cell.col] == Tile::Hidden {
            self.board[cell.row][cell.col] = Tile::Flagged;
        }
        Ok(())
    }

    /// The game is won once every non-mine cell has been revealed.
    pub fn check_win_condition(&self) -> bool {
        all_cells(self.height, self.width)
            .filter(|c| !self.mines.contains(c))
            .all(|c| matches!(self.board[c.row][c.col], Tile::Revealed(_)))
    }

    /// True when the flags placed are exactly the mines.
    pub fn won_by_flags(&self) -> bool {
        let flagged: BTreeSet<Cell> = all_cells(self.height, self.width)
            .filter(|c| self.board[c.row][c.col] == Tile::Flagged)
            .collect();
        flagged == self.mines
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }
}
