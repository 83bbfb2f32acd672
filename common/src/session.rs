use crate::Cell;
use crate::game::{Game, GameState};
use crate::knowledge::{IngestReport, InferenceEngine};
use rand::Rng;

/// How the player picked a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Proven safe by the knowledge base.
    Safe(Cell),
    /// Picked at random among cells not known to be mines.
    Guess(Cell),
}

impl Move {
    pub fn cell(&self) -> Cell {
        match *self {
            Move::Safe(cell) | Move::Guess(cell) => cell,
        }
    }
}

/// Result of one player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Revealed {
        mv: Move,
        count: u8,
        report: IngestReport,
    },
    HitMine(Cell),
    /// Every cell is either played or a known mine.
    NoMoves,
}

/// A game paired with the engine playing it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub game: Game,
    pub ai: InferenceEngine,
}

impl Session {
    pub fn new(game: Game) -> Self {
        let ai = InferenceEngine::new(game.height, game.width);
        Session { game, ai }
    }

    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Plays a single turn: a proven-safe cell if one exists, otherwise a guess.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<StepOutcome> {
        if self.game.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let mv = match self.ai.next_safe_move() {
            Some(cell) => Move::Safe(cell),
            None => match self.ai.next_guess_move(rng) {
                Some(cell) => Move::Guess(cell),
                None => return Ok(StepOutcome::NoMoves),
            },
        };

        let Some(count) = self.game.reveal(mv.cell())? else {
            return Ok(StepOutcome::HitMine(mv.cell()));
        };

        let report = self.ai.ingest(mv.cell(), count as usize);
        for &mine in &report.new_mines {
            self.game.flag(mine)?;
        }

        Ok(StepOutcome::Revealed { mv, count, report })
    }

    /// Steps until the game is decided or the player runs out of moves.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.game.game_state == GameState::Playing {
            if self.step(rng)? == StepOutcome::NoMoves {
                break;
            }
        }
        Ok(self.game.game_state)
    }
}
