use crate::constraint::Constraint;
use crate::{Cell, all_cells, neighbors};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;

/// Everything the player has learned about one game. Only ever grows or gets
/// refined; nothing is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    /// Cells that have already been chosen.
    pub moves_made: BTreeSet<Cell>,
    /// Cells proven not to be mines.
    pub known_safe: BTreeSet<Cell>,
    /// Cells proven to be mines.
    pub known_mine: BTreeSet<Cell>,
    /// Live constraints in insertion order, never holding two equal entries.
    pub constraints: Vec<Constraint>,
}

/// What a single call to [`InferenceEngine::ingest`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of fixpoint passes, including the final one that changed nothing.
    pub passes: usize,
    /// Cells newly proven safe, excluding the ingested cell itself.
    pub new_safes: BTreeSet<Cell>,
    /// Cells newly proven to be mines.
    pub new_mines: BTreeSet<Cell>,
    /// Constraints added by subset inference.
    pub inferred: usize,
}

/// Deductive minesweeper player.
///
/// The engine is fed one fact per revealed cell (its adjacent mine count) and
/// only ever asserts what follows logically from the facts seen so far. It
/// does not guess; guessing is left to [`InferenceEngine::next_guess_move`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InferenceEngine {
    height: usize,
    width: usize,
    kb: KnowledgeBase,
}

impl InferenceEngine {
    pub fn new(height: usize, width: usize) -> Self {
        InferenceEngine {
            height,
            width,
            kb: KnowledgeBase::default(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.kb.moves_made
    }

    pub fn known_safes(&self) -> &BTreeSet<Cell> {
        &self.kb.known_safe
    }

    pub fn known_mines(&self) -> &BTreeSet<Cell> {
        &self.kb.known_mine
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.kb.constraints
    }

    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.kb.known_safe.contains(&cell)
    }

    pub fn is_known_mine(&self, cell: Cell) -> bool {
        self.kb.known_mine.contains(&cell)
    }

    /// Records that `cell` was revealed safely with `adjacent_mines` mines
    /// around it, then derives everything that follows.
    ///
    /// The caller guarantees the cell is not a mine. Ingesting a cell the
    /// engine has already proven to be a mine, or a count that contradicts
    /// what is known, is a broken contract and panics.
    pub fn ingest(&mut self, cell: Cell, adjacent_mines: usize) -> IngestReport {
        assert!(
            cell.row < self.height && cell.col < self.width,
            "{} is outside the {}x{} board",
            cell,
            self.height,
            self.width
        );
        assert!(
            !self.kb.known_mine.contains(&cell),
            "{} was revealed but is a known mine",
            cell
        );

        self.kb.moves_made.insert(cell);
        self.mark_safe(cell);

        let mut count = adjacent_mines;
        let mut unknown = BTreeSet::new();
        for neighbor in neighbors(cell, self.height, self.width) {
            if self.kb.known_safe.contains(&neighbor) {
                continue;
            }
            if self.kb.known_mine.contains(&neighbor) {
                count = count.checked_sub(1).unwrap_or_else(|| {
                    panic!(
                        "{} reports {} adjacent mines but more are known",
                        cell, adjacent_mines
                    )
                });
                continue;
            }
            unknown.insert(neighbor);
        }

        if !unknown.is_empty() {
            self.add_constraint(Constraint::new(unknown, count));
        } else {
            assert_eq!(
                count, 0,
                "{} reports {} adjacent mines but none are left unknown",
                cell, adjacent_mines
            );
        }

        let mut report = self.run_to_fixpoint();
        report.new_safes.remove(&cell);
        report
    }

    /// Records a cell learned to be safe from outside the board (for instance
    /// a guaranteed-safe opening) and derives everything that follows.
    pub fn assert_safe(&mut self, cell: Cell) -> IngestReport {
        let marked = self.mark_safe(cell);
        self.settle(cell, marked)
    }

    /// Records a cell learned to be a mine and derives everything that follows.
    pub fn assert_mine(&mut self, cell: Cell) -> IngestReport {
        let marked = self.mark_mine(cell);
        self.settle(cell, marked)
    }

    fn settle(&mut self, cell: Cell, marked: bool) -> IngestReport {
        if marked {
            self.compact();
        }
        let mut report = self.run_to_fixpoint();
        report.new_safes.remove(&cell);
        report.new_mines.remove(&cell);
        report
    }

    /// Marks a cell as safe everywhere. Returns false if it already was.
    ///
    /// Only purges the cell from the constraints; callers run the fixpoint.
    pub(crate) fn mark_safe(&mut self, cell: Cell) -> bool {
        assert!(
            !self.kb.known_mine.contains(&cell),
            "{} is already known to be a mine",
            cell
        );
        if !self.kb.known_safe.insert(cell) {
            return false;
        }
        for constraint in &mut self.kb.constraints {
            constraint.apply_known_safe(cell);
        }
        true
    }

    /// Marks a cell as a mine everywhere. Returns false if it already was.
    pub(crate) fn mark_mine(&mut self, cell: Cell) -> bool {
        assert!(
            !self.kb.known_safe.contains(&cell),
            "{} is already known to be safe",
            cell
        );
        if !self.kb.known_mine.insert(cell) {
            return false;
        }
        for constraint in &mut self.kb.constraints {
            constraint.apply_known_mine(cell);
        }
        true
    }

    /// Adds a constraint unless it is empty or an equal one is already live.
    fn add_constraint(&mut self, constraint: Constraint) -> bool {
        if constraint.is_empty() || self.kb.constraints.contains(&constraint) {
            return false;
        }
        self.kb.constraints.push(constraint);
        true
    }

    /// Alternates direct deduction and subset inference until a full pass
    /// changes nothing.
    fn run_to_fixpoint(&mut self) -> IngestReport {
        let mut report = IngestReport::default();
        let mut changed = true;
        while changed {
            report.passes += 1;
            changed = false;

            // a) direct deductions
            let mut safes = BTreeSet::new();
            let mut mines = BTreeSet::new();
            for constraint in &self.kb.constraints {
                safes.extend(constraint.derive_known_safes());
                mines.extend(constraint.derive_known_mines());
            }
            for cell in safes {
                if self.mark_safe(cell) {
                    report.new_safes.insert(cell);
                    changed = true;
                }
            }
            for cell in mines {
                if self.mark_mine(cell) {
                    report.new_mines.insert(cell);
                    changed = true;
                }
            }
            if changed {
                self.compact();
            }

            // b) subset inference over a frozen snapshot of the live list
            let inferred = self.infer_from_subsets();
            if !inferred.is_empty() {
                report.inferred += inferred.len();
                self.kb.constraints.extend(inferred);
                changed = true;
            }
        }
        report
    }

    /// Drops emptied constraints and collapses ones that purging made equal,
    /// keeping the first occurrence.
    fn compact(&mut self) {
        let mut kept: Vec<Constraint> = Vec::with_capacity(self.kb.constraints.len());
        for constraint in self.kb.constraints.drain(..) {
            if !constraint.is_empty() && !kept.contains(&constraint) {
                kept.push(constraint);
            }
        }
        self.kb.constraints = kept;
    }

    fn infer_from_subsets(&self) -> Vec<Constraint> {
        let live = &self.kb.constraints;
        let mut inferred: Vec<Constraint> = Vec::new();
        for (i, subset) in live.iter().enumerate() {
            for (j, superset) in live.iter().enumerate() {
                if i == j || !subset.is_strict_subset_of(superset) {
                    continue;
                }
                let candidate = subset.difference(superset);
                if !live.contains(&candidate) && !inferred.contains(&candidate) {
                    inferred.push(candidate);
                }
            }
        }
        inferred
    }

    /// The smallest known-safe cell (by row, then column) not yet played.
    pub fn next_safe_move(&self) -> Option<Cell> {
        self.kb
            .known_safe
            .iter()
            .find(|cell| !self.kb.moves_made.contains(cell))
            .copied()
    }

    /// A uniformly random cell that has not been played and is not a known
    /// mine, or `None` when no such cell exists.
    pub fn next_guess_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = all_cells(self.height, self.width)
            .filter(|cell| !self.kb.moves_made.contains(cell) && !self.kb.known_mine.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }
}
