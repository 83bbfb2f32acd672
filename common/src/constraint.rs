use crate::Cell;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Two constraints are equal when both their cell sets and their counts match,
/// which is what the knowledge base uses to avoid storing the same fact twice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        assert!(
            count <= cells.len(),
            "constraint claims {} mines among {} cells",
            count,
            cells.len()
        );
        Constraint { cells, count }
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty constraint carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every remaining cell is a mine when the count covers the whole set.
    pub fn derive_known_mines(&self) -> BTreeSet<Cell> {
        if !self.cells.is_empty() && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every remaining cell is safe when no mines are left to place.
    pub fn derive_known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell proven to be a mine, taking its mine out of the count.
    ///
    /// Panics if the constraint already has no mines left to give up: the
    /// knowledge base is inconsistent at that point.
    pub fn apply_known_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            assert!(
                self.count > 0,
                "{} marked as a mine but the constraint {} has no mines left",
                cell,
                self
            );
            self.count -= 1;
        }
    }

    /// Removes a cell proven to be safe. The count is untouched.
    pub fn apply_known_safe(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            assert!(
                self.count <= self.cells.len(),
                "{} marked as safe but the constraint {} needs every cell to be a mine",
                cell,
                self
            );
        }
    }

    /// True when `self` is a non-empty strict subset of `other`.
    pub fn is_strict_subset_of(&self, other: &Constraint) -> bool {
        !self.cells.is_empty()
            && self.cells.len() < other.cells.len()
            && self.cells.is_subset(&other.cells)
    }

    /// Subset inference: if `self` is contained in `superset`, the cells only
    /// `superset` has must hold the mines `self` does not account for.
    pub fn difference(&self, superset: &Constraint) -> Constraint {
        let count = superset.count.checked_sub(self.count).unwrap_or_else(|| {
            panic!(
                "subset {} claims more mines than its superset {}",
                self, superset
            )
        });
        Constraint::new(superset.cells.difference(&self.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }

    #[test]
    fn test_zero_count_yields_safes() {
        let constraint = Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 0);
        assert_eq!(
            constraint.derive_known_safes(),
            BTreeSet::from([c(0, 0), c(0, 1), c(0, 2)])
        );
        assert!(constraint.derive_known_mines().is_empty());
    }

    #[test]
    fn test_full_count_yields_mines() {
        let constraint = Constraint::new([c(1, 1), c(2, 2)], 2);
        assert_eq!(
            constraint.derive_known_mines(),
            BTreeSet::from([c(1, 1), c(2, 2)])
        );
        assert!(constraint.derive_known_safes().is_empty());
    }

    #[test]
    fn test_partial_count_yields_nothing() {
        let constraint = Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 1);
        assert!(constraint.derive_known_mines().is_empty());
        assert!(constraint.derive_known_safes().is_empty());
    }

    #[test]
    fn test_empty_constraint_yields_nothing() {
        let constraint = Constraint::new([], 0);
        assert!(constraint.is_empty());
        assert!(constraint.derive_known_mines().is_empty());
        assert!(constraint.derive_known_safes().is_empty());
    }

    #[test]
    fn test_apply_known_mine() {
        let mut constraint = Constraint::new([c(0, 0), c(0, 1)], 1);
        constraint.apply_known_mine(c(0, 0));
        assert_eq!(constraint, Constraint::new([c(0, 1)], 0));

        // Non-members are ignored.
        constraint.apply_known_mine(c(5, 5));
        assert_eq!(constraint, Constraint::new([c(0, 1)], 0));
    }

    #[test]
    fn test_apply_known_safe() {
        let mut constraint = Constraint::new([c(0, 0), c(0, 1), c(1, 0)], 1);
        constraint.apply_known_safe(c(1, 0));
        assert_eq!(constraint, Constraint::new([c(0, 0), c(0, 1)], 1));
        constraint.apply_known_safe(c(1, 0));
        assert_eq!(constraint, Constraint::new([c(0, 0), c(0, 1)], 1));
    }

    #[test]
    #[should_panic(expected = "has no mines left")]
    fn test_apply_known_mine_below_zero() {
        let mut constraint = Constraint::new([c(0, 0), c(0, 1)], 0);
        constraint.apply_known_mine(c(0, 0));
    }

    #[test]
    #[should_panic(expected = "needs every cell to be a mine")]
    fn test_apply_known_safe_on_all_mine_constraint() {
        let mut constraint = Constraint::new([c(0, 0), c(0, 1)], 2);
        constraint.apply_known_safe(c(0, 1));
    }

    #[test]
    #[should_panic(expected = "constraint claims 3 mines among 2 cells")]
    fn test_count_larger_than_cells() {
        Constraint::new([c(0, 0), c(0, 1)], 3);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Constraint::new([c(0, 1), c(0, 0)], 1);
        let b = Constraint::new([c(0, 0), c(0, 1)], 1);
        assert_eq!(a, b);
        assert_ne!(a, Constraint::new([c(0, 0), c(0, 1)], 2));
    }

    #[test]
    fn test_subset_difference() {
        let a = Constraint::new([c(0, 0), c(0, 1)], 1);
        let b = Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 2);
        assert!(a.is_strict_subset_of(&b));
        assert!(!b.is_strict_subset_of(&a));
        assert!(!a.is_strict_subset_of(&a));
        assert_eq!(a.difference(&b), Constraint::new([c(0, 2)], 1));
    }

    #[test]
    fn test_display() {
        let constraint = Constraint::new([c(0, 1), c(0, 0)], 1);
        assert_eq!(constraint.to_string(), "{(0, 0), (0, 1)} = 1");
    }
}
