//! SAT cross-check of the knowledge base.
//!
//! The deductive engine is deliberately incomplete: it may leave cells
//! undetermined that full logical entailment would settle. This module encodes
//! what the engine currently knows as CNF and asks a SAT solver, for every cell
//! still mentioned by a constraint, whether it is forced either way. It is a
//! diagnostic only; play never depends on it.

use crate::Cell;
use crate::knowledge::KnowledgeBase;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// The possible outcomes of the solver's analysis for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // All valid solutions require this cell to be a mine.
    ForcedSafe,   // All valid solutions require this cell to be safe.
    Undetermined, // Valid solutions exist for this cell being either a mine or safe.
}

/// Classifies every cell that appears in a live constraint.
///
/// Errors with `inconsistent_knowledge` if no mine assignment satisfies the
/// knowledge base.
pub fn analyze(kb: &KnowledgeBase) -> anyhow::Result<BTreeMap<Cell, DeducedState>> {
    let mut solver = Solver::new();
    let mut formula = CnfFormula::new();
    let mut var_map: BTreeMap<Cell, Var> = BTreeMap::new();

    let unknown: BTreeSet<Cell> = kb
        .constraints
        .iter()
        .flat_map(|c| c.cells().iter().copied())
        .collect();
    for &cell in unknown
        .iter()
        .chain(kb.known_safe.iter())
        .chain(kb.known_mine.iter())
    {
        var_map.entry(cell).or_insert_with(|| solver.new_var());
    }

    for cell in &kb.known_safe {
        formula.add_clause(&[Lit::from_var(var_map[cell], false)]);
    }
    for cell in &kb.known_mine {
        formula.add_clause(&[Lit::from_var(var_map[cell], true)]);
    }
    for constraint in &kb.constraints {
        let lits: Vec<Lit> = constraint
            .cells()
            .iter()
            .map(|cell| Lit::from_var(var_map[cell], true))
            .collect();
        encode_exactly_k_to_formula(&mut formula, &lits, constraint.count());
    }

    solver.add_formula(&formula);

    if !solver.solve()? {
        anyhow::bail!("inconsistent_knowledge");
    }

    let mut deductions = BTreeMap::new();
    for cell in unknown {
        let var = var_map[&cell];
        let mine_possible = satisfiable_with(&mut solver, Lit::from_var(var, true))?;
        let safe_possible = satisfiable_with(&mut solver, Lit::from_var(var, false))?;

        let state = match (mine_possible, safe_possible) {
            (true, true) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (false, false) => anyhow::bail!("state_collision"),
        };
        deductions.insert(cell, state);
    }

    Ok(deductions)
}

/// Cells the solver can settle but the engine has left undetermined.
pub fn missed_deductions(kb: &KnowledgeBase) -> anyhow::Result<BTreeMap<Cell, DeducedState>> {
    Ok(analyze(kb)?
        .into_iter()
        .filter(|(_, state)| *state != DeducedState::Undetermined)
        .collect())
}

fn satisfiable_with(solver: &mut Solver, lit: Lit) -> anyhow::Result<bool> {
    solver.assume(&[lit]);
    let result = solver.solve();
    solver.assume(&[]);
    Ok(result?)
}

/// Encodes an "exactly k" constraint into the CNF formula.
///
/// Constraints never span more than one cell's neighborhood, so the naive
/// combination encoding stays small.
fn encode_exactly_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    encode_at_most_k_to_formula(formula, vars, k);
    encode_at_least_k_to_formula(formula, vars, k);
}

/// Encodes an "at most k" constraint: no k + 1 cells are all mines.
fn encode_at_most_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k >= vars.len() {
        return;
    }
    for combo in vars.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
}

/// Encodes an "at least k" constraint: any n - k + 1 cells hold a mine.
fn encode_at_least_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k == 0 {
        return;
    }
    if k > vars.len() {
        formula.add_clause(&[]);
        return;
    }
    for combo in vars.iter().copied().combinations(vars.len() - k + 1) {
        formula.add_clause(&combo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;

    fn c(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }

    #[test]
    fn test_symmetric_pair_is_undetermined() {
        let kb = KnowledgeBase {
            constraints: vec![Constraint::new([c(0, 0), c(0, 1)], 1)],
            ..Default::default()
        };
        let deductions = analyze(&kb).unwrap();
        assert_eq!(deductions[&c(0, 0)], DeducedState::Undetermined);
        assert_eq!(deductions[&c(0, 1)], DeducedState::Undetermined);
        assert!(missed_deductions(&kb).unwrap().is_empty());
    }

    #[test]
    fn test_overlap_the_subset_rule_cannot_see() {
        // {a,b,c} = 1 and {b,c,d} = 2 share cells without either containing
        // the other, yet d must be a mine and a must be safe.
        let kb = KnowledgeBase {
            constraints: vec![
                Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 1),
                Constraint::new([c(0, 1), c(0, 2), c(0, 3)], 2),
            ],
            ..Default::default()
        };
        let deductions = analyze(&kb).unwrap();
        assert_eq!(deductions[&c(0, 0)], DeducedState::ForcedSafe);
        assert_eq!(deductions[&c(0, 1)], DeducedState::Undetermined);
        assert_eq!(deductions[&c(0, 2)], DeducedState::Undetermined);
        assert_eq!(deductions[&c(0, 3)], DeducedState::ForcedMine);
        assert_eq!(missed_deductions(&kb).unwrap().len(), 2);
    }

    #[test]
    fn test_known_facts_are_respected() {
        let kb = KnowledgeBase {
            known_mine: BTreeSet::from([c(5, 5)]),
            known_safe: BTreeSet::from([c(4, 4)]),
            constraints: vec![Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 2)],
            ..Default::default()
        };
        let deductions = analyze(&kb).unwrap();
        assert_eq!(deductions.len(), 3);
        assert!(!deductions.contains_key(&c(5, 5)));
    }

    #[test]
    fn test_inconsistent_knowledge() {
        let kb = KnowledgeBase {
            constraints: vec![
                Constraint::new([c(0, 0), c(0, 1)], 2),
                Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 0),
            ],
            ..Default::default()
        };
        let err = analyze(&kb).unwrap_err();
        assert_eq!(err.to_string(), "inconsistent_knowledge");
    }
}
