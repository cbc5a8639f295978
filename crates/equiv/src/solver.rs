//! CDCL-backed equivalence decision with a wall-clock budget.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;
use varisat::{ExtendFormula, Lit, Solver};
use zkrv_circuit::{Circuit, Wire};

use crate::cnf::{tseitin, var, Cnf};

/// Outcome of one equivalence query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    /// UNSAT miter: the candidates agree on every input assignment.
    Equivalent,
    /// SAT miter: an input assignment on which the candidates differ.
    Inequivalent { counterexample: Vec<bool> },
    /// The solver exceeded its budget or failed; callers treat this as a
    /// test failure but not as a compiler error.
    Unknown,
}

/// Decides whether the two candidates inside a miter are equivalent.
///
/// The miter must have exactly one output (see
/// [`crate::miter::build_miter`]). The CNF is the Tseitin translation plus
/// the unit clause asserting the difference output; UNSAT therefore proves
/// bit-for-bit equivalence over all input assignments.
///
/// `timeout` bounds the solver's wall-clock time. The query runs on a
/// worker thread; when the budget expires the result is abandoned and
/// `Unknown` is returned.
pub fn check_equivalence(miter: &Circuit, timeout: Option<Duration>) -> Equivalence {
    assert_eq!(miter.num_outputs(), 1, "miter must have a single output");
    let any_diff = miter.outputs()[0];

    // Constant differences never reach the solver.
    if any_diff == Wire::FALSE {
        return Equivalence::Equivalent;
    }
    let num_inputs = miter.num_inputs() as usize;
    if any_diff == Wire::TRUE {
        return Equivalence::Inequivalent {
            counterexample: vec![false; num_inputs],
        };
    }

    let mut cnf = tseitin(miter);
    cnf.clauses.push(vec![var(any_diff)]);
    debug!(
        "equivalence query: {} vars, {} clauses",
        cnf.num_vars,
        cnf.clauses.len()
    );

    match timeout {
        None => solve(cnf, num_inputs),
        Some(budget) => {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let _ = tx.send(solve(cnf, num_inputs));
            });
            match rx.recv_timeout(budget) {
                Ok(result) => result,
                Err(_) => Equivalence::Unknown,
            }
        }
    }
}

fn solve(cnf: Cnf, num_inputs: usize) -> Equivalence {
    let mut solver = Solver::new();
    for clause in &cnf.clauses {
        let lits: Vec<Lit> = clause
            .iter()
            .map(|&l| Lit::from_dimacs(l as isize))
            .collect();
        solver.add_clause(&lits);
    }

    match solver.solve() {
        Ok(false) => Equivalence::Equivalent,
        Ok(true) => {
            let model = solver.model().unwrap_or_default();
            // Input bits live on wires 2..2+n, i.e. DIMACS vars 3..3+n.
            let mut counterexample = vec![false; num_inputs];
            for lit in model {
                let d = lit.var().to_dimacs();
                if d >= 3 && (d as usize) < 3 + num_inputs {
                    counterexample[d as usize - 3] = lit.is_positive();
                }
            }
            Equivalence::Inequivalent { counterexample }
        }
        Err(_) => Equivalence::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miter::build_miter;

    #[test]
    fn tautological_miter_is_equivalent_without_solving() {
        let miter = build_miter(1, |_, i| vec![i[0]], |_, i| vec![i[0]]);
        assert_eq!(check_equivalence(&miter, None), Equivalence::Equivalent);
    }

    #[test]
    fn or_identity_is_equivalent() {
        // OR(a, b) == XOR(XOR(a, b), AND(a, b)), built two different ways.
        let miter = build_miter(
            2,
            |b, i| vec![b.or(i[0], i[1])],
            |b, i| {
                // A NAND-free DeMorgan rendition: ¬(¬a ∧ ¬b).
                let na = b.not(i[0]);
                let nb = b.not(i[1]);
                let both = b.and(na, nb);
                vec![b.not(both)]
            },
        );
        assert_eq!(check_equivalence(&miter, None), Equivalence::Equivalent);
    }

    #[test]
    fn and_vs_or_yields_counterexample() {
        let miter = build_miter(
            2,
            |b, i| vec![b.and(i[0], i[1])],
            |b, i| vec![b.or(i[0], i[1])],
        );
        match check_equivalence(&miter, None) {
            Equivalence::Inequivalent { counterexample } => {
                // AND and OR differ exactly when the inputs differ.
                assert_eq!(counterexample.len(), 2);
                assert_ne!(counterexample[0], counterexample[1]);
            }
            other => panic!("expected a counterexample, got {other:?}"),
        }
    }

    #[test]
    fn constant_difference_short_circuits() {
        let miter = build_miter(1, |_, _| vec![Wire::FALSE], |_, _| vec![Wire::TRUE]);
        match check_equivalence(&miter, None) {
            Equivalence::Inequivalent { counterexample } => {
                assert_eq!(counterexample.len(), 1);
            }
            other => panic!("expected a counterexample, got {other:?}"),
        }
    }
}
