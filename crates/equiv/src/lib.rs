//! Equivalence checking for circuit emitters.
//!
//! Reduces "do these two gate networks compute the same Boolean function"
//! to a SAT query: build a miter over shared inputs, translate it to CNF
//! with the Tseitin encoding, assert the difference output, and hand the
//! formula to a CDCL solver. UNSAT proves equivalence on all `2^k` input
//! assignments; SAT yields a concrete counterexample; exceeding the
//! wall-clock budget yields `Unknown`.

pub mod cnf;
pub mod miter;
pub mod solver;

pub use cnf::{tseitin, write_dimacs, Cnf};
pub use miter::build_miter;
pub use solver::{check_equivalence, Equivalence};
