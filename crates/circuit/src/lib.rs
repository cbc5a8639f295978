//! Circuit fabric and bit-blast library over the {AND, XOR} basis.
//!
//! This crate knows nothing about RISC-V: it provides wire allocation and
//! gate emission ([`CircuitBuilder`]), the word-level arithmetic and bit
//! primitives built on top of it ([`ops`]), the in-circuit SHA3-256
//! permutation ([`sha3`]), and a direct evaluator used as ground truth by
//! every differential test ([`eval`]).

pub mod builder;
pub mod eval;
pub mod ops;
pub mod sha3;
pub mod wire;

pub use builder::{Circuit, CircuitBuilder};
pub use wire::{Gate, GateKind, Wire};
