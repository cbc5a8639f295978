//! RV32IM to Boolean-circuit compiler.
//!
//! Translates machine code into an AND/XOR netlist whose evaluation
//! reproduces, bit for bit, the architectural state transition the
//! processor would execute. The circuit's input and output bit vectors
//! carry the fixed state layout (constants, PC, registers, memory region);
//! instruction emitters thread register-wire bindings through the running
//! data-flow, and loads and stores go through one of three pluggable
//! memory tiers.

pub mod compile;
pub mod config;
pub mod context;
mod emit;
pub mod error;
pub mod io;
pub mod isa;
pub mod mem;
pub mod state;

pub use compile::{compile, Program};
pub use config::{AdderKind, CompileConfig, MemoryTier};
pub use context::Context;
pub use error::{CompileError, Precondition, Resource};
pub use io::{CircuitLayout, CompiledProgram, DecodedState, MemoryImage};
pub use isa::{Instruction, Reg};
pub use state::MachineState;
