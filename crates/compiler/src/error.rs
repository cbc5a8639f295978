//! Typed compilation failures.
//!
//! All three kinds are non-recoverable locally: the compiler context is
//! left consistent but partially populated and must be discarded.
//! Violations of the fabric invariants themselves are bugs and abort via
//! assertions instead of surfacing here.

use thiserror::Error;

/// Which budget a compilation overran.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Resource {
    InputBits,
    OutputBits,
    Wires,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::InputBits => "input bits",
            Resource::OutputBits => "output bits",
            Resource::Wires => "wires",
        };
        f.write_str(name)
    }
}

/// A malformed program rejected before emission begins.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Precondition {
    #[error("entry PC {0:#010x} is not 4-byte aligned")]
    MisalignedEntryPc(u32),
    #[error("program has no instructions")]
    EmptyProgram,
    #[error("initial data of {bytes} bytes exceeds the {limit}-byte memory region")]
    OversizeInitialData { bytes: usize, limit: usize },
}

/// The failure modes of a batch compilation.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CompileError {
    #[error("unsupported opcode {word:#010x} at instruction index {index}")]
    UnsupportedOpcode { word: u32, index: usize },

    #[error("budget exceeded: {required} {resource} required, limit is {limit}")]
    BudgetExceeded {
        resource: Resource,
        required: u64,
        limit: u64,
    },

    #[error("precondition violation: {0}")]
    Precondition(#[from] Precondition),
}
