//! Compilation configuration.

pub use zkrv_circuit::ops::AdderKind;

/// Which memory implementation backs loads and stores, and its gate budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryTier {
    /// 8 words held as plain wires; cheapest decode.
    #[default]
    Ultra,
    /// 256 words with an 8-bit one-hot select.
    Simple,
    /// Merkle-authenticated memory with SHA3-256 path proofs.
    Authenticated,
}

/// Default I/O budget: 10 MiB of input bits and 10 MiB of output bits.
pub const DEFAULT_MAX_IO_BYTES: usize = 10 * 1024 * 1024;

/// Default Merkle tree depth for the authenticated tier (2^20 leaves).
pub const DEFAULT_AUTH_DEPTH: usize = 20;

/// All knobs the core recognises. Selected once per compilation; there is
/// no per-instruction policy.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Memory implementation behind the common access operation.
    pub memory_tier: MemoryTier,
    /// The 32-bit adder primitive used by every emitter.
    pub adder: AdderKind,
    /// Upper bound on the declared input bit count, in bytes.
    pub max_input_bytes: usize,
    /// Upper bound on the declared output bit count, in bytes.
    pub max_output_bytes: usize,
    /// Whether the fabric hashes new gates and reuses existing output wires
    /// on collision.
    pub dedup: bool,
    /// Whether the dispatcher recognises LUI+ADDI and AUIPC+ADDI pairs and
    /// emits a single combined circuit.
    pub fuse: bool,
    /// Merkle tree depth of the authenticated tier. The default covers
    /// 2^20 words; tests shrink it to keep path proofs cheap.
    pub auth_depth: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            memory_tier: MemoryTier::default(),
            adder: AdderKind::default(),
            max_input_bytes: DEFAULT_MAX_IO_BYTES,
            max_output_bytes: DEFAULT_MAX_IO_BYTES,
            dedup: true,
            fuse: false,
            auth_depth: DEFAULT_AUTH_DEPTH,
        }
    }
}

impl CompileConfig {
    /// Memory-region capacity in 32-bit words for the configured tier.
    pub fn memory_words(&self) -> usize {
        match self.memory_tier {
            MemoryTier::Ultra => 8,
            MemoryTier::Simple => 256,
            MemoryTier::Authenticated => 1usize << self.auth_depth,
        }
    }

    /// Bits the memory region occupies in the state layout: the words
    /// themselves for the plain tiers, the 256-bit root for the
    /// authenticated tier.
    pub fn memory_region_bits(&self) -> usize {
        match self.memory_tier {
            MemoryTier::Ultra => 8 * 32,
            MemoryTier::Simple => 256 * 32,
            MemoryTier::Authenticated => 256,
        }
    }
}
