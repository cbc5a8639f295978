//! The per-compilation context: the only long-lived mutable state.

use log::debug;
use zkrv_circuit::ops::word_from_slice;
use zkrv_circuit::{CircuitBuilder, Wire};

use crate::config::{CompileConfig, MemoryTier};
use crate::emit;
use crate::error::{CompileError, Resource};
use crate::io::{CircuitLayout, CompiledProgram};
use crate::isa::Instruction;
use crate::mem::{
    witness_bits_per_access, AuthMemory, MemoryCircuit, SimpleMemory, UltraMemory,
};
use crate::state::{RegisterFile, NUM_REGS};

/// Wires kept in reserve below the 32-bit wire-id ceiling so that a single
/// instruction (at worst an authenticated sub-word store) can never
/// overflow the counter mid-emission.
const WIRE_HEADROOM: u32 = 1 << 26;

/// A compiler context: created empty with the constants wired and the state
/// layout reserved, mutated by emitter calls in source-program order, then
/// finalized into the output circuit. Append-only throughout.
pub struct Context {
    pub(crate) b: CircuitBuilder,
    pub(crate) cfg: CompileConfig,
    pub(crate) regs: RegisterFile,
    pub(crate) mem: Box<dyn MemoryCircuit>,
    pub(crate) trap: Wire,
    layout: CircuitLayout,
    instructions: usize,
}

impl Context {
    /// Builds a context for the given configuration.
    ///
    /// `auth_accesses` is the number of memory accesses the program will
    /// emit on the authenticated tier (ignored elsewhere); it must be known
    /// up front so the witness input bits can be declared before emission
    /// and checked against the input budget.
    pub fn new(cfg: &CompileConfig, auth_accesses: usize) -> Result<Self, CompileError> {
        let region_bits = cfg.memory_region_bits();
        let witness_bits = match cfg.memory_tier {
            MemoryTier::Authenticated => auth_accesses * witness_bits_per_access(cfg.auth_depth),
            _ => 0,
        };

        // Budget preconditions come before any emission. The two constant
        // wires count toward the architectural bit vectors.
        let input_bits = 2 + 32 + 32 * NUM_REGS + region_bits + witness_bits;
        let input_limit = cfg.max_input_bytes * 8;
        if input_bits > input_limit {
            return Err(CompileError::BudgetExceeded {
                resource: Resource::InputBits,
                required: input_bits as u64,
                limit: input_limit as u64,
            });
        }
        let output_bits = 2
            + 32
            + 32 * NUM_REGS
            + region_bits
            + 1
            + usize::from(cfg.memory_tier == MemoryTier::Authenticated);
        let output_limit = cfg.max_output_bytes * 8;
        if output_bits > output_limit {
            return Err(CompileError::BudgetExceeded {
                resource: Resource::OutputBits,
                required: output_bits as u64,
                limit: output_limit as u64,
            });
        }

        let mut b = CircuitBuilder::new(cfg.dedup);
        let pc = word_from_slice(&b.add_inputs(32));
        let reg_wires = b.add_inputs(32 * NUM_REGS as u32);
        let regs = RegisterFile::new(
            pc,
            std::array::from_fn(|r| word_from_slice(&reg_wires[r * 32..(r + 1) * 32])),
        );
        let region = b.add_inputs(region_bits as u32);
        let mem: Box<dyn MemoryCircuit> = match cfg.memory_tier {
            MemoryTier::Ultra => Box::new(UltraMemory::new(&region)),
            MemoryTier::Simple => Box::new(SimpleMemory::new(&region)),
            MemoryTier::Authenticated => {
                let witness = b.add_inputs(witness_bits as u32);
                Box::new(AuthMemory::new(&region, witness, cfg.auth_depth))
            }
        };

        let layout = CircuitLayout {
            tier: cfg.memory_tier,
            auth_depth: cfg.auth_depth,
            auth_accesses,
            mem_region_bits: region_bits,
            input_bits: (input_bits - 2) as u64,
            output_bits: output_bits as u64,
        };

        Ok(Self {
            b,
            cfg: cfg.clone(),
            regs,
            mem,
            trap: Wire::FALSE,
            layout,
            instructions: 0,
        })
    }

    /// Emits one decoded instruction.
    pub fn emit_instruction(&mut self, instr: &Instruction) -> Result<(), CompileError> {
        self.check_headroom()?;
        emit::emit_instruction(self, instr);
        self.instructions += 1;
        Ok(())
    }

    /// Emits a fused LUI+ADDI pair: the combined constant is pure rewiring
    /// and the PC advances past both instructions.
    pub fn emit_fused_constant(&mut self, rd: crate::isa::Reg, value: u32) -> Result<(), CompileError> {
        self.check_headroom()?;
        self.regs.write(rd, zkrv_circuit::ops::const_word(value));
        let next = emit::pc_plus(self, 8);
        self.regs.set_pc(next);
        self.instructions += 2;
        Ok(())
    }

    /// Emits a fused AUIPC+ADDI pair: one adder on PC plus the combined
    /// immediate.
    pub fn emit_fused_pc_offset(&mut self, rd: crate::isa::Reg, offset: u32) -> Result<(), CompileError> {
        self.check_headroom()?;
        if !rd.is_zero() {
            let value = emit::pc_plus(self, offset);
            self.regs.write(rd, value);
        }
        let next = emit::pc_plus(self, 8);
        self.regs.set_pc(next);
        self.instructions += 2;
        Ok(())
    }

    fn check_headroom(&self) -> Result<(), CompileError> {
        if self.b.num_wires() >= u32::MAX - WIRE_HEADROOM {
            return Err(CompileError::BudgetExceeded {
                resource: Resource::Wires,
                required: u64::from(self.b.num_wires()) + u64::from(WIRE_HEADROOM),
                limit: u64::from(u32::MAX),
            });
        }
        Ok(())
    }

    /// Declares the outputs in state-layout order and seals the circuit.
    pub fn finalize(mut self) -> CompiledProgram {
        self.b.add_output(Wire::FALSE);
        self.b.add_output(Wire::TRUE);
        self.b.add_outputs(self.regs.pc());
        let reg_wires = self.regs.output_wires();
        self.b.add_outputs(&reg_wires);
        let mem_wires = self.mem.output_wires();
        self.b.add_outputs(&mem_wires);
        self.b.add_output(self.trap);
        if let Some(ok) = self.mem.proof_ok() {
            self.b.add_output(ok);
        }

        debug!(
            "finalized {} instructions into {} gates over {} wires",
            self.instructions,
            self.b.num_gates(),
            self.b.num_wires(),
        );
        let circuit = self.b.finish();
        debug_assert_eq!(circuit.num_outputs() as u64, self.layout.output_bits);
        debug_assert!(circuit.validate().is_ok());
        CompiledProgram {
            circuit,
            layout: self.layout,
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("builder", &self.b)
            .field("instructions", &self.instructions)
            .finish()
    }
}
