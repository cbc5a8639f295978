//! Batch compilation: program in, circuit out.

use log::{debug, trace};

use crate::config::{CompileConfig, MemoryTier};
use crate::context::Context;
use crate::error::{CompileError, Precondition};
use crate::io::CompiledProgram;
use crate::isa::{Instruction, RegImmOp, StoreWidth};

/// A program as the core consumes it: a flat table of instruction words,
/// an entry PC, and optional initial bytes for the memory region. How
/// these are obtained (ELF, raw assembly, hex dump) is the concern of
/// external collaborators.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub entry_pc: u32,
    pub words: Vec<u32>,
    pub initial_data: Vec<u8>,
}

/// Compiles a whole program under the given configuration.
///
/// Construction is single-threaded and deterministic: the output circuit
/// is a pure function of the program and the configuration, and two runs
/// produce byte-identical circuits.
pub fn compile(program: &Program, config: &CompileConfig) -> Result<CompiledProgram, CompileError> {
    if program.words.is_empty() {
        return Err(Precondition::EmptyProgram.into());
    }
    if program.entry_pc % 4 != 0 {
        return Err(Precondition::MisalignedEntryPc(program.entry_pc).into());
    }
    let data_limit = config.memory_words() * 4;
    if program.initial_data.len() > data_limit {
        return Err(Precondition::OversizeInitialData {
            bytes: program.initial_data.len(),
            limit: data_limit,
        }
        .into());
    }

    let mut instructions = Vec::with_capacity(program.words.len());
    for (index, &word) in program.words.iter().enumerate() {
        let instr = Instruction::decode(word)
            .map_err(|_| CompileError::UnsupportedOpcode { word, index })?;
        trace!("instruction {index}: {instr:?}");
        instructions.push(instr);
    }

    // On the authenticated tier the witness bit count must be declared
    // before emission, so count the accesses the emitters will perform.
    let auth_accesses = match config.memory_tier {
        MemoryTier::Authenticated => instructions.iter().map(access_count).sum(),
        _ => 0,
    };

    let mut ctx = Context::new(config, auth_accesses)?;
    let mut i = 0;
    while i < instructions.len() {
        if config.fuse
            && i + 1 < instructions.len()
            && fuse_pair(&mut ctx, &instructions[i], &instructions[i + 1])?
        {
            i += 2;
            continue;
        }
        ctx.emit_instruction(&instructions[i])?;
        i += 1;
    }

    let compiled = ctx.finalize();
    debug!(
        "compiled {} instructions into {} gates",
        instructions.len(),
        compiled.circuit.gates().len(),
    );
    Ok(compiled)
}

/// Memory accesses one instruction emits on the authenticated tier.
fn access_count(instr: &Instruction) -> usize {
    match *instr {
        // Loads to x0 are emitted as pure no-ops.
        Instruction::Load { rd, .. } => usize::from(!rd.is_zero()),
        Instruction::Store { width: StoreWidth::Sw, .. } => 1,
        // Sub-word stores read, merge, and write back.
        Instruction::Store { .. } => 2,
        _ => 0,
    }
}

/// Recognises the two supported fusion pairs and emits their combined
/// circuit. Both require the ADDI to consume and overwrite the first
/// instruction's destination, which makes the pair equivalent to a single
/// constant load (LUI) or PC-relative add (AUIPC).
fn fuse_pair(
    ctx: &mut Context,
    first: &Instruction,
    second: &Instruction,
) -> Result<bool, CompileError> {
    let &Instruction::OpImm {
        op: RegImmOp::Addi,
        rd: addi_rd,
        rs1: addi_rs1,
        imm: low,
    } = second
    else {
        return Ok(false);
    };

    match *first {
        Instruction::Lui { rd, imm } if rd == addi_rd && rd == addi_rs1 => {
            let value = (imm as u32).wrapping_add(low as u32);
            trace!("fusing LUI+ADDI into constant {value:#010x} for {rd}");
            ctx.emit_fused_constant(rd, value)?;
            Ok(true)
        }
        Instruction::Auipc { rd, imm } if rd == addi_rd && rd == addi_rs1 => {
            let offset = (imm as u32).wrapping_add(low as u32);
            trace!("fusing AUIPC+ADDI into PC offset {offset:#010x} for {rd}");
            ctx.emit_fused_pc_offset(rd, offset)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
