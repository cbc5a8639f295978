//! Shared test support: an instruction encoder, a reference interpreter
//! used as the differential oracle, and the compile-evaluate-compare
//! harness.
#![allow(dead_code)]

use std::collections::HashMap;

use bitvec::prelude::*;
use zkrv_circuit::eval::evaluate;
use zkrv_compiler::isa::{
    BranchCondition, Instruction, LoadWidth, MulDivOp, RegImmOp, RegRegOp, ShiftOp, StoreWidth,
};
use zkrv_compiler::mem::{AccessWitness, MerkleMemory};
use zkrv_compiler::{
    compile, CompileConfig, DecodedState, MachineState, MemoryImage, MemoryTier, Program,
};

// --- instruction encoding -------------------------------------------------

fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn i_type(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    ((imm as u32 & 0xfff) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn s_type(imm: i32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    let imm = imm as u32;
    ((imm >> 5 & 0x7f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm & 0x1f) << 7)
        | 0x23
}

fn b_type(offset: i32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    let imm = offset as u32;
    ((imm >> 12 & 1) << 31)
        | ((imm >> 5 & 0x3f) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm >> 1 & 0xf) << 8)
        | ((imm >> 11 & 1) << 7)
        | 0x63
}

fn u_type(imm: u32, rd: u32, opcode: u32) -> u32 {
    (imm & 0xffff_f000) | (rd << 7) | opcode
}

fn j_type(offset: i32, rd: u32) -> u32 {
    let imm = offset as u32;
    ((imm >> 20 & 1) << 31)
        | ((imm >> 1 & 0x3ff) << 21)
        | ((imm >> 11 & 1) << 20)
        | ((imm >> 12 & 0xff) << 12)
        | (rd << 7)
        | 0x6f
}

pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b000, rd, 0x33) }
pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x20, rs2, rs1, 0b000, rd, 0x33) }
pub fn sll(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b001, rd, 0x33) }
pub fn slt(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b010, rd, 0x33) }
pub fn sltu(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b011, rd, 0x33) }
pub fn xor(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b100, rd, 0x33) }
pub fn srl(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b101, rd, 0x33) }
pub fn sra(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x20, rs2, rs1, 0b101, rd, 0x33) }
pub fn or(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b110, rd, 0x33) }
pub fn and(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x00, rs2, rs1, 0b111, rd, 0x33) }

pub fn mul(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b000, rd, 0x33) }
pub fn mulh(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b001, rd, 0x33) }
pub fn mulhsu(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b010, rd, 0x33) }
pub fn mulhu(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b011, rd, 0x33) }
pub fn div(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b100, rd, 0x33) }
pub fn divu(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b101, rd, 0x33) }
pub fn rem(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b110, rd, 0x33) }
pub fn remu(rd: u32, rs1: u32, rs2: u32) -> u32 { r_type(0x01, rs2, rs1, 0b111, rd, 0x33) }

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b000, rd, 0x13) }
pub fn slti(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b010, rd, 0x13) }
pub fn sltiu(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b011, rd, 0x13) }
pub fn xori(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b100, rd, 0x13) }
pub fn ori(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b110, rd, 0x13) }
pub fn andi(rd: u32, rs1: u32, imm: i32) -> u32 { i_type(imm, rs1, 0b111, rd, 0x13) }
pub fn slli(rd: u32, rs1: u32, shamt: u32) -> u32 { i_type(shamt as i32, rs1, 0b001, rd, 0x13) }
pub fn srli(rd: u32, rs1: u32, shamt: u32) -> u32 { i_type(shamt as i32, rs1, 0b101, rd, 0x13) }
pub fn srai(rd: u32, rs1: u32, shamt: u32) -> u32 {
    i_type(shamt as i32 | 0x400, rs1, 0b101, rd, 0x13)
}

pub fn lui(rd: u32, imm: u32) -> u32 { u_type(imm, rd, 0x37) }
pub fn auipc(rd: u32, imm: u32) -> u32 { u_type(imm, rd, 0x17) }

pub fn jal(rd: u32, offset: i32) -> u32 { j_type(offset, rd) }
pub fn jalr(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b000, rd, 0x67) }

pub fn beq(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b000) }
pub fn bne(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b001) }
pub fn blt(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b100) }
pub fn bge(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b101) }
pub fn bltu(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b110) }
pub fn bgeu(rs1: u32, rs2: u32, offset: i32) -> u32 { b_type(offset, rs2, rs1, 0b111) }

pub fn lb(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b000, rd, 0x03) }
pub fn lh(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b001, rd, 0x03) }
pub fn lw(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b010, rd, 0x03) }
pub fn lbu(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b100, rd, 0x03) }
pub fn lhu(rd: u32, rs1: u32, offset: i32) -> u32 { i_type(offset, rs1, 0b101, rd, 0x03) }

pub fn sb(rs2: u32, rs1: u32, offset: i32) -> u32 { s_type(offset, rs2, rs1, 0b000) }
pub fn sh(rs2: u32, rs1: u32, offset: i32) -> u32 { s_type(offset, rs2, rs1, 0b001) }
pub fn sw(rs2: u32, rs1: u32, offset: i32) -> u32 { s_type(offset, rs2, rs1, 0b010) }

pub fn ecall() -> u32 { 0x0000_0073 }
pub fn ebreak() -> u32 { 0x0010_0073 }
pub fn fence() -> u32 { 0x0000_000f }

// --- reference interpreter ------------------------------------------------

/// A recorded word-level memory access, in the order the emitters perform
/// them (sub-word stores read before writing back).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOp {
    Read(u64),
    Write(u64, u32),
}

/// Straight-line reference interpreter.
///
/// The circuit compiles the instruction list as a straight line: every
/// instruction executes exactly once in program order, and the PC is just
/// another register that control flow writes to. The oracle mirrors that.
pub struct Interp {
    pub pc: u32,
    pub regs: [u32; 32],
    pub mem: HashMap<u64, u32>,
    pub trap: bool,
    pub ops: Vec<MemOp>,
    index_mask: u64,
}

impl Interp {
    /// `index_bits` is the number of word-address bits the memory tier
    /// decodes (3 for ultra, 8 for simple, the tree depth for
    /// authenticated).
    pub fn new(state: &MachineState, index_bits: usize) -> Self {
        let mut regs = state.regs;
        regs[0] = 0;
        Self {
            pc: state.pc,
            regs,
            mem: HashMap::new(),
            trap: false,
            ops: Vec::new(),
            index_mask: (1u64 << index_bits) - 1,
        }
    }

    pub fn load_words(&mut self, words: &[u32]) {
        for (i, &w) in words.iter().enumerate() {
            self.mem.insert(i as u64, w);
        }
    }

    fn word_index(&self, ea: u32) -> u64 {
        (u64::from(ea) >> 2) & self.index_mask
    }

    fn read_word(&mut self, idx: u64) -> u32 {
        self.ops.push(MemOp::Read(idx));
        self.mem.get(&idx).copied().unwrap_or(0)
    }

    fn peek_word(&self, idx: u64) -> u32 {
        self.mem.get(&idx).copied().unwrap_or(0)
    }

    fn write_word(&mut self, idx: u64, value: u32) {
        self.ops.push(MemOp::Write(idx, value));
        self.mem.insert(idx, value);
    }

    fn set_reg(&mut self, rd: usize, value: u32) {
        if rd != 0 {
            self.regs[rd] = value;
        }
    }

    pub fn run(&mut self, words: &[u32]) {
        for &word in words {
            let instr = Instruction::decode(word).expect("oracle: undecodable word");
            self.exec(&instr);
        }
    }

    pub fn exec(&mut self, instr: &Instruction) {
        let next_pc = self.pc.wrapping_add(4);
        match *instr {
            Instruction::Op { op, rd, rs1, rs2 } => {
                let x = self.regs[rs1.index()];
                let y = self.regs[rs2.index()];
                let v = match op {
                    RegRegOp::Add => x.wrapping_add(y),
                    RegRegOp::Sub => x.wrapping_sub(y),
                    RegRegOp::Slt => u32::from((x as i32) < (y as i32)),
                    RegRegOp::Sltu => u32::from(x < y),
                    RegRegOp::Xor => x ^ y,
                    RegRegOp::Or => x | y,
                    RegRegOp::And => x & y,
                };
                self.set_reg(rd.index(), v);
                self.pc = next_pc;
            }
            Instruction::OpImm { op, rd, rs1, imm } => {
                let x = self.regs[rs1.index()];
                let y = imm as u32;
                let v = match op {
                    RegImmOp::Addi => x.wrapping_add(y),
                    RegImmOp::Slti => u32::from((x as i32) < (y as i32)),
                    RegImmOp::Sltiu => u32::from(x < y),
                    RegImmOp::Xori => x ^ y,
                    RegImmOp::Ori => x | y,
                    RegImmOp::Andi => x & y,
                };
                self.set_reg(rd.index(), v);
                self.pc = next_pc;
            }
            Instruction::OpShiftImm { op, rd, rs1, shamt } => {
                let x = self.regs[rs1.index()];
                self.set_reg(rd.index(), shift_value(op, x, shamt));
                self.pc = next_pc;
            }
            Instruction::OpShift { op, rd, rs1, rs2 } => {
                let x = self.regs[rs1.index()];
                let amount = self.regs[rs2.index()] & 0x1f;
                self.set_reg(rd.index(), shift_value(op, x, amount));
                self.pc = next_pc;
            }
            Instruction::Lui { rd, imm } => {
                self.set_reg(rd.index(), imm as u32);
                self.pc = next_pc;
            }
            Instruction::Auipc { rd, imm } => {
                self.set_reg(rd.index(), self.pc.wrapping_add(imm as u32));
                self.pc = next_pc;
            }
            Instruction::Jal { rd, offset } => {
                self.set_reg(rd.index(), next_pc);
                self.pc = self.pc.wrapping_add(offset as u32);
            }
            Instruction::Jalr { rd, rs1, offset } => {
                let target = self.regs[rs1.index()].wrapping_add(offset as u32) & !1;
                self.set_reg(rd.index(), next_pc);
                self.pc = target;
            }
            Instruction::Branch { cond, rs1, rs2, offset } => {
                let x = self.regs[rs1.index()];
                let y = self.regs[rs2.index()];
                let taken = match cond {
                    BranchCondition::Beq => x == y,
                    BranchCondition::Bne => x != y,
                    BranchCondition::Blt => (x as i32) < (y as i32),
                    BranchCondition::Bge => (x as i32) >= (y as i32),
                    BranchCondition::Bltu => x < y,
                    BranchCondition::Bgeu => x >= y,
                };
                self.pc = if taken {
                    self.pc.wrapping_add(offset as u32)
                } else {
                    next_pc
                };
            }
            Instruction::Load { width, rd, rs1, offset } => {
                if rd.is_zero() {
                    self.pc = next_pc;
                    return;
                }
                let ea = self.regs[rs1.index()].wrapping_add(offset as u32);
                let word = self.read_word(self.word_index(ea));
                let value = match width {
                    LoadWidth::Lw => word,
                    LoadWidth::Lh | LoadWidth::Lhu => {
                        let half = word >> (16 * (ea >> 1 & 1)) & 0xffff;
                        if width == LoadWidth::Lh {
                            half as u16 as i16 as i32 as u32
                        } else {
                            half
                        }
                    }
                    LoadWidth::Lb | LoadWidth::Lbu => {
                        let byte = word >> (8 * (ea & 3)) & 0xff;
                        if width == LoadWidth::Lb {
                            byte as u8 as i8 as i32 as u32
                        } else {
                            byte
                        }
                    }
                };
                self.set_reg(rd.index(), value);
                self.pc = next_pc;
            }
            Instruction::Store { width, rs2, rs1, offset } => {
                let ea = self.regs[rs1.index()].wrapping_add(offset as u32);
                let idx = self.word_index(ea);
                let data = self.regs[rs2.index()];
                match width {
                    StoreWidth::Sw => self.write_word(idx, data),
                    StoreWidth::Sh => {
                        let old = self.read_word(idx);
                        let lane = 16 * (ea >> 1 & 1);
                        let merged = (old & !(0xffff << lane)) | ((data & 0xffff) << lane);
                        self.write_word(idx, merged);
                    }
                    StoreWidth::Sb => {
                        let old = self.read_word(idx);
                        let lane = 8 * (ea & 3);
                        let merged = (old & !(0xff << lane)) | ((data & 0xff) << lane);
                        self.write_word(idx, merged);
                    }
                }
                self.pc = next_pc;
            }
            Instruction::MulDiv { op, rd, rs1, rs2 } => {
                let x = self.regs[rs1.index()];
                let y = self.regs[rs2.index()];
                self.set_reg(rd.index(), muldiv_value(op, x, y));
                self.pc = next_pc;
            }
            Instruction::Ecall | Instruction::Ebreak => {
                self.trap = true;
                self.pc = next_pc;
            }
            Instruction::Fence => {
                self.pc = next_pc;
            }
        }
    }
}

fn shift_value(op: ShiftOp, x: u32, amount: u32) -> u32 {
    match op {
        ShiftOp::Sll => x << amount,
        ShiftOp::Srl => x >> amount,
        ShiftOp::Sra => ((x as i32) >> amount) as u32,
    }
}

fn muldiv_value(op: MulDivOp, x: u32, y: u32) -> u32 {
    match op {
        MulDivOp::Mul => x.wrapping_mul(y),
        MulDivOp::Mulh => {
            ((((x as i32) as i64).wrapping_mul((y as i32) as i64) as u64) >> 32) as u32
        }
        MulDivOp::Mulhsu => ((((x as i32) as i64).wrapping_mul(y as i64) as u64) >> 32) as u32,
        MulDivOp::Mulhu => (((x as u64) * (y as u64)) >> 32) as u32,
        MulDivOp::Div => {
            if y == 0 {
                u32::MAX
            } else if x == 0x8000_0000 && y == u32::MAX {
                x
            } else {
                ((x as i32) / (y as i32)) as u32
            }
        }
        MulDivOp::Divu => {
            if y == 0 { u32::MAX } else { x / y }
        }
        MulDivOp::Rem => {
            if y == 0 {
                x
            } else if x == 0x8000_0000 && y == u32::MAX {
                0
            } else {
                ((x as i32) % (y as i32)) as u32
            }
        }
        MulDivOp::Remu => {
            if y == 0 { x } else { x % y }
        }
    }
}

// --- compile-evaluate-compare harness -------------------------------------

pub fn index_bits(config: &CompileConfig) -> usize {
    match config.memory_tier {
        MemoryTier::Ultra => 3,
        MemoryTier::Simple => 8,
        MemoryTier::Authenticated => config.auth_depth,
    }
}

/// Compiles and evaluates a program against a concrete initial state, and
/// checks every architectural output against the reference interpreter.
/// Returns the decoded circuit outputs for extra assertions.
pub fn check_program(
    words: &[u32],
    state: &MachineState,
    initial_words: &[u32],
    config: &CompileConfig,
) -> DecodedState {
    let program = Program {
        entry_pc: state.pc,
        words: words.to_vec(),
        initial_data: Vec::new(),
    };
    let compiled = compile(&program, config).expect("compilation failed");

    // Reference run.
    let mut oracle = Interp::new(state, index_bits(config));
    oracle.load_words(initial_words);
    oracle.run(words);

    // Inputs, including authenticated witnesses replayed off the oracle's
    // access log.
    let (image, witnesses, expected_memory) = match config.memory_tier {
        MemoryTier::Ultra | MemoryTier::Simple => {
            let n = config.memory_words();
            let mut init = vec![0u32; n];
            init[..initial_words.len()].copy_from_slice(initial_words);
            let expected: Vec<u32> = (0..n as u64).map(|i| oracle.peek_word(i)).collect();
            (
                MemoryImage::Words(init),
                Vec::new(),
                MemoryImage::Words(expected),
            )
        }
        MemoryTier::Authenticated => {
            let mut tree = MerkleMemory::with_words(config.auth_depth, initial_words);
            let root = tree.root();
            let witnesses: Vec<AccessWitness> = oracle
                .ops
                .iter()
                .map(|op| match *op {
                    MemOp::Read(idx) => tree.access(idx, None),
                    MemOp::Write(idx, value) => tree.access(idx, Some(value)),
                })
                .collect();
            (
                MemoryImage::Root(root),
                witnesses,
                MemoryImage::Root(tree.root()),
            )
        }
    };

    let inputs: BitVec = compiled.encode_inputs(state, &image, &witnesses);
    let outputs = evaluate(&compiled.circuit, &inputs);
    let decoded = compiled.decode_outputs(&outputs);

    assert_eq!(decoded.state.pc, oracle.pc, "final PC differs from oracle");
    for r in 0..32 {
        assert_eq!(
            decoded.state.regs[r], oracle.regs[r],
            "x{r} differs from oracle"
        );
    }
    assert_eq!(decoded.memory, expected_memory, "memory differs from oracle");
    assert_eq!(decoded.trap, oracle.trap, "trap flag differs from oracle");
    if let Some(ok) = decoded.proof_ok {
        assert!(ok, "authenticated access proofs did not verify");
    }
    decoded
}

/// Shorthand for a register file with a few named values.
pub fn state_with(pc: u32, assignments: &[(usize, u32)]) -> MachineState {
    let mut state = MachineState::at_pc(pc);
    for &(r, v) in assignments {
        state.regs[r] = v;
    }
    state
}
