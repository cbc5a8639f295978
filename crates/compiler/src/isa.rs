//! RV32IM instruction decoding.
//!
//! Decoding is a straightforward bit-field unpack of the 32-bit word at
//! emission time; it is constant-folded by the compiler and never turned
//! into a circuit.

use std::fmt;

use log::trace;
use thiserror::Error;

/// An architectural register specifier, `x0` through `x31`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Reg(u8);

impl Reg {
    /// The hardwired zero register.
    pub const ZERO: Reg = Reg(0);

    /// Builds a specifier from the low five bits of `n`.
    pub fn new(n: u32) -> Self {
        Reg((n & 0x1f) as u8)
    }

    /// Register number as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is `x0`.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Decoded form of every supported instruction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Instruction {
    Op { op: RegRegOp, rd: Reg, rs1: Reg, rs2: Reg },
    OpImm { op: RegImmOp, rd: Reg, rs1: Reg, imm: i32 },
    OpShiftImm { op: ShiftOp, rd: Reg, rs1: Reg, shamt: u32 },
    OpShift { op: ShiftOp, rd: Reg, rs1: Reg, rs2: Reg },
    Lui { rd: Reg, imm: i32 },
    Auipc { rd: Reg, imm: i32 },
    Jal { rd: Reg, offset: i32 },
    Jalr { rd: Reg, rs1: Reg, offset: i32 },
    Branch { cond: BranchCondition, rs1: Reg, rs2: Reg, offset: i32 },
    Load { width: LoadWidth, rd: Reg, rs1: Reg, offset: i32 },
    Store { width: StoreWidth, rs2: Reg, rs1: Reg, offset: i32 },
    MulDiv { op: MulDivOp, rd: Reg, rs1: Reg, rs2: Reg },
    Ecall,
    Ebreak,
    Fence,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegRegOp {
    Add,
    Sub,
    Slt,
    Sltu,
    Xor,
    Or,
    And,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegImmOp {
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShiftOp {
    Sll,
    Srl,
    Sra,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BranchCondition {
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadWidth {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StoreWidth {
    Sb,
    Sh,
    Sw,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MulDivOp {
    Mul,
    Mulh,
    Mulhsu,
    Mulhu,
    Div,
    Divu,
    Rem,
    Remu,
}

/// Reasons an instruction word fails to decode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("unsupported opcode")]
    UnsupportedOpcode,
    #[error("illegal instruction encoding")]
    IllegalInstruction,
}

impl Instruction {
    /// Decodes one 32-bit instruction word.
    pub fn decode(word: u32) -> Result<Self, DecodeError> {
        trace!("decoding instruction {word:#010x}");
        match word & 0x7f {
            0x37 => Ok(Self::Lui { rd: rd(word), imm: u_imm(word) }),
            0x17 => Ok(Self::Auipc { rd: rd(word), imm: u_imm(word) }),
            0x6f => Ok(Self::Jal { rd: rd(word), offset: j_imm(word) }),
            0x67 => match funct3(word) {
                0 => Ok(Self::Jalr {
                    rd: rd(word),
                    rs1: rs1(word),
                    offset: i_imm(word),
                }),
                _ => Err(DecodeError::IllegalInstruction),
            },
            0x63 => {
                let cond = match funct3(word) {
                    0b000 => BranchCondition::Beq,
                    0b001 => BranchCondition::Bne,
                    0b100 => BranchCondition::Blt,
                    0b101 => BranchCondition::Bge,
                    0b110 => BranchCondition::Bltu,
                    0b111 => BranchCondition::Bgeu,
                    _ => return Err(DecodeError::IllegalInstruction),
                };
                Ok(Self::Branch {
                    cond,
                    rs1: rs1(word),
                    rs2: rs2(word),
                    offset: b_imm(word),
                })
            }
            0x03 => {
                let width = match funct3(word) {
                    0b000 => LoadWidth::Lb,
                    0b001 => LoadWidth::Lh,
                    0b010 => LoadWidth::Lw,
                    0b100 => LoadWidth::Lbu,
                    0b101 => LoadWidth::Lhu,
                    _ => return Err(DecodeError::IllegalInstruction),
                };
                Ok(Self::Load {
                    width,
                    rd: rd(word),
                    rs1: rs1(word),
                    offset: i_imm(word),
                })
            }
            0x23 => {
                let width = match funct3(word) {
                    0b000 => StoreWidth::Sb,
                    0b001 => StoreWidth::Sh,
                    0b010 => StoreWidth::Sw,
                    _ => return Err(DecodeError::IllegalInstruction),
                };
                Ok(Self::Store {
                    width,
                    rs2: rs2(word),
                    rs1: rs1(word),
                    offset: s_imm(word),
                })
            }
            0x13 => match funct3(word) {
                0b000 => Ok(op_imm(word, RegImmOp::Addi)),
                0b010 => Ok(op_imm(word, RegImmOp::Slti)),
                0b011 => Ok(op_imm(word, RegImmOp::Sltiu)),
                0b100 => Ok(op_imm(word, RegImmOp::Xori)),
                0b110 => Ok(op_imm(word, RegImmOp::Ori)),
                0b111 => Ok(op_imm(word, RegImmOp::Andi)),
                0b001 if funct7(word) == 0 => Ok(Self::OpShiftImm {
                    op: ShiftOp::Sll,
                    rd: rd(word),
                    rs1: rs1(word),
                    shamt: shamt(word),
                }),
                0b101 => match funct7(word) {
                    0x00 => Ok(Self::OpShiftImm {
                        op: ShiftOp::Srl,
                        rd: rd(word),
                        rs1: rs1(word),
                        shamt: shamt(word),
                    }),
                    0x20 => Ok(Self::OpShiftImm {
                        op: ShiftOp::Sra,
                        rd: rd(word),
                        rs1: rs1(word),
                        shamt: shamt(word),
                    }),
                    _ => Err(DecodeError::IllegalInstruction),
                },
                _ => Err(DecodeError::IllegalInstruction),
            },
            0x33 => match (funct7(word), funct3(word)) {
                (0x00, 0b000) => Ok(op_reg(word, RegRegOp::Add)),
                (0x20, 0b000) => Ok(op_reg(word, RegRegOp::Sub)),
                (0x00, 0b010) => Ok(op_reg(word, RegRegOp::Slt)),
                (0x00, 0b011) => Ok(op_reg(word, RegRegOp::Sltu)),
                (0x00, 0b100) => Ok(op_reg(word, RegRegOp::Xor)),
                (0x00, 0b110) => Ok(op_reg(word, RegRegOp::Or)),
                (0x00, 0b111) => Ok(op_reg(word, RegRegOp::And)),
                (0x00, 0b001) => Ok(op_shift(word, ShiftOp::Sll)),
                (0x00, 0b101) => Ok(op_shift(word, ShiftOp::Srl)),
                (0x20, 0b101) => Ok(op_shift(word, ShiftOp::Sra)),
                (0x01, f3) => {
                    let op = match f3 {
                        0b000 => MulDivOp::Mul,
                        0b001 => MulDivOp::Mulh,
                        0b010 => MulDivOp::Mulhsu,
                        0b011 => MulDivOp::Mulhu,
                        0b100 => MulDivOp::Div,
                        0b101 => MulDivOp::Divu,
                        0b110 => MulDivOp::Rem,
                        0b111 => MulDivOp::Remu,
                        _ => unreachable!(),
                    };
                    Ok(Self::MulDiv {
                        op,
                        rd: rd(word),
                        rs1: rs1(word),
                        rs2: rs2(word),
                    })
                }
                _ => Err(DecodeError::IllegalInstruction),
            },
            0x0f => match funct3(word) {
                // Reserved FENCE fields are treated as a plain fence for
                // forward compatibility.
                0b000 => Ok(Self::Fence),
                _ => Err(DecodeError::IllegalInstruction),
            },
            0x73 => match word >> 7 {
                0x000_0000 => Ok(Self::Ecall),
                0x000_2000 => Ok(Self::Ebreak),
                _ => Err(DecodeError::IllegalInstruction),
            },
            _ => Err(DecodeError::UnsupportedOpcode),
        }
    }
}

fn op_imm(word: u32, op: RegImmOp) -> Instruction {
    Instruction::OpImm {
        op,
        rd: rd(word),
        rs1: rs1(word),
        imm: i_imm(word),
    }
}

fn op_reg(word: u32, op: RegRegOp) -> Instruction {
    Instruction::Op {
        op,
        rd: rd(word),
        rs1: rs1(word),
        rs2: rs2(word),
    }
}

fn op_shift(word: u32, op: ShiftOp) -> Instruction {
    Instruction::OpShift {
        op,
        rd: rd(word),
        rs1: rs1(word),
        rs2: rs2(word),
    }
}

fn rd(word: u32) -> Reg {
    Reg::new(word >> 7)
}

fn rs1(word: u32) -> Reg {
    Reg::new(word >> 15)
}

fn rs2(word: u32) -> Reg {
    Reg::new(word >> 20)
}

fn funct3(word: u32) -> u32 {
    word >> 12 & 0x7
}

fn funct7(word: u32) -> u32 {
    word >> 25
}

fn shamt(word: u32) -> u32 {
    word >> 20 & 0x1f
}

/// 12-bit I-type immediate, sign-extended.
fn i_imm(word: u32) -> i32 {
    (word as i32) >> 20
}

/// 12-bit S-type immediate, sign-extended.
fn s_imm(word: u32) -> i32 {
    ((word as i32 >> 25) << 5) | (word >> 7 & 0x1f) as i32
}

/// 13-bit B-type immediate with its implicit low zero, sign-extended.
fn b_imm(word: u32) -> i32 {
    ((word as i32 >> 31) << 12)
        | ((word >> 7 & 0x1) << 11) as i32
        | ((word >> 25 & 0x3f) << 5) as i32
        | ((word >> 8 & 0xf) << 1) as i32
}

/// 32-bit U-type immediate: the top 20 bits with 12 bits of zero padding.
fn u_imm(word: u32) -> i32 {
    (word & 0xffff_f000) as i32
}

/// 21-bit J-type immediate with its implicit low zero, sign-extended.
fn j_imm(word: u32) -> i32 {
    ((word as i32 >> 31) << 20)
        | ((word >> 12 & 0xff) << 12) as i32
        | ((word >> 20 & 0x1) << 11) as i32
        | ((word >> 21 & 0x3ff) << 1) as i32
}
