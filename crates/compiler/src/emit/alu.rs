//! R-type and I-type ALU emitters.

use zkrv_circuit::ops::{
    add_words, and_words, const_word, lt_signed, lt_unsigned, or_words, sub_words, xor_words,
    zero_word, Word,
};
use zkrv_circuit::Wire;

use super::advance_pc;
use crate::context::Context;
use crate::isa::{Reg, RegImmOp, RegRegOp};

/// A comparison result as a word: the flag in bit 0, the upper 31 bits
/// wired to the false constant.
fn flag_word(flag: Wire) -> Word {
    let mut w = zero_word();
    w[0] = flag;
    w
}

pub(crate) fn reg_reg(c: &mut Context, op: RegRegOp, rd: Reg, rs1: Reg, rs2: Reg) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let x = c.regs.read(rs1);
    let y = c.regs.read(rs2);
    let adder = c.cfg.adder;
    let value = match op {
        RegRegOp::Add => add_words(&mut c.b, adder, &x, &y),
        RegRegOp::Sub => sub_words(&mut c.b, adder, &x, &y),
        RegRegOp::And => and_words(&mut c.b, &x, &y),
        RegRegOp::Or => or_words(&mut c.b, &x, &y),
        RegRegOp::Xor => xor_words(&mut c.b, &x, &y),
        RegRegOp::Slt => flag_word(lt_signed(&mut c.b, adder, &x, &y)),
        RegRegOp::Sltu => flag_word(lt_unsigned(&mut c.b, adder, &x, &y)),
    };
    c.regs.write(rd, value);
    advance_pc(c);
}

pub(crate) fn reg_imm(c: &mut Context, op: RegImmOp, rd: Reg, rs1: Reg, imm: i32) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let x = c.regs.read(rs1);
    // The sign-extended immediate is a constant bit pattern wired to the
    // reserved wires; it costs no gates by itself.
    let y = const_word(imm as u32);
    let adder = c.cfg.adder;
    let value = match op {
        RegImmOp::Addi => add_words(&mut c.b, adder, &x, &y),
        RegImmOp::Andi => and_words(&mut c.b, &x, &y),
        RegImmOp::Ori => or_words(&mut c.b, &x, &y),
        RegImmOp::Xori => xor_words(&mut c.b, &x, &y),
        RegImmOp::Slti => flag_word(lt_signed(&mut c.b, adder, &x, &y)),
        RegImmOp::Sltiu => flag_word(lt_unsigned(&mut c.b, adder, &x, &y)),
    };
    c.regs.write(rd, value);
    advance_pc(c);
}
