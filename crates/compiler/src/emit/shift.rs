//! Shift emitters: barrel shifter for register amounts, pure rewiring for
//! immediate amounts.

use zkrv_circuit::ops::{
    shift_left, shift_left_const, shift_right, shift_right_arith, shift_right_const,
};

use super::advance_pc;
use crate::context::Context;
use crate::isa::{Reg, ShiftOp};

pub(crate) fn reg(c: &mut Context, op: ShiftOp, rd: Reg, rs1: Reg, rs2: Reg) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let x = c.regs.read(rs1);
    // Only the low 5 bits of the second operand ever matter on RV32.
    let amount = {
        let y = c.regs.read(rs2);
        [y[0], y[1], y[2], y[3], y[4]]
    };
    let value = match op {
        ShiftOp::Sll => shift_left(&mut c.b, &x, &amount),
        ShiftOp::Srl => shift_right(&mut c.b, &x, &amount),
        ShiftOp::Sra => shift_right_arith(&mut c.b, &x, &amount),
    };
    c.regs.write(rd, value);
    advance_pc(c);
}

pub(crate) fn imm(c: &mut Context, op: ShiftOp, rd: Reg, rs1: Reg, shamt: u32) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let x = c.regs.read(rs1);
    let value = match op {
        ShiftOp::Sll => shift_left_const(&x, shamt),
        ShiftOp::Srl => shift_right_const(&x, shamt, false),
        ShiftOp::Sra => shift_right_const(&x, shamt, true),
    };
    c.regs.write(rd, value);
    advance_pc(c);
}
