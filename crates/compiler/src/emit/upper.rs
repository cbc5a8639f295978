//! Upper-immediate emitters.

use zkrv_circuit::ops::const_word;

use super::{advance_pc, pc_plus};
use crate::context::Context;
use crate::isa::Reg;

/// LUI is pure rewiring: the immediate bits go straight to the destination.
pub(crate) fn lui(c: &mut Context, rd: Reg, imm: i32) {
    c.regs.write(rd, const_word(imm as u32));
    advance_pc(c);
}

/// AUIPC is one adder on PC + immediate.
pub(crate) fn auipc(c: &mut Context, rd: Reg, imm: i32) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let value = pc_plus(c, imm as u32);
    c.regs.write(rd, value);
    advance_pc(c);
}
