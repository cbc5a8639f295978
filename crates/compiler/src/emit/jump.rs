//! Unconditional jump emitters.

use zkrv_circuit::ops::{add_words, const_word};
use zkrv_circuit::Wire;

use super::pc_plus;
use crate::context::Context;
use crate::isa::Reg;

/// JAL: link PC+4 into `rd`, jump to PC + offset.
pub(crate) fn jal(c: &mut Context, rd: Reg, offset: i32) {
    let link = pc_plus(c, 4);
    let target = pc_plus(c, offset as u32);
    c.regs.write(rd, link);
    c.regs.set_pc(target);
}

/// JALR: link PC+4 into `rd`, jump to `rs1 + offset` with bit 0 forced to
/// zero by rewiring.
pub(crate) fn jalr(c: &mut Context, rd: Reg, rs1: Reg, offset: i32) {
    let base = c.regs.read(rs1);
    let mut target = add_words(&mut c.b, c.cfg.adder, &base, &const_word(offset as u32));
    target[0] = Wire::FALSE;
    let link = pc_plus(c, 4);
    c.regs.write(rd, link);
    c.regs.set_pc(target);
}
