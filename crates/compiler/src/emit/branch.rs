//! Conditional branch emitters.

use zkrv_circuit::ops::{eq_words, lt_signed, lt_unsigned, mux_word};

use super::pc_plus;
use crate::context::Context;
use crate::isa::{BranchCondition, Reg};

/// Computes the taken predicate, then selects between the branch target and
/// the fall-through PC with a per-bit mux.
pub(crate) fn branch(c: &mut Context, cond: BranchCondition, rs1: Reg, rs2: Reg, offset: i32) {
    let x = c.regs.read(rs1);
    let y = c.regs.read(rs2);
    let adder = c.cfg.adder;
    let taken = match cond {
        BranchCondition::Beq => eq_words(&mut c.b, &x, &y),
        BranchCondition::Bne => {
            let eq = eq_words(&mut c.b, &x, &y);
            c.b.not(eq)
        }
        BranchCondition::Blt => lt_signed(&mut c.b, adder, &x, &y),
        BranchCondition::Bge => {
            let lt = lt_signed(&mut c.b, adder, &x, &y);
            c.b.not(lt)
        }
        BranchCondition::Bltu => lt_unsigned(&mut c.b, adder, &x, &y),
        BranchCondition::Bgeu => {
            let lt = lt_unsigned(&mut c.b, adder, &x, &y);
            c.b.not(lt)
        }
    };

    let target = pc_plus(c, offset as u32);
    let fallthrough = pc_plus(c, 4);
    let next = mux_word(&mut c.b, taken, &target, &fallthrough);
    c.regs.set_pc(next);
}
