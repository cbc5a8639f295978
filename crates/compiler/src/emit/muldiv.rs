//! M-extension emitters: one Booth–Wallace core for the multiplies, one
//! restoring divider for the divides, with the RISC-V special cases wired
//! around them.

use zkrv_circuit::ops::{
    cond_negate, const_word, eq_zero, mul_high, mul_low, mux_word, udivrem, Word,
};

use super::advance_pc;
use crate::context::Context;
use crate::isa::{MulDivOp, Reg};

pub(crate) fn mul_div(c: &mut Context, op: MulDivOp, rd: Reg, rs1: Reg, rs2: Reg) {
    if rd.is_zero() {
        advance_pc(c);
        return;
    }
    let x = c.regs.read(rs1);
    let y = c.regs.read(rs2);
    let adder = c.cfg.adder;

    let value = match op {
        MulDivOp::Mul => mul_low(&mut c.b, adder, &x, &y),
        MulDivOp::Mulh => mul_high(&mut c.b, adder, &x, &y, true, true),
        MulDivOp::Mulhsu => mul_high(&mut c.b, adder, &x, &y, true, false),
        MulDivOp::Mulhu => mul_high(&mut c.b, adder, &x, &y, false, false),

        // The unsigned divider already realises the RISC-V zero-divisor
        // rules: a zero divisor makes every trial subtract succeed, giving
        // the all-ones quotient and the dividend as remainder.
        MulDivOp::Divu => udivrem(&mut c.b, adder, &x, &y).0,
        MulDivOp::Remu => udivrem(&mut c.b, adder, &x, &y).1,

        MulDivOp::Div => signed_divrem(c, &x, &y).0,
        MulDivOp::Rem => signed_divrem(c, &x, &y).1,
    };
    c.regs.write(rd, value);
    advance_pc(c);
}

/// Signed division over the unsigned core: divide magnitudes, then restore
/// the signs. The zero-divisor results are muxed in explicitly because the
/// sign restoration would otherwise corrupt them; the INT_MIN / -1
/// overflow case needs no extra wiring, since |INT_MIN| / 1 already yields
/// the INT_MIN bit pattern with a non-negated sign.
fn signed_divrem(c: &mut Context, x: &Word, y: &Word) -> (Word, Word) {
    let adder = c.cfg.adder;
    let b = &mut c.b;
    let sign_x = x[31];
    let sign_y = y[31];

    let abs_x = cond_negate(b, adder, x, sign_x);
    let abs_y = cond_negate(b, adder, y, sign_y);
    let (q, r) = udivrem(b, adder, &abs_x, &abs_y);

    let q_negative = b.xor(sign_x, sign_y);
    let q_signed = cond_negate(b, adder, &q, q_negative);
    let r_signed = cond_negate(b, adder, &r, sign_x);

    let div_by_zero = eq_zero(b, y);
    let quotient = mux_word(b, div_by_zero, &const_word(u32::MAX), &q_signed);
    let remainder = mux_word(b, div_by_zero, x, &r_signed);
    (quotient, remainder)
}
