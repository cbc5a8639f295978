//! Logarithmic barrel shifter and the zero-gate constant shifts.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

use super::{Word, WORD_BITS};

/// Variable left shift. `amount` carries the shift bits little-endian; for
/// RV32 callers pass exactly the low 5 bits of the second operand.
pub fn shift_left(b: &mut CircuitBuilder, x: &Word, amount: &[Wire]) -> Word {
    let mut cur = *x;
    for (k, &sel) in amount.iter().enumerate() {
        let dist = 1usize << k;
        cur = std::array::from_fn(|i| {
            let shifted = if i >= dist { cur[i - dist] } else { Wire::FALSE };
            b.mux(sel, shifted, cur[i])
        });
    }
    cur
}

/// Variable logical right shift.
pub fn shift_right(b: &mut CircuitBuilder, x: &Word, amount: &[Wire]) -> Word {
    shift_right_with_fill(b, x, amount, Wire::FALSE)
}

/// Variable arithmetic right shift; drop positions refill with the operand's
/// original sign bit.
pub fn shift_right_arith(b: &mut CircuitBuilder, x: &Word, amount: &[Wire]) -> Word {
    shift_right_with_fill(b, x, amount, x[WORD_BITS - 1])
}

fn shift_right_with_fill(
    b: &mut CircuitBuilder,
    x: &Word,
    amount: &[Wire],
    fill: Wire,
) -> Word {
    let mut cur = *x;
    for (k, &sel) in amount.iter().enumerate() {
        let dist = 1usize << k;
        cur = std::array::from_fn(|i| {
            let shifted = if i + dist < WORD_BITS { cur[i + dist] } else { fill };
            b.mux(sel, shifted, cur[i])
        });
    }
    cur
}

/// Constant-amount left shift: pure rewiring, zero gates.
pub fn shift_left_const(x: &Word, n: u32) -> Word {
    let n = n as usize & (WORD_BITS - 1);
    std::array::from_fn(|i| if i >= n { x[i - n] } else { Wire::FALSE })
}

/// Constant-amount right shift (logical or arithmetic): pure rewiring.
pub fn shift_right_const(x: &Word, n: u32, arith: bool) -> Word {
    let n = n as usize & (WORD_BITS - 1);
    let fill = if arith { x[WORD_BITS - 1] } else { Wire::FALSE };
    std::array::from_fn(|i| if i + n < WORD_BITS { x[i + n] } else { fill })
}
