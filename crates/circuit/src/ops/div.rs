//! Restoring division, bit-blasted as 32 subtract-and-select steps.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

use super::{add, AdderKind, Word, WORD_BITS};

/// Unsigned 32-bit division returning `(quotient, remainder)`.
///
/// Each step shifts the next dividend bit into the partial remainder, trial
/// subtracts the divisor at 33-bit width, and keeps the difference when no
/// borrow occurred. With a zero divisor every trial succeeds, producing the
/// all-ones quotient; the RISC-V wiring for that case and the signed
/// variants lives in the divide emitters.
pub fn udivrem(
    b: &mut CircuitBuilder,
    adder: AdderKind,
    n: &Word,
    d: &Word,
) -> (Word, Word) {
    // ¬d at 33-bit width, computed once; the appended bit is ¬0 = 1.
    let mut not_d: Vec<Wire> = d.iter().map(|&w| b.not(w)).collect();
    not_d.push(Wire::TRUE);

    let mut rem = [Wire::FALSE; WORD_BITS];
    let mut quot = [Wire::FALSE; WORD_BITS];

    for i in (0..WORD_BITS).rev() {
        // rp = (rem << 1) | n[i], 33 bits wide.
        let mut rp = Vec::with_capacity(WORD_BITS + 1);
        rp.push(n[i]);
        rp.extend_from_slice(&rem);

        let (diff, carry) = add(b, adder, &rp, &not_d, Wire::TRUE);
        quot[i] = carry;
        for k in 0..WORD_BITS {
            rem[k] = b.mux(carry, diff[k], rp[k]);
        }
    }

    (quot, rem)
}
