//! Equality and magnitude comparison.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

use super::{add, AdderKind, Word};

/// OR-reduction of a wire slice as a balanced tree.
pub fn or_reduce(b: &mut CircuitBuilder, wires: &[Wire]) -> Wire {
    match wires {
        [] => Wire::FALSE,
        [w] => *w,
        _ => {
            let mut layer = wires.to_vec();
            while layer.len() > 1 {
                let mut next = Vec::with_capacity(layer.len().div_ceil(2));
                for pair in layer.chunks(2) {
                    next.push(match pair {
                        [x, y] => b.or(*x, *y),
                        [x] => *x,
                        _ => unreachable!(),
                    });
                }
                layer = next;
            }
            layer[0]
        }
    }
}

/// True iff every bit of `x` is zero.
pub fn eq_zero(b: &mut CircuitBuilder, x: &[Wire]) -> Wire {
    let any = or_reduce(b, x);
    b.not(any)
}

/// True iff `x == y`: per-bit XOR, OR-reduce, invert.
pub fn eq_words(b: &mut CircuitBuilder, x: &Word, y: &Word) -> Wire {
    let diff: Vec<Wire> = x.iter().zip(y).map(|(&a, &c)| b.xor(a, c)).collect();
    eq_zero(b, &diff)
}

/// Unsigned `x < y`: the borrow out of `x - y`.
pub fn lt_unsigned(b: &mut CircuitBuilder, kind: AdderKind, x: &Word, y: &Word) -> Wire {
    let not_y: Vec<Wire> = y.iter().map(|&w| b.not(w)).collect();
    let (_, carry) = add(b, kind, x, &not_y, Wire::TRUE);
    b.not(carry)
}

/// Signed `x < y`.
///
/// With equal signs two's-complement order agrees with unsigned order; with
/// differing signs the unsigned verdict is exactly inverted, so one XOR
/// against the sign difference realises the whole truth table.
pub fn lt_signed(b: &mut CircuitBuilder, kind: AdderKind, x: &Word, y: &Word) -> Wire {
    let ltu = lt_unsigned(b, kind, x, y);
    let sign_diff = b.xor(x[31], y[31]);
    b.xor(ltu, sign_diff)
}
