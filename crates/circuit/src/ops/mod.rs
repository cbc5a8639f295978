//! Bit-blast primitives for 32-bit words.
//!
//! A [`Word`] is a block of 32 wires in little-endian significance order.
//! Constant words are built entirely from the two reserved wires and emit
//! no gates.

mod add;
mod cmp;
mod div;
mod mul;
mod shift;

pub use add::{add, add_words, cond_negate, kogge_stone_add, ripple_carry_add, sub_with_borrow, sub_words};
pub use cmp::{eq_words, eq_zero, lt_signed, lt_unsigned, or_reduce};
pub use div::udivrem;
pub use mul::{mul, mul_high, mul_low};
pub use shift::{shift_left, shift_left_const, shift_right, shift_right_arith, shift_right_const};

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

/// The width of an architectural word, in bits.
pub const WORD_BITS: usize = 32;

/// A 32-bit word as wires, least-significant bit first.
pub type Word = [Wire; WORD_BITS];

/// Which 32-bit adder realisation the emitters use; selected by
/// configuration once per compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdderKind {
    /// Carry-chained ripple adder, 5 gates per bit.
    #[default]
    Ripple,
    /// Parallel-prefix Kogge–Stone adder, logarithmic depth.
    KoggeStone,
}

/// A word holding a compile-time constant, wired to the reserved constants.
pub fn const_word(value: u32) -> Word {
    std::array::from_fn(|i| Wire::constant(value >> i & 1 == 1))
}

/// The all-zero word.
pub fn zero_word() -> Word {
    [Wire::FALSE; WORD_BITS]
}

/// Converts a wire slice of length 32 into a [`Word`].
///
/// # Panics
///
/// If the slice is not exactly 32 wires long.
pub fn word_from_slice(wires: &[Wire]) -> Word {
    wires.try_into().expect("expected exactly 32 wires")
}

/// Per-bit AND of two words.
pub fn and_words(b: &mut CircuitBuilder, x: &Word, y: &Word) -> Word {
    std::array::from_fn(|i| b.and(x[i], y[i]))
}

/// Per-bit XOR of two words.
pub fn xor_words(b: &mut CircuitBuilder, x: &Word, y: &Word) -> Word {
    std::array::from_fn(|i| b.xor(x[i], y[i]))
}

/// Per-bit OR of two words, via the 3-gate identity.
pub fn or_words(b: &mut CircuitBuilder, x: &Word, y: &Word) -> Word {
    std::array::from_fn(|i| b.or(x[i], y[i]))
}

/// Per-bit multiplex: `s ? x : y`.
pub fn mux_word(b: &mut CircuitBuilder, s: Wire, x: &Word, y: &Word) -> Word {
    std::array::from_fn(|i| b.mux(s, x[i], y[i]))
}
