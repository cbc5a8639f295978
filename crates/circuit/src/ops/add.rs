//! Adders and the subtract/negate helpers built on them.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

use super::{AdderKind, Word, WORD_BITS};

/// One full-adder bit: 3 XOR and 2 AND gates.
///
/// Returns `(sum, carry_out)`.
pub(crate) fn full_adder(b: &mut CircuitBuilder, x: Wire, y: Wire, carry_in: Wire) -> (Wire, Wire) {
    let half_sum = b.xor(x, y);
    let sum = b.xor(half_sum, carry_in);
    let half_carry = b.and(x, y);
    let carry_prop = b.and(half_sum, carry_in);
    let carry_out = b.xor(half_carry, carry_prop);
    (sum, carry_out)
}

/// Adds two equal-width bit vectors through the selected adder.
///
/// Returns the sum bits and the carry out of the top bit.
pub fn add(
    b: &mut CircuitBuilder,
    kind: AdderKind,
    x: &[Wire],
    y: &[Wire],
    carry_in: Wire,
) -> (Vec<Wire>, Wire) {
    match kind {
        AdderKind::Ripple => ripple_carry_add(b, x, y, carry_in),
        AdderKind::KoggeStone => kogge_stone_add(b, x, y, carry_in),
    }
}

/// Carry-chained ripple adder, 5 gates per bit before folding.
pub fn ripple_carry_add(
    b: &mut CircuitBuilder,
    x: &[Wire],
    y: &[Wire],
    carry_in: Wire,
) -> (Vec<Wire>, Wire) {
    assert_eq!(x.len(), y.len(), "adder: operand widths differ");
    let mut carry = carry_in;
    let mut sum = Vec::with_capacity(x.len());
    for (&a, &c) in x.iter().zip(y.iter()) {
        let (s, cout) = full_adder(b, a, c, carry);
        sum.push(s);
        carry = cout;
    }
    (sum, carry)
}

/// Parallel-prefix Kogge–Stone adder.
///
/// Generate and propagate use the strict (XOR) propagate, which makes the
/// segment generate and `propagate AND carry` terms disjoint, so every OR in
/// the prefix combine collapses to a single XOR. Depth is logarithmic in the
/// width.
pub fn kogge_stone_add(
    b: &mut CircuitBuilder,
    x: &[Wire],
    y: &[Wire],
    carry_in: Wire,
) -> (Vec<Wire>, Wire) {
    assert_eq!(x.len(), y.len(), "adder: operand widths differ");
    let n = x.len();
    assert!(n > 0, "adder: zero-width operands");

    let p: Vec<Wire> = x.iter().zip(y).map(|(&a, &c)| b.xor(a, c)).collect();
    let mut g: Vec<Wire> = x.iter().zip(y).map(|(&a, &c)| b.and(a, c)).collect();

    // Fold the carry-in into the bit-0 generate: G'(0) = g0 | (p0 & cin).
    let t = b.and(p[0], carry_in);
    g[0] = b.xor(g[0], t);

    let mut gg = g;
    let mut pp = p.clone();
    let mut dist = 1;
    while dist < n {
        let mut next_g = gg.clone();
        let mut next_p = pp.clone();
        for i in dist..n {
            let t = b.and(pp[i], gg[i - dist]);
            next_g[i] = b.xor(gg[i], t);
            next_p[i] = b.and(pp[i], pp[i - dist]);
        }
        gg = next_g;
        pp = next_p;
        dist *= 2;
    }

    // gg[i] is now the carry out of bit i; the sum needs the carry in.
    let mut sum = Vec::with_capacity(n);
    sum.push(b.xor(p[0], carry_in));
    for i in 1..n {
        sum.push(b.xor(p[i], gg[i - 1]));
    }
    (sum, gg[n - 1])
}

/// 32-bit add, dropping the carry out.
pub fn add_words(b: &mut CircuitBuilder, kind: AdderKind, x: &Word, y: &Word) -> Word {
    let (sum, _) = add(b, kind, x, y, Wire::FALSE);
    super::word_from_slice(&sum)
}

/// 32-bit subtract `x - y`, realised as `x + ¬y + 1`.
pub fn sub_words(b: &mut CircuitBuilder, kind: AdderKind, x: &Word, y: &Word) -> Word {
    let (diff, _) = sub_with_borrow(b, kind, x, y);
    diff
}

/// 32-bit subtract returning `(difference, borrow)`. The borrow is the
/// inverted carry out and doubles as the unsigned less-than wire.
pub fn sub_with_borrow(
    b: &mut CircuitBuilder,
    kind: AdderKind,
    x: &Word,
    y: &Word,
) -> (Word, Wire) {
    let not_y: Vec<Wire> = y.iter().map(|&w| b.not(w)).collect();
    let (diff, carry) = add(b, kind, x, &not_y, Wire::TRUE);
    (super::word_from_slice(&diff), b.not(carry))
}

/// Two's-complement negate of `x` when `s` is set, else `x` unchanged:
/// `(x XOR s) + s`.
pub fn cond_negate(b: &mut CircuitBuilder, kind: AdderKind, x: &Word, s: Wire) -> Word {
    let flipped: Vec<Wire> = x.iter().map(|&w| b.xor(w, s)).collect();
    let zero = [Wire::FALSE; WORD_BITS];
    let (sum, _) = add(b, kind, &flipped, &zero, s);
    super::word_from_slice(&sum)
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn build_adder(kind: AdderKind, width: u32) -> crate::builder::Circuit {
        let mut b = CircuitBuilder::new(true);
        let x = b.add_inputs(width);
        let y = b.add_inputs(width);
        let (sum, carry) = add(&mut b, kind, &x, &y, Wire::FALSE);
        b.add_outputs(&sum);
        b.add_output(carry);
        b.finish()
    }

    fn check_exhaustive_8bit(kind: AdderKind) {
        let c = build_adder(kind, 8);
        for x in 0..=255u32 {
            for y in 0..=255u32 {
                let mut bits = bitvec::prelude::BitVec::new();
                for i in 0..8 {
                    bits.push(x >> i & 1 == 1);
                }
                for i in 0..8 {
                    bits.push(y >> i & 1 == 1);
                }
                let out = crate::eval::evaluate(&c, &bits);
                let got = out
                    .iter()
                    .by_vals()
                    .enumerate()
                    .fold(0u32, |acc, (i, bit)| acc | (u32::from(bit) << i));
                assert_eq!(got, x + y, "{x} + {y} with {kind:?}");
            }
        }
    }

    #[test]
    fn ripple_exhaustive_8bit() {
        check_exhaustive_8bit(AdderKind::Ripple);
    }

    #[test]
    fn kogge_stone_exhaustive_8bit() {
        check_exhaustive_8bit(AdderKind::KoggeStone);
    }

    fn check_random_32bit(kind: AdderKind) {
        let mut b = CircuitBuilder::new(true);
        let w = word_inputs(&mut b, 2);
        let sum = add_words(&mut b, kind, &w[0], &w[1]);
        b.add_outputs(&sum);
        let c = b.finish();

        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
        for _ in 0..200 {
            let x: u32 = rng.random();
            let y: u32 = rng.random();
            assert_eq!(run_words(&c, &[x, y]), vec![x.wrapping_add(y)]);
        }
        // Signed-overflow boundary from the architectural test list.
        assert_eq!(run_words(&c, &[0x7FFF_FFFF, 1]), vec![0x8000_0000]);
        assert_eq!(run_words(&c, &[u32::MAX, 1]), vec![0]);
    }

    #[test]
    fn ripple_random_32bit() {
        check_random_32bit(AdderKind::Ripple);
    }

    #[test]
    fn kogge_stone_random_32bit() {
        check_random_32bit(AdderKind::KoggeStone);
    }

    #[test]
    fn carry_in_is_honoured() {
        for kind in [AdderKind::Ripple, AdderKind::KoggeStone] {
            let mut b = CircuitBuilder::new(true);
            let w = word_inputs(&mut b, 2);
            let (sum, _) = add(&mut b, kind, &w[0], &w[1], Wire::TRUE);
            b.add_outputs(&sum);
            let c = b.finish();
            assert_eq!(run_words(&c, &[10, 20]), vec![31]);
            assert_eq!(run_words(&c, &[u32::MAX, 0]), vec![0]);
        }
    }

    #[test]
    fn subtract_boundaries() {
        for kind in [AdderKind::Ripple, AdderKind::KoggeStone] {
            let mut b = CircuitBuilder::new(true);
            let w = word_inputs(&mut b, 2);
            let diff = sub_words(&mut b, kind, &w[0], &w[1]);
            b.add_outputs(&diff);
            let c = b.finish();
            assert_eq!(run_words(&c, &[0, 1]), vec![0xFFFF_FFFF]);
            assert_eq!(run_words(&c, &[0x42, 0x42]), vec![0]);
            assert_eq!(run_words(&c, &[5, 7]), vec![5u32.wrapping_sub(7)]);

            let mut rng = ChaCha8Rng::seed_from_u64(1);
            for _ in 0..100 {
                let x: u32 = rng.random();
                let y: u32 = rng.random();
                assert_eq!(run_words(&c, &[x, y]), vec![x.wrapping_sub(y)]);
            }
        }
    }

    #[test]
    fn conditional_negate() {
        let mut b = CircuitBuilder::new(true);
        let s = b.add_inputs(1)[0];
        let x = super::super::word_from_slice(&b.add_inputs(32));
        let out = cond_negate(&mut b, AdderKind::Ripple, &x, s);
        b.add_outputs(&out);
        let c = b.finish();

        for (sel, value, expect) in [
            (false, 5u32, 5u32),
            (true, 5, (-5i32) as u32),
            (true, 0, 0),
            (true, 0x8000_0000, 0x8000_0000),
        ] {
            let mut bits = bitvec::prelude::BitVec::new();
            bits.push(sel);
            bits.extend(pack(&[value]));
            let out = crate::eval::evaluate(&c, &bits);
            let got = out
                .iter()
                .by_vals()
                .enumerate()
                .fold(0u32, |acc, (i, bit)| acc | (u32::from(bit) << i));
            assert_eq!(got, expect, "negate({value:#x}) sel={sel}");
        }
    }

    #[test]
    fn ripple_gate_count_per_bit() {
        // With a symbolic carry chain, every bit costs the full 5 gates
        // except bit 0, whose constant-false carry folds three of them away.
        let c = build_adder(AdderKind::Ripple, 32);
        assert_eq!(c.gates().len(), 2 + 31 * 5);
    }
}
