//! Radix-4 Booth multiplier with Wallace-tree reduction.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

use super::add::full_adder;
use super::{add, AdderKind, Word, WORD_BITS};

/// Multiplies two 32-bit words, producing the low `out_bits` bits of the
/// product (`out_bits` is 32 or 64).
///
/// Operands are independently interpreted as signed or unsigned, which
/// covers all four RISC-V multiply flavours with one core. Booth recoding
/// over the 34-bit extension of the multiplier yields 17 signed digits in
/// `{-2,-1,0,1,2}`; each digit selects a shifted multiplicand row,
/// negative digits complement the row's active window and contribute a
/// single correction bit, and the rows are reduced to two by a tree of
/// 3:2 compressors before one final carry-propagate add.
pub fn mul(
    b: &mut CircuitBuilder,
    adder: AdderKind,
    x: &Word,
    y: &Word,
    x_signed: bool,
    y_signed: bool,
    out_bits: usize,
) -> Vec<Wire> {
    assert!(out_bits == 32 || out_bits == 64, "multiplier: bad output width");
    let w = out_bits;

    // Multiplicand, sign- or zero-extended to the output width.
    let x_ext: Vec<Wire> = (0..w)
        .map(|i| {
            if i < WORD_BITS {
                x[i]
            } else if x_signed {
                x[WORD_BITS - 1]
            } else {
                Wire::FALSE
            }
        })
        .collect();

    // Multiplier bit accessor over the 34-bit extension (one virtual low
    // zero bit, two high sign/zero bits).
    let y_bit = |i: isize| -> Wire {
        if i < 0 {
            Wire::FALSE
        } else if (i as usize) < WORD_BITS {
            y[i as usize]
        } else if y_signed {
            y[WORD_BITS - 1]
        } else {
            Wire::FALSE
        }
    };

    let mut rows: Vec<Vec<Wire>> = Vec::with_capacity(18);
    let mut corrections = vec![Wire::FALSE; w];

    for j in 0..17 {
        let lo = 2 * j;
        if lo >= w {
            break;
        }
        let l = y_bit(lo as isize - 1);
        let m = y_bit(lo as isize);
        let h = y_bit(lo as isize + 1);

        // Digit decode: magnitude-1 and magnitude-2 selects are mutually
        // exclusive; the (1,1,1) pattern decodes as a non-negative zero.
        let sel1 = b.xor(m, l);
        let both = b.and(m, l);
        let not_both = b.not(both);
        let neg = b.and(h, not_both);
        let hm = b.xor(h, m);
        let not_sel1 = b.not(sel1);
        let sel2 = b.and(hm, not_sel1);

        let mut row = vec![Wire::FALSE; w];
        for (i, slot) in row.iter_mut().enumerate().skip(lo) {
            let a1 = b.and(sel1, x_ext[i - lo]);
            let a2 = if i > lo {
                b.and(sel2, x_ext[i - lo - 1])
            } else {
                Wire::FALSE
            };
            let mag = b.xor(a1, a2);
            *slot = b.xor(mag, neg);
        }
        rows.push(row);
        corrections[lo] = neg;
    }
    rows.push(corrections);

    // Wallace reduction: 3:2 compressors until two rows remain.
    while rows.len() > 2 {
        let mut next = Vec::with_capacity(rows.len().div_ceil(3) * 2);
        for chunk in rows.chunks(3) {
            match chunk {
                [r0, r1, r2] => {
                    let mut sum_row = vec![Wire::FALSE; w];
                    let mut carry_row = vec![Wire::FALSE; w];
                    for i in 0..w {
                        let (s, c) = full_adder(b, r0[i], r1[i], r2[i]);
                        sum_row[i] = s;
                        if i + 1 < w {
                            carry_row[i + 1] = c;
                        }
                    }
                    next.push(sum_row);
                    next.push(carry_row);
                }
                rest => next.extend(rest.iter().cloned()),
            }
        }
        rows = next;
    }

    match rows.len() {
        0 => vec![Wire::FALSE; w],
        1 => rows.pop().unwrap(),
        _ => {
            let (r1, r0) = (rows.pop().unwrap(), rows.pop().unwrap());
            let (sum, _) = add(b, adder, &r0, &r1, Wire::FALSE);
            sum
        }
    }
}

/// Low 32 bits of the product; identical for every signedness combination.
pub fn mul_low(b: &mut CircuitBuilder, adder: AdderKind, x: &Word, y: &Word) -> Word {
    super::word_from_slice(&mul(b, adder, x, y, false, false, 32))
}

/// High 32 bits of the 64-bit product under the given operand signedness.
pub fn mul_high(
    b: &mut CircuitBuilder,
    adder: AdderKind,
    x: &Word,
    y: &Word,
    x_signed: bool,
    y_signed: bool,
) -> Word {
    let full = mul(b, adder, x, y, x_signed, y_signed, 64);
    super::word_from_slice(&full[32..])
}
