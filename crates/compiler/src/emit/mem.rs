//! Load and store emitters.
//!
//! The memory tier only moves aligned words; address decomposition for
//! sub-word traffic happens here. Sub-word loads shift the fetched word
//! down by the byte offset and sign- or zero-extend by rewiring. Sub-word
//! stores read the resident word, merge the store data into the selected
//! lanes, and write the merged word back, which costs a second access.

use zkrv_circuit::ops::{add_words, const_word, zero_word, Word};
use zkrv_circuit::Wire;

use super::advance_pc;
use crate::context::Context;
use crate::isa::{LoadWidth, Reg, StoreWidth};
use crate::mem::one_hot;

fn effective_address(c: &mut Context, rs1: Reg, offset: i32) -> Word {
    let base = c.regs.read(rs1);
    add_words(&mut c.b, c.cfg.adder, &base, &const_word(offset as u32))
}

/// Shifts the word right by 16 when `sel` is set; one mux row.
fn half_shift(c: &mut Context, word: &Word, sel: Wire) -> Word {
    std::array::from_fn(|i| {
        let shifted = if i + 16 < 32 { word[i + 16] } else { Wire::FALSE };
        c.b.mux(sel, shifted, word[i])
    })
}

/// Shifts the word right by 8 when `sel` is set; one mux row.
fn byte_shift(c: &mut Context, word: &Word, sel: Wire) -> Word {
    std::array::from_fn(|i| {
        let shifted = if i + 8 < 32 { word[i + 8] } else { Wire::FALSE };
        c.b.mux(sel, shifted, word[i])
    })
}

/// Sub-word value extended to 32 bits by rewiring: the fill is either the
/// false constant or the top payload bit.
fn extend(low: &[Wire], signed: bool) -> Word {
    let fill = if signed { low[low.len() - 1] } else { Wire::FALSE };
    std::array::from_fn(|i| if i < low.len() { low[i] } else { fill })
}

pub(crate) fn load(c: &mut Context, width: LoadWidth, rd: Reg, rs1: Reg, offset: i32) {
    if rd.is_zero() {
        // Kept as a pure no-op; the witness prescan skips these too.
        advance_pc(c);
        return;
    }
    let ea = effective_address(c, rs1, offset);
    let zero = zero_word();
    let word = c.mem.access(&mut c.b, &ea, &zero, Wire::FALSE);

    let value = match width {
        LoadWidth::Lw => word,
        LoadWidth::Lh | LoadWidth::Lhu => {
            let shifted = half_shift(c, &word, ea[1]);
            extend(&shifted[..16], width == LoadWidth::Lh)
        }
        LoadWidth::Lb | LoadWidth::Lbu => {
            let halved = half_shift(c, &word, ea[1]);
            let shifted = byte_shift(c, &halved, ea[0]);
            extend(&shifted[..8], width == LoadWidth::Lb)
        }
    };
    c.regs.write(rd, value);
    advance_pc(c);
}

pub(crate) fn store(c: &mut Context, width: StoreWidth, rs2: Reg, rs1: Reg, offset: i32) {
    let ea = effective_address(c, rs1, offset);
    let data = c.regs.read(rs2);

    match width {
        StoreWidth::Sw => {
            c.mem.access(&mut c.b, &ea, &data, Wire::TRUE);
        }
        StoreWidth::Sh => {
            let zero = zero_word();
            let old = c.mem.access(&mut c.b, &ea, &zero, Wire::FALSE);
            // Lane select on address bit 1: low half or high half.
            let merged: Word = std::array::from_fn(|i| {
                if i < 16 {
                    c.b.mux(ea[1], old[i], data[i])
                } else {
                    c.b.mux(ea[1], data[i - 16], old[i])
                }
            });
            c.mem.access(&mut c.b, &ea, &merged, Wire::TRUE);
        }
        StoreWidth::Sb => {
            let zero = zero_word();
            let old = c.mem.access(&mut c.b, &ea, &zero, Wire::FALSE);
            let sels = one_hot(&mut c.b, &[ea[0], ea[1]]);
            let merged: Word = std::array::from_fn(|i| {
                let lane = i / 8;
                c.b.mux(sels[lane], data[i % 8], old[i])
            });
            c.mem.access(&mut c.b, &ea, &merged, Wire::TRUE);
        }
    }
    advance_pc(c);
}
