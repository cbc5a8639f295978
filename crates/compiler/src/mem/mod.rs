//! The memory subsystem: three tiers behind one access operation.
//!
//! All tiers implement [`MemoryCircuit::access`] with the same observable
//! semantics: the returned word is the addressed word's value *before* the
//! access, and when `write_enable` is true the addressed word becomes
//! `write_data` afterwards. Unaligned accesses are unsupported; the load
//! and store emitters decompose sub-word traffic themselves.

mod auth;
mod simple;
mod ultra;

pub use auth::{AccessWitness, AuthMemory, MerkleMemory, witness_bits_per_access};
pub use simple::SimpleMemory;
pub use ultra::UltraMemory;

use zkrv_circuit::ops::Word;
use zkrv_circuit::{CircuitBuilder, Wire};

/// The capability every memory tier exposes to the load/store emitters,
/// resolved once per compiler instance so emission stays tier-agnostic.
pub trait MemoryCircuit {
    /// One word access; see the module docs for the semantics.
    fn access(
        &mut self,
        b: &mut CircuitBuilder,
        addr: &Word,
        write_data: &Word,
        write_enable: Wire,
    ) -> Word;

    /// Wires representing the final memory region, in layout order.
    fn output_wires(&self) -> Vec<Wire>;

    /// Accumulated proof-validity wire, if this tier authenticates.
    fn proof_ok(&self) -> Option<Wire> {
        None
    }
}

/// One-hot decode of `bits` into `2^n` select wires, built by repeated
/// doubling. Exactly one select is true for any assignment of the bits.
pub(crate) fn one_hot(b: &mut CircuitBuilder, bits: &[Wire]) -> Vec<Wire> {
    let mut sels = vec![Wire::TRUE];
    for &bit in bits {
        let nbit = b.not(bit);
        let mut next = Vec::with_capacity(sels.len() * 2);
        for &s in &sels {
            next.push(b.and(s, nbit));
        }
        for &s in &sels {
            next.push(b.and(s, bit));
        }
        sels = next;
    }
    sels
}

/// Word read through a one-hot select: because at most one select is true,
/// the OR over the masked words degenerates to an XOR tree.
pub(crate) fn one_hot_read(b: &mut CircuitBuilder, sels: &[Wire], words: &[Word]) -> Word {
    assert_eq!(sels.len(), words.len());
    std::array::from_fn(|j| {
        let masked: Vec<Wire> = sels
            .iter()
            .zip(words)
            .map(|(&s, w)| b.and(s, w[j]))
            .collect();
        xor_reduce(b, &masked)
    })
}

fn xor_reduce(b: &mut CircuitBuilder, wires: &[Wire]) -> Wire {
    let mut layer = wires.to_vec();
    if layer.is_empty() {
        return Wire::FALSE;
    }
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            next.push(match pair {
                [x, y] => b.xor(*x, *y),
                [x] => *x,
                _ => unreachable!(),
            });
        }
        layer = next;
    }
    layer[0]
}

/// Guarded write-back shared by the plain tiers: every word either keeps
/// its wires or rebinds to the written data, gated on its select.
pub(crate) fn guarded_update(
    b: &mut CircuitBuilder,
    sels: &[Wire],
    words: &mut [Word],
    write_data: &Word,
    write_enable: Wire,
) {
    for (&sel, word) in sels.iter().zip(words.iter_mut()) {
        let we = b.and(sel, write_enable);
        for j in 0..32 {
            word[j] = b.mux(we, write_data[j], word[j]);
        }
    }
}
