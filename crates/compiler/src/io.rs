//! Encoding architectural states into circuit input bits and decoding them
//! back out of output bits.

use bitvec::prelude::*;

use zkrv_circuit::Circuit;

use crate::config::MemoryTier;
use crate::mem::AccessWitness;
use crate::state::{MachineState, NUM_REGS};

/// Where everything lives in the compiled circuit's bit vectors.
///
/// `input_bits` counts the allocated input wires (the evaluator's view);
/// the architectural input vector additionally carries the two constant
/// bits in front, so layout offsets equal wire ids. The output vector
/// includes the constants as its first two bits.
#[derive(Debug, Clone)]
pub struct CircuitLayout {
    pub tier: MemoryTier,
    pub auth_depth: usize,
    pub auth_accesses: usize,
    pub mem_region_bits: usize,
    pub input_bits: u64,
    pub output_bits: u64,
}

/// A compilation result: the circuit plus the layout needed to talk to it.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub circuit: Circuit,
    pub layout: CircuitLayout,
}

/// Initial or final contents of the memory region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryImage {
    /// Resident words, for the ultra and simple tiers.
    Words(Vec<u32>),
    /// The Merkle root label, for the authenticated tier.
    Root([u8; 32]),
}

/// Everything decoded from a circuit's output bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedState {
    pub state: MachineState,
    pub memory: MemoryImage,
    pub trap: bool,
    /// Present on the authenticated tier only.
    pub proof_ok: Option<bool>,
}

fn push_u32(bits: &mut BitVec, value: u32) {
    for i in 0..32 {
        bits.push(value >> i & 1 == 1);
    }
}

fn read_u32(bits: &BitSlice, offset: usize) -> u32 {
    (0..32).fold(0, |acc, i| acc | (u32::from(bits[offset + i]) << i))
}

/// Packs initial data bytes into little-endian words, zero-padded to `n`.
pub fn words_from_bytes(data: &[u8], n: usize) -> Vec<u32> {
    let mut words = vec![0u32; n];
    for (i, chunk) in data.chunks(4).enumerate() {
        let mut bytes = [0u8; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        words[i] = u32::from_le_bytes(bytes);
    }
    words
}

impl CompiledProgram {
    /// Builds the evaluator-ready input bit vector for a concrete state.
    ///
    /// `witnesses` must list one entry per authenticated access, in
    /// emission order; pass an empty slice on the plain tiers.
    ///
    /// # Panics
    ///
    /// If the image kind does not match the tier or the assembled vector
    /// does not have exactly the declared number of input bits.
    pub fn encode_inputs(
        &self,
        state: &MachineState,
        memory: &MemoryImage,
        witnesses: &[AccessWitness],
    ) -> BitVec {
        let mut bits = BitVec::with_capacity(self.layout.input_bits as usize);
        push_u32(&mut bits, state.pc);
        for r in 0..NUM_REGS {
            push_u32(&mut bits, state.regs[r]);
        }
        match (self.layout.tier, memory) {
            (MemoryTier::Ultra | MemoryTier::Simple, MemoryImage::Words(words)) => {
                let n = self.layout.mem_region_bits / 32;
                assert!(words.len() <= n, "io: too many memory words");
                for i in 0..n {
                    push_u32(&mut bits, words.get(i).copied().unwrap_or(0));
                }
            }
            (MemoryTier::Authenticated, MemoryImage::Root(root)) => {
                for byte in root {
                    for i in 0..8 {
                        bits.push(byte >> i & 1 == 1);
                    }
                }
            }
            _ => panic!("io: memory image does not match the compiled tier"),
        }
        assert_eq!(
            witnesses.len(),
            self.layout.auth_accesses,
            "io: expected {} access witnesses, got {}",
            self.layout.auth_accesses,
            witnesses.len(),
        );
        for w in witnesses {
            w.append_to(&mut bits);
        }
        assert_eq!(bits.len() as u64, self.layout.input_bits, "io: input size mismatch");
        bits
    }

    /// Decodes the output bit vector of an evaluation.
    ///
    /// # Panics
    ///
    /// If the vector has the wrong length or its constant bits are wrong.
    pub fn decode_outputs(&self, outputs: &BitSlice) -> DecodedState {
        assert_eq!(outputs.len() as u64, self.layout.output_bits, "io: output size mismatch");
        assert!(!outputs[0] && outputs[1], "io: constant output bits corrupted");

        let pc = read_u32(outputs, 2);
        let mut regs = [0u32; NUM_REGS];
        for (r, slot) in regs.iter_mut().enumerate() {
            *slot = read_u32(outputs, 34 + 32 * r);
        }

        let mem_offset = 34 + 32 * NUM_REGS;
        let memory = match self.layout.tier {
            MemoryTier::Ultra | MemoryTier::Simple => {
                let n = self.layout.mem_region_bits / 32;
                MemoryImage::Words((0..n).map(|i| read_u32(outputs, mem_offset + 32 * i)).collect())
            }
            MemoryTier::Authenticated => {
                let mut root = [0u8; 32];
                for (i, byte) in root.iter_mut().enumerate() {
                    for j in 0..8 {
                        if outputs[mem_offset + 8 * i + j] {
                            *byte |= 1 << j;
                        }
                    }
                }
                MemoryImage::Root(root)
            }
        };

        let trap_offset = mem_offset + self.layout.mem_region_bits;
        let trap = outputs[trap_offset];
        let proof_ok = match self.layout.tier {
            MemoryTier::Authenticated => Some(outputs[trap_offset + 1]),
            _ => None,
        };

        DecodedState {
            state: MachineState { pc, regs },
            memory,
            trap,
            proof_ok,
        }
    }
}
