//! Authenticated tier: a binary Merkle tree over 32-bit words whose
//! internal labels are SHA3-256 of the concatenated child labels.
//!
//! The circuit side consumes prover-supplied witness bits (the addressed
//! leaf word plus one 256-bit sibling label per level, low to high) and
//! emits a path recomputation per access, an equality check against the
//! resident root bundle, and on writes a second recomputation that
//! advances the bundle. The host side ([`MerkleMemory`]) is the sparse
//! tree collaborators use to produce roots and witnesses.
//!
//! Leaf labels embed the word in the first four bytes of an otherwise zero
//! 32-byte label, so the first of the `depth` hashes already combines two
//! 256-bit labels and the whole path costs exactly `depth` permutations.

use std::collections::HashMap;

use bitvec::prelude::*;
use sha3::{Digest, Sha3_256};
use zkrv_circuit::ops::{or_reduce, Word};
use zkrv_circuit::sha3::sha3_256_concat;
use zkrv_circuit::{CircuitBuilder, Wire};

use super::MemoryCircuit;

/// A 256-bit label as wires, little-endian within bytes.
type Label = [Wire; 256];

/// Witness bits one access consumes: the leaf word plus one sibling label
/// per tree level.
pub fn witness_bits_per_access(depth: usize) -> usize {
    32 + 256 * depth
}

/// The in-circuit authenticated memory.
pub struct AuthMemory {
    depth: usize,
    root: Label,
    witness: Vec<Wire>,
    cursor: usize,
    ok: Wire,
}

impl AuthMemory {
    /// Binds the root bundle to its region input wires and takes ownership
    /// of the pre-allocated witness input wires.
    pub fn new(region: &[Wire], witness: Vec<Wire>, depth: usize) -> Self {
        assert_eq!(region.len(), 256);
        Self {
            depth,
            root: region.try_into().expect("root region is 256 wires"),
            witness,
            cursor: 0,
            ok: Wire::TRUE,
        }
    }

    fn take(&mut self, n: usize) -> &[Wire] {
        let start = self.cursor;
        self.cursor += n;
        self.witness
            .get(start..self.cursor)
            .expect("memory: witness wires exhausted")
    }

    fn leaf_label(word: &Word) -> Label {
        std::array::from_fn(|i| if i < 32 { word[i] } else { Wire::FALSE })
    }

    /// Recomputes the root label from a leaf and the sibling path. Each
    /// address bit selects whether the running label is the left or right
    /// child at that level.
    fn path_root(
        b: &mut CircuitBuilder,
        idx_bits: &[Wire],
        leaf: Label,
        siblings: &[Label],
    ) -> Label {
        let mut label = leaf;
        for (&bit, sibling) in idx_bits.iter().zip(siblings) {
            let left = mux_label(b, bit, sibling, &label);
            let right = mux_label(b, bit, &label, sibling);
            label = sha3_256_concat(b, &left, &right);
        }
        label
    }
}

impl MemoryCircuit for AuthMemory {
    fn access(
        &mut self,
        b: &mut CircuitBuilder,
        addr: &Word,
        write_data: &Word,
        write_enable: Wire,
    ) -> Word {
        let leaf: Word = self.take(32).try_into().unwrap();
        let siblings: Vec<Label> = (0..self.depth)
            .map(|_| self.take(256).try_into().unwrap())
            .collect();
        let idx_bits: Vec<Wire> = addr[2..2 + self.depth].to_vec();

        // Step 1+2: recompute the path from the claimed leaf and check it
        // against the resident root.
        let computed = Self::path_root(b, &idx_bits, Self::leaf_label(&leaf), &siblings);
        let matches = eq_label(b, &computed, &self.root);
        self.ok = b.and(self.ok, matches);

        // Step 3: on a write, recompute the path once more with the new
        // leaf and advance the root bundle. Loads pass a constant-false
        // enable, which skips the second recomputation entirely.
        if write_enable != Wire::FALSE {
            let new_leaf: Word = std::array::from_fn(|j| b.mux(write_enable, write_data[j], leaf[j]));
            let new_root = Self::path_root(b, &idx_bits, Self::leaf_label(&new_leaf), &siblings);
            self.root = mux_label(b, write_enable, &new_root, &self.root);
        }

        leaf
    }

    fn output_wires(&self) -> Vec<Wire> {
        self.root.to_vec()
    }

    fn proof_ok(&self) -> Option<Wire> {
        Some(self.ok)
    }
}

impl std::fmt::Debug for AuthMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMemory")
            .field("depth", &self.depth)
            .field("witness_bits", &self.witness.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

fn mux_label(b: &mut CircuitBuilder, s: Wire, x: &Label, y: &Label) -> Label {
    std::array::from_fn(|i| b.mux(s, x[i], y[i]))
}

fn eq_label(b: &mut CircuitBuilder, x: &Label, y: &Label) -> Wire {
    let diffs: Vec<Wire> = x.iter().zip(y).map(|(&a, &c)| b.xor(a, c)).collect();
    let any = or_reduce(b, &diffs);
    b.not(any)
}

/// The witness one access consumes, as produced by [`MerkleMemory`].
#[derive(Debug, Clone)]
pub struct AccessWitness {
    /// The addressed word's value before the access.
    pub leaf: u32,
    /// Sibling labels, leaf level first.
    pub siblings: Vec<[u8; 32]>,
}

impl AccessWitness {
    /// Appends this witness in circuit input order: leaf word bits, then
    /// each sibling label, all little-endian within bytes.
    pub fn append_to(&self, bits: &mut BitVec) {
        for i in 0..32 {
            bits.push(self.leaf >> i & 1 == 1);
        }
        for sibling in &self.siblings {
            for byte in sibling {
                for i in 0..8 {
                    bits.push(byte >> i & 1 == 1);
                }
            }
        }
    }
}

/// Host-side sparse Merkle tree over 32-bit words.
///
/// Only touched nodes are materialised; untouched subtrees fall back to
/// the per-level default labels of an all-zero memory.
pub struct MerkleMemory {
    depth: usize,
    /// `levels[k]` maps a node index at level `k` to its label; level 0
    /// holds the leaf labels.
    levels: Vec<HashMap<u64, [u8; 32]>>,
    defaults: Vec<[u8; 32]>,
}

impl MerkleMemory {
    /// An all-zero memory of `2^depth` words.
    pub fn new(depth: usize) -> Self {
        let mut defaults = vec![[0u8; 32]];
        for k in 0..depth {
            let d = defaults[k];
            defaults.push(hash_children(&d, &d));
        }
        Self {
            depth,
            levels: vec![HashMap::new(); depth + 1],
            defaults,
        }
    }

    /// A memory initialised with `words` starting at leaf 0.
    pub fn with_words(depth: usize, words: &[u32]) -> Self {
        let mut tree = Self::new(depth);
        for (i, &w) in words.iter().enumerate() {
            tree.access(i as u64, Some(w));
        }
        tree
    }

    /// Number of addressable words.
    pub fn num_words(&self) -> u64 {
        1u64 << self.depth
    }

    /// The current root label.
    pub fn root(&self) -> [u8; 32] {
        self.node(self.depth, 0)
    }

    /// The current value of a word.
    pub fn word(&self, index: u64) -> u32 {
        let label = self.node(0, index);
        u32::from_le_bytes(label[..4].try_into().unwrap())
    }

    fn node(&self, level: usize, index: u64) -> [u8; 32] {
        *self.levels[level]
            .get(&index)
            .unwrap_or(&self.defaults[level])
    }

    /// Performs one access, returning the witness the circuit consumes for
    /// it. The witness reflects the tree state *before* the access; a
    /// write then updates the path.
    pub fn access(&mut self, index: u64, write: Option<u32>) -> AccessWitness {
        assert!(index < self.num_words(), "memory: word index out of range");
        let siblings: Vec<[u8; 32]> = (0..self.depth)
            .map(|k| self.node(k, (index >> k) ^ 1))
            .collect();
        let leaf = self.word(index);

        if let Some(value) = write {
            let mut label = leaf_label(value);
            self.levels[0].insert(index, label);
            for (k, sibling) in siblings.iter().enumerate() {
                label = if index >> k & 1 == 0 {
                    hash_children(&label, sibling)
                } else {
                    hash_children(sibling, &label)
                };
                self.levels[k + 1].insert(index >> (k + 1), label);
            }
        }

        AccessWitness { leaf, siblings }
    }
}

impl std::fmt::Debug for MerkleMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleMemory")
            .field("depth", &self.depth)
            .field("touched_leaves", &self.levels[0].len())
            .finish()
    }
}

fn leaf_label(word: u32) -> [u8; 32] {
    let mut label = [0u8; 32];
    label[..4].copy_from_slice(&word.to_le_bytes());
    label
}

fn hash_children(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_root_is_the_top_default() {
        let tree = MerkleMemory::new(4);
        let mut expect = [0u8; 32];
        for _ in 0..4 {
            expect = hash_children(&expect, &expect);
        }
        assert_eq!(tree.root(), expect);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut tree = MerkleMemory::new(6);
        let before = tree.root();
        let w = tree.access(13, Some(0xDEAD_BEEF));
        assert_eq!(w.leaf, 0, "witness carries the pre-access value");
        assert_ne!(tree.root(), before);
        assert_eq!(tree.word(13), 0xDEAD_BEEF);
        assert_eq!(tree.word(12), 0);

        let w = tree.access(13, None);
        assert_eq!(w.leaf, 0xDEAD_BEEF);
        assert_eq!(w.siblings.len(), 6);
    }

    #[test]
    fn sibling_path_verifies_by_hand() {
        let mut tree = MerkleMemory::new(3);
        tree.access(5, Some(42));
        let w = tree.access(5, None);

        let mut label = leaf_label(42);
        for (k, sibling) in w.siblings.iter().enumerate() {
            label = if 5 >> k & 1 == 0 {
                hash_children(&label, sibling)
            } else {
                hash_children(sibling, &label)
            };
        }
        assert_eq!(label, tree.root());
    }

    #[test]
    fn with_words_places_initial_data() {
        let tree = MerkleMemory::with_words(5, &[1, 2, 3]);
        assert_eq!(tree.word(0), 1);
        assert_eq!(tree.word(1), 2);
        assert_eq!(tree.word(2), 3);
        assert_eq!(tree.word(3), 0);
    }

    #[test]
    fn witness_bit_layout() {
        let mut tree = MerkleMemory::new(2);
        let w = tree.access(0, None);
        let mut bits = BitVec::new();
        w.append_to(&mut bits);
        assert_eq!(bits.len(), witness_bits_per_access(2));
    }
}
