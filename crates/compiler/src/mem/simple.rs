//! Simple tier: 256 words with an 8-bit one-hot select.

use zkrv_circuit::ops::{word_from_slice, Word};
use zkrv_circuit::{CircuitBuilder, Wire};

use super::{guarded_update, one_hot, one_hot_read, MemoryCircuit};

/// 256 resident words; a 256-way mux per read and 256 guarded updates per
/// write.
#[derive(Debug)]
pub struct SimpleMemory {
    words: Vec<Word>,
}

impl SimpleMemory {
    /// Binds the region to its input wires (256 words, little-endian).
    pub fn new(region: &[Wire]) -> Self {
        assert_eq!(region.len(), 256 * 32);
        Self {
            words: region.chunks(32).map(word_from_slice).collect(),
        }
    }
}

impl MemoryCircuit for SimpleMemory {
    fn access(
        &mut self,
        b: &mut CircuitBuilder,
        addr: &Word,
        write_data: &Word,
        write_enable: Wire,
    ) -> Word {
        let sels = one_hot(b, &addr[2..10]);
        let read = one_hot_read(b, &sels, &self.words);
        guarded_update(b, &sels, &mut self.words, write_data, write_enable);
        read
    }

    fn output_wires(&self) -> Vec<Wire> {
        self.words.iter().flatten().copied().collect()
    }
}
