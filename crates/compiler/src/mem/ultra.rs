//! Ultra tier: 8 words held as plain wires.

use zkrv_circuit::ops::{word_from_slice, Word};
use zkrv_circuit::{CircuitBuilder, Wire};

use super::{guarded_update, one_hot, one_hot_read, MemoryCircuit};

/// The cheapest tier: a 3-bit one-hot decode over 8 resident words. Upper
/// address bits are ignored.
#[derive(Debug)]
pub struct UltraMemory {
    words: [Word; 8],
}

impl UltraMemory {
    /// Binds the region to its input wires (8 words, little-endian).
    pub fn new(region: &[Wire]) -> Self {
        assert_eq!(region.len(), 8 * 32);
        Self {
            words: std::array::from_fn(|i| word_from_slice(&region[i * 32..(i + 1) * 32])),
        }
    }
}

impl MemoryCircuit for UltraMemory {
    fn access(
        &mut self,
        b: &mut CircuitBuilder,
        addr: &Word,
        write_data: &Word,
        write_enable: Wire,
    ) -> Word {
        // Word index from address bits 2..5; everything above is masked off.
        let sels = one_hot(b, &addr[2..5]);
        let read = one_hot_read(b, &sels, &self.words);
        guarded_update(b, &sels, &mut self.words, write_data, write_enable);
        read
    }

    fn output_wires(&self) -> Vec<Wire> {
        self.words.iter().flatten().copied().collect()
    }
}
