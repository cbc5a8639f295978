//! Fixed-size file header.

use std::io::{self, Error, ErrorKind};

use crate::{HEADER_SIZE, MAGIC, VERSION};

/// Header structure (72 bytes, little-endian).
#[derive(Debug, Clone, Copy)]
pub struct CircuitHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub reserved: [u8; 3],
    /// BLAKE3 hash of everything after the header.
    pub checksum: [u8; 32],
    pub input_bits: u64,
    pub output_bits: u64,
    pub gate_count: u64,
    /// Wire-counter high-water mark.
    pub wire_count: u64,
}

impl CircuitHeader {
    /// Creates a header with default identification fields and zeroed
    /// counters.
    pub fn new() -> Self {
        CircuitHeader {
            magic: MAGIC,
            version: VERSION,
            reserved: [0; 3],
            checksum: [0; 32],
            input_bits: 0,
            output_bits: 0,
            gate_count: 0,
            wire_count: 0,
        }
    }

    /// Validates the identification fields and internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.magic != MAGIC {
            return Err(format!(
                "invalid magic bytes: expected {:?}, got {:?}",
                MAGIC, self.magic
            ));
        }
        if self.version != VERSION {
            return Err(format!(
                "invalid version: expected {}, got {}",
                VERSION, self.version
            ));
        }
        if self.reserved != [0; 3] {
            return Err(format!("reserved field must be zero, got {:?}", self.reserved));
        }
        if self.wire_count > u64::from(u32::MAX) {
            return Err(format!("wire count {} exceeds the 32-bit wire space", self.wire_count));
        }
        // Wires 0 and 1 are constants, so everything else must fit below
        // the high-water mark.
        if 2 + self.input_bits + self.gate_count > self.wire_count.max(2) {
            return Err(format!(
                "wire count {} too small for {} inputs and {} gates",
                self.wire_count, self.input_bits, self.gate_count
            ));
        }
        Ok(())
    }

    /// Serialises the header into its packed on-disk form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes[5..8].copy_from_slice(&self.reserved);
        bytes[8..40].copy_from_slice(&self.checksum);
        bytes[40..48].copy_from_slice(&self.input_bits.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.output_bits.to_le_bytes());
        bytes[56..64].copy_from_slice(&self.gate_count.to_le_bytes());
        bytes[64..72].copy_from_slice(&self.wire_count.to_le_bytes());
        bytes
    }

    /// Parses and validates a header from its packed on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "insufficient bytes for header",
            ));
        }
        let header = Self {
            magic: bytes[0..4].try_into().unwrap(),
            version: bytes[4],
            reserved: bytes[5..8].try_into().unwrap(),
            checksum: bytes[8..40].try_into().unwrap(),
            input_bits: u64::from_le_bytes(bytes[40..48].try_into().unwrap()),
            output_bits: u64::from_le_bytes(bytes[48..56].try_into().unwrap()),
            gate_count: u64::from_le_bytes(bytes[56..64].try_into().unwrap()),
            wire_count: u64::from_le_bytes(bytes[64..72].try_into().unwrap()),
        };
        header
            .validate()
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        Ok(header)
    }
}

impl Default for CircuitHeader {
    fn default() -> Self {
        Self::new()
    }
}
