//! On-disk circuit format.
//!
//! Layout, all little-endian:
//!
//! - 72-byte header ([`header::CircuitHeader`])
//! - outputs table: `output_bits` wire ids, u32 each
//! - gate records: `(in1: u32, in2: u32, out: u32, kind: u8)`, 13-byte
//!   stride, in emission order
//!
//! The format is append-only and positionally indexed: gate `i` lives at
//! `HEADER_SIZE + 4 * output_bits + GATE_RECORD_SIZE * i`, so tools may
//! mmap the file and address gates at a fixed stride. The header checksum
//! is a BLAKE3 hash of everything after the header, backpatched when the
//! writer finishes.

pub mod header;
pub mod reader;
pub mod writer;

use std::io;

use zkrv_circuit::{Gate, GateKind, Wire};

pub use header::CircuitHeader;
pub use reader::{read_circuit, verify_checksum, CircuitReader};
pub use writer::{write_circuit, CircuitWriter};

/// Magic bytes identifying the format.
pub const MAGIC: [u8; 4] = *b"zkrv";

/// Current format version.
pub const VERSION: u8 = 0x01;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 72;

/// Size of one outputs-table entry.
pub const OUTPUT_ENTRY_SIZE: usize = 4;

/// Size of one gate record.
pub const GATE_RECORD_SIZE: usize = 13;

/// Gate kind byte values.
pub const KIND_XOR: u8 = 0x00;
/// Gate kind byte values.
pub const KIND_AND: u8 = 0x01;

/// Serialises one gate record.
pub fn gate_to_bytes(gate: &Gate) -> [u8; GATE_RECORD_SIZE] {
    let mut bytes = [0u8; GATE_RECORD_SIZE];
    bytes[0..4].copy_from_slice(&gate.in1.index().to_le_bytes());
    bytes[4..8].copy_from_slice(&gate.in2.index().to_le_bytes());
    bytes[8..12].copy_from_slice(&gate.out.index().to_le_bytes());
    bytes[12] = match gate.kind {
        GateKind::XOR => KIND_XOR,
        GateKind::AND => KIND_AND,
    };
    bytes
}

/// Deserialises one gate record.
pub fn gate_from_bytes(bytes: &[u8]) -> io::Result<Gate> {
    debug_assert!(bytes.len() >= GATE_RECORD_SIZE);
    let in1 = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let in2 = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    let out = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let kind = match bytes[12] {
        KIND_XOR => GateKind::XOR,
        KIND_AND => GateKind::AND,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid gate kind byte {other:#04x}"),
            ));
        }
    };
    Ok(Gate {
        in1: Wire::from(in1),
        in2: Wire::from(in2),
        out: Wire::from(out),
        kind,
    })
}

/// Statistics about a written or read circuit.
#[derive(Debug, Clone)]
pub struct CircuitStats {
    pub total_gates: u64,
    pub xor_gates: u64,
    pub and_gates: u64,
    pub input_bits: u64,
    pub output_bits: u64,
    pub wire_count: u64,
    pub checksum: [u8; 32],
}
