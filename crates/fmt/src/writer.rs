//! Streaming circuit writer.
//!
//! API: `new() → write_gate()* → finish()`.
//!
//! Writes a placeholder header and the outputs table up front, streams gate
//! records while hashing them, then seeks back and backpatches the header
//! with the final counters and the BLAKE3 checksum.

use std::io::{self, Seek, SeekFrom, Write};

use blake3::Hasher;
use zkrv_circuit::{Circuit, Gate, GateKind, Wire};

use crate::header::CircuitHeader;
use crate::{gate_to_bytes, CircuitStats};

const FLUSH_THRESHOLD: usize = 8 * 1024 * 1024;

/// Streaming writer over any `Write + Seek` sink.
pub struct CircuitWriter<W: Write + Seek> {
    writer: W,
    header: CircuitHeader,
    hasher: Hasher,
    buffer: Vec<u8>,
    xor_gates: u64,
    and_gates: u64,
}

impl<W: Write + Seek> CircuitWriter<W> {
    /// Creates a writer. The outputs table must be known up front because it
    /// precedes the gate records in the file.
    pub fn new(mut writer: W, input_bits: u64, outputs: &[Wire]) -> io::Result<Self> {
        let mut header = CircuitHeader::new();
        header.input_bits = input_bits;
        header.output_bits = outputs.len() as u64;

        // Placeholder header; backpatched in finish().
        writer.write_all(&[0u8; crate::HEADER_SIZE])?;

        let mut hasher = Hasher::new();
        let mut table = Vec::with_capacity(outputs.len() * crate::OUTPUT_ENTRY_SIZE);
        for w in outputs {
            table.extend_from_slice(&w.index().to_le_bytes());
        }
        hasher.update(&table);
        writer.write_all(&table)?;

        Ok(Self {
            writer,
            header,
            hasher,
            buffer: Vec::with_capacity(FLUSH_THRESHOLD),
            xor_gates: 0,
            and_gates: 0,
        })
    }

    /// Appends a single gate record.
    pub fn write_gate(&mut self, gate: &Gate) -> io::Result<()> {
        match gate.kind {
            GateKind::XOR => self.xor_gates += 1,
            GateKind::AND => self.and_gates += 1,
        }
        self.buffer.extend_from_slice(&gate_to_bytes(gate));
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.hasher.update(&self.buffer);
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flushes, backpatches the header, and returns the sink plus stats.
    pub fn finish(mut self, wire_count: u64) -> io::Result<(W, CircuitStats)> {
        self.flush_buffer()?;

        self.header.gate_count = self.xor_gates + self.and_gates;
        self.header.wire_count = wire_count;
        self.header.checksum = *self.hasher.finalize().as_bytes();
        self.header
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.writer.seek(SeekFrom::Start(0))?;
        self.writer.write_all(&self.header.to_bytes())?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;

        let stats = CircuitStats {
            total_gates: self.header.gate_count,
            xor_gates: self.xor_gates,
            and_gates: self.and_gates,
            input_bits: self.header.input_bits,
            output_bits: self.header.output_bits,
            wire_count,
            checksum: self.header.checksum,
        };
        Ok((self.writer, stats))
    }
}

impl<W: Write + Seek> std::fmt::Debug for CircuitWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitWriter")
            .field("xor_gates", &self.xor_gates)
            .field("and_gates", &self.and_gates)
            .finish()
    }
}

/// Writes an in-memory circuit in one call.
pub fn write_circuit<W: Write + Seek>(writer: W, circuit: &Circuit) -> io::Result<CircuitStats> {
    let mut cw = CircuitWriter::new(writer, u64::from(circuit.num_inputs()), circuit.outputs())?;
    for gate in circuit.gates() {
        cw.write_gate(gate)?;
    }
    let (_, stats) = cw.finish(u64::from(circuit.num_wires()))?;
    Ok(stats)
}
