//! Circuit reader with checksum verification.

use std::io::{self, Read, Seek, SeekFrom};

use blake3::Hasher;
use zkrv_circuit::{Circuit, Gate, Wire};

use crate::header::CircuitHeader;
use crate::{gate_from_bytes, CircuitStats, GATE_RECORD_SIZE, HEADER_SIZE, OUTPUT_ENTRY_SIZE};

/// Reader over any `Read + Seek` source.
pub struct CircuitReader<R: Read + Seek> {
    reader: R,
    header: CircuitHeader,
}

impl<R: Read + Seek> CircuitReader<R> {
    /// Reads and validates the header.
    pub fn new(mut reader: R) -> io::Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes)?;
        let header = CircuitHeader::from_bytes(&bytes)?;
        Ok(Self { reader, header })
    }

    /// The parsed header.
    pub fn header(&self) -> &CircuitHeader {
        &self.header
    }

    /// Summary statistics derived from the header and gate records.
    pub fn stats(&mut self) -> io::Result<CircuitStats> {
        let mut xor_gates = 0u64;
        let mut and_gates = 0u64;
        self.for_each_gate(|g| {
            match g.kind {
                zkrv_circuit::GateKind::XOR => xor_gates += 1,
                zkrv_circuit::GateKind::AND => and_gates += 1,
            }
            Ok(())
        })?;
        Ok(CircuitStats {
            total_gates: self.header.gate_count,
            xor_gates,
            and_gates,
            input_bits: self.header.input_bits,
            output_bits: self.header.output_bits,
            wire_count: self.header.wire_count,
            checksum: self.header.checksum,
        })
    }

    /// Reads the outputs table.
    pub fn read_outputs(&mut self) -> io::Result<Vec<Wire>> {
        self.reader.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        let count = self.header.output_bits as usize;
        let mut bytes = vec![0u8; count * OUTPUT_ENTRY_SIZE];
        self.reader.read_exact(&mut bytes)?;
        Ok(bytes
            .chunks_exact(OUTPUT_ENTRY_SIZE)
            .map(|c| Wire::from(u32::from_le_bytes(c.try_into().unwrap())))
            .collect())
    }

    /// Streams every gate record through `f`, in file order.
    pub fn for_each_gate(&mut self, mut f: impl FnMut(Gate) -> io::Result<()>) -> io::Result<()> {
        let gates_offset =
            HEADER_SIZE as u64 + self.header.output_bits * OUTPUT_ENTRY_SIZE as u64;
        self.reader.seek(SeekFrom::Start(gates_offset))?;

        const CHUNK_GATES: usize = 64 * 1024;
        let mut remaining = self.header.gate_count;
        let mut buf = vec![0u8; CHUNK_GATES * GATE_RECORD_SIZE];
        while remaining > 0 {
            let n = remaining.min(CHUNK_GATES as u64) as usize;
            let slice = &mut buf[..n * GATE_RECORD_SIZE];
            self.reader.read_exact(slice)?;
            for record in slice.chunks_exact(GATE_RECORD_SIZE) {
                f(gate_from_bytes(record)?)?;
            }
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Reads the whole file back into a [`Circuit`] and structurally
    /// validates it.
    pub fn read_circuit(&mut self) -> io::Result<Circuit> {
        let outputs = self.read_outputs()?;
        let mut gates = Vec::with_capacity(self.header.gate_count as usize);
        self.for_each_gate(|g| {
            gates.push(g);
            Ok(())
        })?;
        let circuit = Circuit::from_parts(
            self.header.input_bits as u32,
            self.header.wire_count as u32,
            gates,
            outputs,
        );
        circuit
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(circuit)
    }

    /// Re-hashes the payload and compares it against the header checksum.
    pub fn verify_checksum(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        let mut hasher = Hasher::new();
        let mut buf = vec![0u8; 1 << 20];
        loop {
            let n = self.reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        if *hasher.finalize().as_bytes() != self.header.checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "payload checksum mismatch",
            ));
        }
        Ok(())
    }
}

impl<R: Read + Seek> std::fmt::Debug for CircuitReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitReader").field("header", &self.header).finish()
    }
}

/// Reads and validates a circuit in one call.
pub fn read_circuit<R: Read + Seek>(reader: R) -> io::Result<Circuit> {
    CircuitReader::new(reader)?.read_circuit()
}

/// Verifies the checksum of a circuit file in one call.
pub fn verify_checksum<R: Read + Seek>(reader: R) -> io::Result<()> {
    CircuitReader::new(reader)?.verify_checksum()
}
