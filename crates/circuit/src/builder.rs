//! The circuit fabric: wire allocation and gate emission.

use ahash::AHashMap;
use fixedbitset::FixedBitSet;

use crate::wire::{Gate, GateKind, RawWireId, Wire};

/// Builder for an append-only circuit over the {AND, XOR} basis.
///
/// Wires 0 and 1 are the reserved constants and exist from construction.
/// Input bits occupy the contiguous wire range `2..2 + num_inputs` and must
/// all be allocated before the first gate is emitted. The wire counter is
/// monotone; a gate's inputs always precede its output in the append order,
/// so the gate list is topologically sorted by construction.
pub struct CircuitBuilder {
    next_wire: RawWireId,
    num_inputs: u32,
    inputs_open: bool,
    gates: Vec<Gate>,
    outputs: Vec<Wire>,
    /// Maps `(kind, min(in1, in2), max(in1, in2))` to the existing output
    /// wire when gate deduplication is enabled.
    dedup: Option<AHashMap<(GateKind, RawWireId, RawWireId), Wire>>,
    #[cfg(debug_assertions)]
    produced: Vec<bool>,
}

impl CircuitBuilder {
    /// Creates an empty builder with the two constant wires reserved.
    pub fn new(dedup: bool) -> Self {
        Self {
            next_wire: 2,
            num_inputs: 0,
            inputs_open: true,
            gates: Vec::new(),
            outputs: Vec::new(),
            dedup: dedup.then(AHashMap::new),
            #[cfg(debug_assertions)]
            produced: vec![true, true],
        }
    }

    /// Number of input bits allocated so far.
    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    /// High-water mark of the wire counter.
    pub fn num_wires(&self) -> u32 {
        self.next_wire
    }

    /// Number of gates emitted so far.
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Gates emitted so far, in append order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Allocates `n` contiguous input bits and returns their wires in
    /// little-endian significance order.
    ///
    /// # Panics
    ///
    /// If any gate or scratch wire has already been allocated; inputs must
    /// form one contiguous block starting at wire 2.
    pub fn add_inputs(&mut self, n: u32) -> Vec<Wire> {
        assert!(self.inputs_open, "fabric: inputs must precede all gates");
        let start = self.next_wire;
        self.next_wire = self
            .next_wire
            .checked_add(n)
            .expect("fabric: wire counter overflow");
        self.num_inputs += n;
        #[cfg(debug_assertions)]
        self.produced.resize(self.next_wire as usize, true);
        (start..self.next_wire).map(Wire::from).collect()
    }

    /// Returns a fresh wire id and bumps the counter.
    pub fn alloc_wire(&mut self) -> Wire {
        self.inputs_open = false;
        let w = Wire::from(self.next_wire);
        self.next_wire = self
            .next_wire
            .checked_add(1)
            .expect("fabric: wire counter overflow");
        #[cfg(debug_assertions)]
        self.produced.push(false);
        w
    }

    /// Returns a contiguous block of fresh wires. The order is significant:
    /// downstream primitives treat the block as little-endian bits.
    pub fn alloc_wires(&mut self, n: u32) -> Vec<Wire> {
        (0..n).map(|_| self.alloc_wire()).collect()
    }

    /// Appends a gate. The acyclicity and single-definition preconditions
    /// are checked in debug builds; violating them is a bug in the caller,
    /// not a recoverable error.
    pub fn emit(&mut self, in1: Wire, in2: Wire, out: Wire, kind: GateKind) {
        debug_assert!(in1.index() < out.index(), "fabric: gate input not yet defined");
        debug_assert!(in2.index() < out.index(), "fabric: gate input not yet defined");
        debug_assert!(out.index() < self.next_wire, "fabric: gate output not allocated");
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.produced[out.index() as usize],
                "fabric: wire {} already has a producer",
                out.index()
            );
            self.produced[out.index() as usize] = true;
        }
        self.gates.push(Gate::new(in1, in2, out, kind));
    }

    /// Appends a gate on a fresh output wire, after constant folding and
    /// (when enabled) deduplication. This is the entry point every derived
    /// helper and bit-blast primitive goes through.
    pub fn gate(&mut self, kind: GateKind, a: Wire, b: Wire) -> Wire {
        match kind {
            GateKind::AND => {
                if a == Wire::FALSE || b == Wire::FALSE {
                    return Wire::FALSE;
                }
                if a == Wire::TRUE {
                    return b;
                }
                if b == Wire::TRUE {
                    return a;
                }
                if a == b {
                    return a;
                }
            }
            GateKind::XOR => {
                if a == b {
                    return Wire::FALSE;
                }
                if a == Wire::FALSE {
                    return b;
                }
                if b == Wire::FALSE {
                    return a;
                }
            }
        }
        let (x, y) = if a.index() <= b.index() { (a, b) } else { (b, a) };
        if let Some(map) = &self.dedup {
            if let Some(&hit) = map.get(&(kind, x.index(), y.index())) {
                return hit;
            }
        }
        let out = self.alloc_wire();
        self.emit(x, y, out, kind);
        if let Some(map) = &mut self.dedup {
            map.insert((kind, x.index(), y.index()), out);
        }
        out
    }

    /// `a AND b`.
    pub fn and(&mut self, a: Wire, b: Wire) -> Wire {
        self.gate(GateKind::AND, a, b)
    }

    /// `a XOR b`.
    pub fn xor(&mut self, a: Wire, b: Wire) -> Wire {
        self.gate(GateKind::XOR, a, b)
    }

    /// `NOT a`, realised as `XOR(a, true)`.
    pub fn not(&mut self, a: Wire) -> Wire {
        self.xor(a, Wire::TRUE)
    }

    /// `a OR b`, realised as `XOR(XOR(a, b), AND(a, b))`.
    pub fn or(&mut self, a: Wire, b: Wire) -> Wire {
        if a == Wire::TRUE || b == Wire::TRUE {
            return Wire::TRUE;
        }
        let x = self.xor(a, b);
        let n = self.and(a, b);
        self.xor(x, n)
    }

    /// Two-way multiplexer: `s ? a : b`, realised as
    /// `XOR(b, AND(s, XOR(a, b)))`.
    pub fn mux(&mut self, s: Wire, a: Wire, b: Wire) -> Wire {
        if s == Wire::TRUE {
            return a;
        }
        if s == Wire::FALSE || a == b {
            return b;
        }
        let d = self.xor(a, b);
        let g = self.and(s, d);
        self.xor(b, g)
    }

    /// Declares a wire as the next output bit.
    pub fn add_output(&mut self, w: Wire) {
        assert!(w.index() < self.next_wire, "fabric: output wire out of bounds");
        self.outputs.push(w);
    }

    /// Declares a block of output bits, in order.
    pub fn add_outputs(&mut self, ws: &[Wire]) {
        for &w in ws {
            self.add_output(w);
        }
    }

    /// Number of output bits declared so far.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Seals the builder into an immutable circuit.
    pub fn finish(self) -> Circuit {
        Circuit {
            num_inputs: self.num_inputs,
            num_wires: self.next_wire,
            gates: self.gates,
            outputs: self.outputs,
        }
    }
}

impl std::fmt::Debug for CircuitBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBuilder")
            .field("num_inputs", &self.num_inputs)
            .field("num_wires", &self.next_wire)
            .field("num_gates", &self.gates.len())
            .field("num_outputs", &self.outputs.len())
            .finish()
    }
}

/// A finished, immutable circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    num_inputs: u32,
    num_wires: u32,
    gates: Vec<Gate>,
    outputs: Vec<Wire>,
}

impl Circuit {
    /// Reassembles a circuit from its parts, e.g. when reading it back from
    /// disk. Call [`Circuit::validate`] afterwards for untrusted input.
    pub fn from_parts(num_inputs: u32, num_wires: u32, gates: Vec<Gate>, outputs: Vec<Wire>) -> Self {
        Self { num_inputs, num_wires, gates, outputs }
    }

    /// Number of input bits.
    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    /// Wire-counter high-water mark.
    pub fn num_wires(&self) -> u32 {
        self.num_wires
    }

    /// The gate list in append order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// The output wires in declaration order.
    pub fn outputs(&self) -> &[Wire] {
        &self.outputs
    }

    /// Number of output bits.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Returns an iterator over the input wires, in input-bit order.
    pub fn input_wires(&self) -> impl Iterator<Item = Wire> + Clone {
        (2..2 + self.num_inputs).map(Wire::from)
    }

    /// Counts gates by kind, returned as `(xor_gates, and_gates)`.
    pub fn count_kinds(&self) -> (u64, u64) {
        let mut xor = 0u64;
        let mut and = 0u64;
        for g in &self.gates {
            match g.kind {
                GateKind::XOR => xor += 1,
                GateKind::AND => and += 1,
            }
        }
        (xor, and)
    }

    /// Checks the structural invariants over the whole gate array: every
    /// gate input is defined strictly earlier, every wire other than 0 and
    /// 1 has exactly one producer or is an input bit, and all declared
    /// outputs are defined.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_wires as usize;
        let mut defined = FixedBitSet::with_capacity(n.max(2));
        defined.insert(0);
        defined.insert(1);
        for w in self.input_wires() {
            if w.index() as usize >= n {
                return Err(format!("input wire {} beyond wire counter", w.index()));
            }
            defined.insert(w.index() as usize);
        }
        for (i, g) in self.gates.iter().enumerate() {
            for input in [g.in1, g.in2] {
                if !defined.contains(input.index() as usize) {
                    return Err(format!(
                        "gate {} reads wire {} before it is defined",
                        i,
                        input.index()
                    ));
                }
            }
            let out = g.out.index() as usize;
            if out >= n {
                return Err(format!("gate {} output {} beyond wire counter", i, out));
            }
            if defined.contains(out) {
                return Err(format!("wire {} has more than one producer", out));
            }
            defined.insert(out);
        }
        for &w in &self.outputs {
            if !defined.contains(w.index() as usize) {
                return Err(format!("output wire {} is never defined", w.index()));
            }
        }
        Ok(())
    }
}
