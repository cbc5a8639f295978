//! Direct circuit evaluation, used as ground truth in tests and tooling.

use bitvec::prelude::*;

use crate::builder::Circuit;
use crate::wire::GateKind;

/// Evaluates a circuit over concrete input bits and returns its output bits.
///
/// Wires 0 and 1 are tied to false and true. Gates are evaluated in append
/// order, which is topologically valid by construction.
///
/// # Panics
///
/// If `inputs` does not have exactly `circuit.num_inputs()` bits.
pub fn evaluate(circuit: &Circuit, inputs: &BitSlice) -> BitVec {
    evaluate_full(circuit, inputs).1
}

/// Like [`evaluate`], but also returns the full wire-value table, indexed by
/// wire id.
pub fn evaluate_full(circuit: &Circuit, inputs: &BitSlice) -> (BitVec, BitVec) {
    assert_eq!(
        inputs.len(),
        circuit.num_inputs() as usize,
        "eval: expected {} input bits, got {}",
        circuit.num_inputs(),
        inputs.len(),
    );

    let mut state = bitvec![0; circuit.num_wires() as usize];
    state.set(1, true);
    for (bit, wire) in inputs.iter().by_vals().zip(circuit.input_wires()) {
        state.set(wire.index() as usize, bit);
    }

    for gate in circuit.gates() {
        let a = state[gate.in1.index() as usize];
        let b = state[gate.in2.index() as usize];
        let v = match gate.kind {
            GateKind::XOR => a ^ b,
            GateKind::AND => a & b,
        };
        state.set(gate.out.index() as usize, v);
    }

    let outputs = circuit
        .outputs()
        .iter()
        .map(|w| state[w.index() as usize])
        .collect();
    (state, outputs)
}
