//! Tseitin translation of a circuit into CNF.

use std::io::{self, Write};

use zkrv_circuit::{Circuit, GateKind, Wire};

/// A CNF formula in DIMACS literal convention: variable `v` is the positive
/// literal `v`, its negation `-v`. Wire `w` maps to variable `w + 1`.
#[derive(Debug, Clone)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i32>>,
}

/// DIMACS variable for a wire.
pub fn var(wire: Wire) -> i32 {
    wire.index() as i32 + 1
}

/// Translates a circuit to CNF, introducing one variable per wire.
///
/// Each AND gate contributes a clause triple, each XOR gate a clause
/// quadruple, and the two reserved constant wires are pinned by unit
/// clauses. Input variables are left free.
pub fn tseitin(circuit: &Circuit) -> Cnf {
    let mut clauses = Vec::with_capacity(circuit.gates().len() * 4 + 2);
    clauses.push(vec![-var(Wire::FALSE)]);
    clauses.push(vec![var(Wire::TRUE)]);

    for gate in circuit.gates() {
        let a = var(gate.in1);
        let b = var(gate.in2);
        let o = var(gate.out);
        match gate.kind {
            GateKind::AND => {
                clauses.push(vec![-o, a]);
                clauses.push(vec![-o, b]);
                clauses.push(vec![o, -a, -b]);
            }
            GateKind::XOR => {
                clauses.push(vec![-o, a, b]);
                clauses.push(vec![-o, -a, -b]);
                clauses.push(vec![o, -a, b]);
                clauses.push(vec![o, a, -b]);
            }
        }
    }

    Cnf {
        num_vars: circuit.num_wires() as usize,
        clauses,
    }
}

/// Writes the formula in DIMACS CNF format for external solvers.
pub fn write_dimacs<W: Write>(mut w: W, cnf: &Cnf) -> io::Result<()> {
    writeln!(w, "p cnf {} {}", cnf.num_vars, cnf.clauses.len())?;
    for clause in &cnf.clauses {
        for lit in clause {
            write!(w, "{lit} ")?;
        }
        writeln!(w, "0")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkrv_circuit::CircuitBuilder;

    #[test]
    fn clause_counts_per_gate_kind() {
        let mut b = CircuitBuilder::new(false);
        let i = b.add_inputs(2);
        let _ = b.and(i[0], i[1]);
        let _ = b.xor(i[0], i[1]);
        let cnf = tseitin(&b.finish());
        // 2 constant units + 3 for the AND + 4 for the XOR.
        assert_eq!(cnf.clauses.len(), 2 + 3 + 4);
    }

    #[test]
    fn dimacs_shape() {
        let mut b = CircuitBuilder::new(false);
        let i = b.add_inputs(2);
        let _ = b.and(i[0], i[1]);
        let cnf = tseitin(&b.finish());
        let mut out = Vec::new();
        write_dimacs(&mut out, &cnf).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("p cnf 5 5\n"));
        assert!(text.lines().skip(1).all(|l| l.ends_with('0')));
    }
}
