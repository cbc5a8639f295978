//! Miter construction: two candidate circuits over shared inputs, one
//! output wire that is true iff they ever disagree.

use zkrv_circuit::ops::or_reduce;
use zkrv_circuit::{Circuit, CircuitBuilder, Wire};

/// Builds a miter over `num_inputs` shared symbolic input bits.
///
/// The two closures each realise one candidate function over the same
/// inputs, so input equality holds by construction. Their output vectors
/// must be equally long; the miter's single output is the OR over the
/// per-bit XOR differences.
///
/// Deduplication is left on, which collapses structurally identical
/// candidates to a constant-false difference without involving the solver.
pub fn build_miter<F, G>(num_inputs: u32, f: F, g: G) -> Circuit
where
    F: FnOnce(&mut CircuitBuilder, &[Wire]) -> Vec<Wire>,
    G: FnOnce(&mut CircuitBuilder, &[Wire]) -> Vec<Wire>,
{
    let mut b = CircuitBuilder::new(true);
    let inputs = b.add_inputs(num_inputs);

    let lhs = f(&mut b, &inputs);
    let rhs = g(&mut b, &inputs);
    assert_eq!(
        lhs.len(),
        rhs.len(),
        "miter: candidates have different output widths"
    );

    let diffs: Vec<Wire> = lhs
        .iter()
        .zip(&rhs)
        .map(|(&x, &y)| b.xor(x, y))
        .collect();
    let any_diff = or_reduce(&mut b, &diffs);
    b.add_output(any_diff);
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_candidates_collapse_to_constant_false() {
        let miter = build_miter(
            2,
            |b, i| vec![b.and(i[0], i[1])],
            |b, i| vec![b.and(i[1], i[0])],
        );
        assert_eq!(miter.outputs(), &[Wire::FALSE]);
    }

    #[test]
    fn differing_candidates_leave_a_live_output() {
        let miter = build_miter(
            2,
            |b, i| vec![b.and(i[0], i[1])],
            |b, i| vec![b.or(i[0], i[1])],
        );
        assert_ne!(miter.outputs()[0], Wire::FALSE);
        assert_eq!(miter.num_outputs(), 1);
    }
}
