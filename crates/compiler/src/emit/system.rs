//! System instruction emitters.

use zkrv_circuit::Wire;

use super::advance_pc;
use crate::context::Context;

/// ECALL and EBREAK raise the trap signal. The wire is compile-time
/// constant from here on: any trap instruction on the straight-line path
/// fires unconditionally.
pub(crate) fn trap(c: &mut Context) {
    c.trap = Wire::TRUE;
    advance_pc(c);
}

/// FENCE is a no-op circuit: gate append order is already total, so the
/// ordering it requests always holds.
pub(crate) fn fence(c: &mut Context) {
    advance_pc(c);
}
