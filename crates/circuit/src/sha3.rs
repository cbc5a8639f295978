//! Bit-blasted SHA3-256 over the two-gate basis.
//!
//! Only the χ step of Keccak-f[1600] contains AND gates; θ, χ's XORs and ι
//! are XOR gates and ρ/π are constant-rotation rewiring. The single public
//! entry point hashes the concatenation of two 256-bit labels, which is the
//! only message shape the Merkle memory tier needs: 512 message bits fit in
//! one 1088-bit rate block, so the padding is pure constant wiring.

use crate::builder::CircuitBuilder;
use crate::wire::Wire;

/// One 64-bit Keccak lane as wires, least-significant bit first.
pub type Lane = [Wire; 64];

/// The 25 lanes of the Keccak state; lane `(x, y)` lives at index `x + 5*y`.
pub type KeccakState = [Lane; 25];

const ROUNDS: usize = 24;

const ROUND_CONSTANTS: [u64; ROUNDS] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Rotation offsets, indexed `[x][y]`.
const ROTATION: [[u32; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

/// Lane rotated left by `n`: rewiring only.
fn rotl(lane: &Lane, n: u32) -> Lane {
    let n = (n % 64) as usize;
    std::array::from_fn(|z| lane[(z + 64 - n) % 64])
}

/// Applies the full 24-round Keccak-f[1600] permutation in place.
pub fn keccak_f1600(b: &mut CircuitBuilder, lanes: &mut KeccakState) {
    for &rc in ROUND_CONSTANTS.iter() {
        // θ: column parities, then mix into every lane.
        let c: [Lane; 5] = std::array::from_fn(|x| {
            let mut acc = lanes[x];
            for y in 1..5 {
                for z in 0..64 {
                    acc[z] = b.xor(acc[z], lanes[x + 5 * y][z]);
                }
            }
            acc
        });
        let d: [Lane; 5] = std::array::from_fn(|x| {
            let rot = rotl(&c[(x + 1) % 5], 1);
            std::array::from_fn(|z| b.xor(c[(x + 4) % 5][z], rot[z]))
        });
        for x in 0..5 {
            for y in 0..5 {
                for z in 0..64 {
                    lanes[x + 5 * y][z] = b.xor(lanes[x + 5 * y][z], d[x][z]);
                }
            }
        }

        // ρ and π: rotate each lane and scatter it to its new position.
        let mut moved = [[Wire::FALSE; 64]; 25];
        for x in 0..5 {
            for y in 0..5 {
                moved[y + 5 * ((2 * x + 3 * y) % 5)] = rotl(&lanes[x + 5 * y], ROTATION[x][y]);
            }
        }

        // χ: the only nonlinear step.
        for y in 0..5 {
            for x in 0..5 {
                lanes[x + 5 * y] = std::array::from_fn(|z| {
                    let not_next = b.not(moved[(x + 1) % 5 + 5 * y][z]);
                    let t = b.and(not_next, moved[(x + 2) % 5 + 5 * y][z]);
                    b.xor(moved[x + 5 * y][z], t)
                });
            }
        }

        // ι: fold the round constant into lane (0, 0).
        for z in 0..64 {
            if rc >> z & 1 == 1 {
                lanes[0][z] = b.not(lanes[0][z]);
            }
        }
    }
}

/// SHA3-256 of `left || right` (512 message bits, one rate block).
///
/// Label bits are little-endian within bytes, matching the byte-array view
/// used by the host-side hasher. The domain-separation byte 0x06 and the
/// final 0x80 of the pad10*1 padding are constant wires.
pub fn sha3_256_concat(
    b: &mut CircuitBuilder,
    left: &[Wire; 256],
    right: &[Wire; 256],
) -> [Wire; 256] {
    let mut lanes: KeccakState = [[Wire::FALSE; 64]; 25];
    for (i, &w) in left.iter().enumerate() {
        lanes[i / 64][i % 64] = w;
    }
    for (i, &w) in right.iter().enumerate() {
        let bit = 256 + i;
        lanes[bit / 64][bit % 64] = w;
    }
    // 0x06 at byte 64, 0x80 at byte 135 (the last rate byte).
    lanes[513 / 64][513 % 64] = Wire::TRUE;
    lanes[514 / 64][514 % 64] = Wire::TRUE;
    lanes[1087 / 64][1087 % 64] = Wire::TRUE;

    keccak_f1600(b, &mut lanes);

    std::array::from_fn(|i| lanes[i / 64][i % 64])
}
