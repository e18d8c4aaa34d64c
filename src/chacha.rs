// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The 12-round ChaCha core, used two ways: as the fixed 64-byte public
//! permutation behind the tree hashes, and as the ChaCha12 keystream that
//! expands 32-byte seeds into secret key material.
//!
//! The permutation deliberately omits the stream cipher's word-wise
//! feed-forward; with the feed-forward the core rounds become the ordinary
//! ChaCha12 block function, which is what `prg` produces.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::params::SEED_BYTES;

pub const ROUNDS: usize = 12;

macro_rules! quarter_round {
    ($x:ident, $a:expr, $b:expr, $c:expr, $d:expr) => {
        $x[$a] = $x[$a].wrapping_add($x[$b]);
        $x[$d] = ($x[$d] ^ $x[$a]).rotate_left(16);
        $x[$c] = $x[$c].wrapping_add($x[$d]);
        $x[$b] = ($x[$b] ^ $x[$c]).rotate_left(12);
        $x[$a] = $x[$a].wrapping_add($x[$b]);
        $x[$d] = ($x[$d] ^ $x[$a]).rotate_left(8);
        $x[$c] = $x[$c].wrapping_add($x[$d]);
        $x[$b] = ($x[$b] ^ $x[$c]).rotate_left(7);
    };
}

/// The column/diagonal double-round sequence shared by both uses of the core.
pub fn rounds(x: &mut [u32; 16]) {
    for _ in 0..ROUNDS / 2 {
        quarter_round!(x, 0, 4, 8, 12);
        quarter_round!(x, 1, 5, 9, 13);
        quarter_round!(x, 2, 6, 10, 14);
        quarter_round!(x, 3, 7, 11, 15);
        quarter_round!(x, 0, 5, 10, 15);
        quarter_round!(x, 1, 6, 11, 12);
        quarter_round!(x, 2, 7, 8, 13);
        quarter_round!(x, 3, 4, 9, 14);
    }
}

/// Permutes a 64-byte block in place, interpreting it as sixteen
/// little-endian 32-bit words. No feed-forward is applied.
pub fn permute(buf: &mut [u8; 64]) {
    let mut x = [0u32; 16];
    for (i, word) in x.iter_mut().enumerate() {
        *word = u32::from_le_bytes([buf[4 * i], buf[4 * i + 1], buf[4 * i + 2], buf[4 * i + 3]]);
    }
    rounds(&mut x);
    for (i, word) in x.iter().enumerate() {
        buf[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
    }
}

/// Fills `out` with the ChaCha12 keystream for `key` under an all-zero nonce,
/// with the block counter starting at zero.
pub fn prg(out: &mut [u8], key: &[u8; SEED_BYTES]) {
    let mut rng = ChaCha12Rng::from_seed(*key);
    rng.fill_bytes(out);
}
