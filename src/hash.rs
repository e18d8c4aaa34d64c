// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The SPHINCS-256 hash family: fixed-input-length hashes built on the
//! ChaCha permutation, masked variants of both, and the two BLAKE digests
//! used for seed derivation and message hashing.

use std::convert::TryInto;

use crate::blake::{Blake256, Blake512};
use crate::chacha::permute;
use crate::params::{HASH_BYTES, MSG_HASH_BYTES};

/// Second half of the permutation input for the fixed-length hashes.
const HASH_C: &[u8; 32] = b"expand 32-byte to 64-byte state!";

/// Variable-length to 32 bytes (BLAKE-256); derives WOTS/HORST seeds.
pub fn varlen_hash(input: &[u8]) -> [u8; HASH_BYTES] {
    Blake256::digest(input)
}

/// Variable-length to 64 bytes (BLAKE-512); message digests and leaf-index
/// derivation.
pub fn msg_hash(input: &[u8]) -> [u8; MSG_HASH_BYTES] {
    Blake512::digest(input)
}

/// F: 32 bytes to 32 bytes through one application of the permutation.
pub fn hash_n_n(input: &[u8; HASH_BYTES]) -> [u8; HASH_BYTES] {
    let mut x = [0u8; 64];
    x[..32].copy_from_slice(input);
    x[32..].copy_from_slice(HASH_C);
    permute(&mut x);
    x[..32].try_into().unwrap()
}

pub fn hash_n_n_mask(input: &[u8; HASH_BYTES], mask: &[u8]) -> [u8; HASH_BYTES] {
    let mut buf = [0u8; HASH_BYTES];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = input[i] ^ mask[i];
    }
    hash_n_n(&buf)
}

/// H: 64 bytes to 32 bytes; the second input half is folded in between two
/// applications of the permutation.
pub fn hash_2n_n(input: &[u8; 2 * HASH_BYTES]) -> [u8; HASH_BYTES] {
    let mut x = [0u8; 64];
    x[..32].copy_from_slice(&input[..32]);
    x[32..].copy_from_slice(HASH_C);
    permute(&mut x);
    for i in 0..32 {
        x[i] ^= input[32 + i];
    }
    permute(&mut x);
    x[..32].try_into().unwrap()
}

pub fn hash_2n_n_mask(input: &[u8; 2 * HASH_BYTES], mask: &[u8]) -> [u8; HASH_BYTES] {
    let mut buf = [0u8; 2 * HASH_BYTES];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = input[i] ^ mask[i];
    }
    hash_2n_n(&buf)
}

/// Combines two sibling nodes under the mask for their tree level.
pub fn hash2_mask(
    left: &[u8; HASH_BYTES],
    right: &[u8; HASH_BYTES],
    mask: &[u8],
) -> [u8; HASH_BYTES] {
    let mut buf = [0u8; 2 * HASH_BYTES];
    buf[..HASH_BYTES].copy_from_slice(left);
    buf[HASH_BYTES..].copy_from_slice(right);
    hash_2n_n_mask(&buf, mask)
}
