// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Winternitz One-Time Signature (WOTS+) Scheme over a 32-byte digest.
//!
//! Chains are masked: step i XORs the i-th public mask into the node before
//! hashing, so a verifier continuing a chain at digit b starts from mask b.
//! Secret chain starts are expanded from a per-address seed with the ChaCha12
//! keystream; each seed must sign at most once.

use std::convert::TryInto;

use zeroize::Zeroize;

use crate::chacha::prg;
use crate::hash::hash_n_n_mask;
use crate::params::{HASH_BYTES, SEED_BYTES, WOTS_L, WOTS_L1, WOTS_LOG_W, WOTS_W};

/// Splits a digest into 64 base-16 digits (low nibble first) and appends the
/// three checksum digits, least-significant first.
fn base_w(msg: &[u8; HASH_BYTES]) -> [usize; WOTS_L] {
    let mut basew = [0usize; WOTS_L];
    let mut checksum = 0;

    for i in (0..WOTS_L1).step_by(2) {
        basew[i] = (msg[i / 2] & 0xf) as usize;
        basew[i + 1] = (msg[i / 2] >> 4) as usize;
        checksum += WOTS_W - 1 - basew[i];
        checksum += WOTS_W - 1 - basew[i + 1];
    }
    for digit in basew.iter_mut().skip(WOTS_L1) {
        *digit = checksum & 0xf;
        checksum >>= WOTS_LOG_W;
    }

    basew
}

/// Applies `chainlen` masked hash steps to `start`, reading masks from the
/// front of `masks`. A caller resuming a chain at digit b passes the mask
/// slice offset by b positions.
fn gen_chain(start: &[u8; HASH_BYTES], masks: &[u8], chainlen: usize) -> [u8; HASH_BYTES] {
    let mut out = *start;
    for i in 0..chainlen.min(WOTS_W) {
        out = hash_n_n_mask(&out, &masks[i * HASH_BYTES..]);
    }
    out
}

/// Expands the seed and runs every chain to its end, yielding the public key.
pub fn pkgen(seed: &[u8; SEED_BYTES], masks: &[u8]) -> [[u8; HASH_BYTES]; WOTS_L] {
    let mut expanded = [0u8; WOTS_L * HASH_BYTES];
    prg(&mut expanded, seed);

    let mut pk = [[0u8; HASH_BYTES]; WOTS_L];
    for (i, chain) in pk.iter_mut().enumerate() {
        let start: [u8; HASH_BYTES] =
            expanded[i * HASH_BYTES..(i + 1) * HASH_BYTES].try_into().unwrap();
        *chain = gen_chain(&start, masks, WOTS_W - 1);
    }
    expanded.zeroize();

    pk
}

/// Signs a 32-byte digest into `sig` (WOTS_SIG_BYTES long): chain i stops at
/// digit b_i.
pub fn sign(sig: &mut [u8], msg: &[u8; HASH_BYTES], seed: &[u8; SEED_BYTES], masks: &[u8]) {
    let basew = base_w(msg);

    prg(&mut sig[..WOTS_L * HASH_BYTES], seed);
    for (i, &digit) in basew.iter().enumerate() {
        let start: [u8; HASH_BYTES] = sig[i * HASH_BYTES..(i + 1) * HASH_BYTES].try_into().unwrap();
        let node = gen_chain(&start, masks, digit);
        sig[i * HASH_BYTES..(i + 1) * HASH_BYTES].copy_from_slice(&node);
    }
}

/// Completes each chain from digit b_i to the end, recovering the candidate
/// public key for comparison by the caller.
pub fn verify(sig: &[u8], msg: &[u8; HASH_BYTES], masks: &[u8]) -> [[u8; HASH_BYTES]; WOTS_L] {
    let basew = base_w(msg);

    let mut pk = [[0u8; HASH_BYTES]; WOTS_L];
    for (i, &digit) in basew.iter().enumerate() {
        let start: [u8; HASH_BYTES] = sig[i * HASH_BYTES..(i + 1) * HASH_BYTES].try_into().unwrap();
        pk[i] = gen_chain(&start, &masks[digit * HASH_BYTES..], WOTS_W - 1 - digit);
    }
    pk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WOTS_SIG_BYTES;

    fn test_masks() -> Vec<u8> {
        (0..crate::params::N_MASKS * HASH_BYTES)
            .map(|i| (i * 13 + 7) as u8)
            .collect()
    }

    #[test]
    fn sign_and_verify() {
        let seed = [3u8; SEED_BYTES];
        let masks = test_masks();
        let msg = [0xabu8; HASH_BYTES];

        let pk = pkgen(&seed, &masks);
        let mut sig = [0u8; WOTS_SIG_BYTES];
        sign(&mut sig, &msg, &seed, &masks);
        assert_eq!(verify(&sig, &msg, &masks), pk);

        let mut other = msg;
        other[0] ^= 1;
        assert_ne!(verify(&sig, &other, &masks), pk);
    }

    #[test]
    fn chain_composition() {
        // Continuing a chain from its midpoint with offset masks matches
        // running it in one go.
        let masks = test_masks();
        let start = [9u8; HASH_BYTES];
        let mid = gen_chain(&start, &masks, 6);
        let end_split = gen_chain(&mid, &masks[6 * HASH_BYTES..], 9);
        let end_whole = gen_chain(&start, &masks, WOTS_W - 1);
        assert_eq!(end_split, end_whole);
        assert_eq!(gen_chain(&end_whole, &masks, 0), end_whole);
    }

    #[test]
    fn base_w_digits_and_checksum() {
        let mut msg = [0u8; HASH_BYTES];
        msg[0] = 0x2f; // digits 15, 2 (low nibble first)
        let basew = base_w(&msg);
        assert_eq!(basew[0], 0xf);
        assert_eq!(basew[1], 0x2);

        // Remaining 62 digits are zero: checksum = 0 + 13 + 62*15 = 943 = 0x3af,
        // emitted low digit first.
        let checksum: usize = basew[..WOTS_L1].iter().map(|&b| WOTS_W - 1 - b).sum();
        assert_eq!(checksum, 943);
        assert_eq!(basew[WOTS_L1], 0xf);
        assert_eq!(basew[WOTS_L1 + 1], 0xa);
        assert_eq!(basew[WOTS_L1 + 2], 0x3);
    }
}
