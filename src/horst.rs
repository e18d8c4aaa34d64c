// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! HORST few-time signature: HORS with a height-16 tree over 2^16 leaf
//! secrets, revealing k=32 of them per signature.
//!
//! A signature carries the 64 level-10 nodes once, so each reveal only needs
//! the 10 authentication hashes below that level. The verifier recomputes
//! every reveal up to level 10, checks it against the shared cache, then
//! folds the cache into the root.

use std::convert::TryInto;

use zeroize::Zeroize;

use crate::chacha::prg;
use crate::hash::{hash2_mask, hash_2n_n_mask, hash_n_n};
use crate::params::{
    HASH_BYTES, HORST_K, HORST_LOG_T, HORST_SIG_BYTES, HORST_SK_BYTES, HORST_T, MSG_HASH_BYTES,
    SEED_BYTES,
};

/// Number of level-10 nodes carried in every signature.
const CACHE_NODES: usize = 64;

/// Authentication hashes per reveal (leaf up to, not including, level 10).
const PATH_LEN: usize = HORST_LOG_T - 6;

fn expand_seed(seed: &[u8; SEED_BYTES]) -> Vec<u8> {
    let mut sk = vec![0u8; HORST_T * HORST_SK_BYTES];
    prg(&mut sk, seed);
    sk
}

/// Reads the j-th 16-bit leaf index out of the 64-byte message digest.
fn leaf_index(m_hash: &[u8; MSG_HASH_BYTES], j: usize) -> usize {
    m_hash[2 * j] as usize + ((m_hash[2 * j + 1] as usize) << 8)
}

/// Signs the digest into `sig` (HORST_SIG_BYTES long) and returns the tree
/// root, which doubles as this instance's public key.
pub fn sign(
    sig: &mut [u8],
    seed: &[u8; SEED_BYTES],
    masks: &[u8],
    m_hash: &[u8; MSG_HASH_BYTES],
) -> [u8; HASH_BYTES] {
    let mut sk = expand_seed(seed);

    // Complete binary tree, 1-indexed heap layout: root at 0, leaves at
    // HORST_T-1 .. 2*HORST_T-1.
    let mut tree = vec![[0u8; HASH_BYTES]; 2 * HORST_T - 1];
    for i in 0..HORST_T {
        tree[HORST_T - 1 + i] =
            hash_n_n(sk[i * HORST_SK_BYTES..(i + 1) * HORST_SK_BYTES].try_into().unwrap());
    }
    for level in 0..HORST_LOG_T {
        let offset_in = (1 << (HORST_LOG_T - level)) - 1;
        let offset_out = (1 << (HORST_LOG_T - level - 1)) - 1;
        for j in 0..1 << (HORST_LOG_T - level - 1) {
            tree[offset_out + j] = hash2_mask(
                &tree[offset_in + 2 * j],
                &tree[offset_in + 2 * j + 1],
                &masks[2 * level * HASH_BYTES..],
            );
        }
    }

    // Level-10 cache: the 64 nodes at depth 6 from the root.
    let mut sigpos = 0;
    for node in &tree[CACHE_NODES - 1..2 * CACHE_NODES - 1] {
        sig[sigpos..sigpos + HASH_BYTES].copy_from_slice(node);
        sigpos += HASH_BYTES;
    }

    for j in 0..HORST_K {
        let mut idx = leaf_index(m_hash, j);

        sig[sigpos..sigpos + HORST_SK_BYTES]
            .copy_from_slice(&sk[idx * HORST_SK_BYTES..(idx + 1) * HORST_SK_BYTES]);
        sigpos += HORST_SK_BYTES;

        idx += HORST_T - 1;
        for _ in 0..PATH_LEN {
            let sibling = if idx & 1 != 0 { idx + 1 } else { idx - 1 };
            sig[sigpos..sigpos + HASH_BYTES].copy_from_slice(&tree[sibling]);
            sigpos += HASH_BYTES;
            idx = (idx - 1) / 2;
        }
    }
    debug_assert_eq!(sigpos, HORST_SIG_BYTES);

    sk.zeroize();
    tree[0]
}

/// Recomputes the root a signature commits to, or `None` if any reveal
/// disagrees with the level-10 cache.
pub fn verify(
    sig: &[u8],
    masks: &[u8],
    m_hash: &[u8; MSG_HASH_BYTES],
) -> Option<[u8; HASH_BYTES]> {
    let level10 = &sig[..CACHE_NODES * HASH_BYTES];
    let mut sig = &sig[CACHE_NODES * HASH_BYTES..];
    let mut buffer = [0u8; 2 * HASH_BYTES];

    for j in 0..HORST_K {
        let mut idx = leaf_index(m_hash, j);

        let leaf = hash_n_n(sig[..HORST_SK_BYTES].try_into().unwrap());
        let sibling = &sig[HORST_SK_BYTES..HORST_SK_BYTES + HASH_BYTES];
        if idx & 1 == 0 {
            buffer[..HASH_BYTES].copy_from_slice(&leaf);
            buffer[HASH_BYTES..].copy_from_slice(sibling);
        } else {
            buffer[HASH_BYTES..].copy_from_slice(&leaf);
            buffer[..HASH_BYTES].copy_from_slice(sibling);
        }
        sig = &sig[HORST_SK_BYTES + HASH_BYTES..];

        for level in 1..PATH_LEN {
            idx >>= 1;
            let node = hash_2n_n_mask(&buffer, &masks[2 * (level - 1) * HASH_BYTES..]);
            if idx & 1 == 0 {
                buffer[..HASH_BYTES].copy_from_slice(&node);
                buffer[HASH_BYTES..].copy_from_slice(&sig[..HASH_BYTES]);
            } else {
                buffer[HASH_BYTES..].copy_from_slice(&node);
                buffer[..HASH_BYTES].copy_from_slice(&sig[..HASH_BYTES]);
            }
            sig = &sig[HASH_BYTES..];
        }

        idx >>= 1;
        let node = hash_2n_n_mask(&buffer, &masks[2 * (PATH_LEN - 1) * HASH_BYTES..]);
        if node[..] != level10[idx * HASH_BYTES..(idx + 1) * HASH_BYTES] {
            return None;
        }
    }

    // Fold the cache upward: level 10 through 16, masks indexed by level.
    let mut nodes = [[0u8; HASH_BYTES]; CACHE_NODES / 2];
    for (j, node) in nodes.iter_mut().enumerate() {
        *node = hash_2n_n_mask(
            level10[2 * j * HASH_BYTES..(2 * j + 2) * HASH_BYTES].try_into().unwrap(),
            &masks[2 * (HORST_LOG_T - 6) * HASH_BYTES..],
        );
    }
    let mut width = CACHE_NODES / 2;
    let mut level = HORST_LOG_T - 5;
    while width > 1 {
        width >>= 1;
        for j in 0..width {
            nodes[j] = hash2_mask(
                &nodes[2 * j],
                &nodes[2 * j + 1],
                &masks[2 * level * HASH_BYTES..],
            );
        }
        level += 1;
    }

    Some(nodes[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::N_MASKS;

    fn test_masks() -> Vec<u8> {
        (0..N_MASKS * HASH_BYTES).map(|i| (i * 11 + 3) as u8).collect()
    }

    #[test]
    fn sign_then_verify_same_root() {
        let seed = [0x61u8; SEED_BYTES];
        let masks = test_masks();
        let mut m_hash = [0u8; MSG_HASH_BYTES];
        for (i, b) in m_hash.iter_mut().enumerate() {
            *b = (i * 37) as u8;
        }

        let mut sig = vec![0u8; HORST_SIG_BYTES];
        let root = sign(&mut sig, &seed, &masks, &m_hash);
        assert_eq!(verify(&sig, &masks, &m_hash), Some(root));
    }

    #[test]
    fn repeated_indices_still_verify() {
        // A digest whose 16-bit index pairs collide reveals the same leaf
        // multiple times; the signature must remain valid.
        let seed = [0x62u8; SEED_BYTES];
        let masks = test_masks();
        let m_hash = [0xd1u8; MSG_HASH_BYTES];

        let mut sig = vec![0u8; HORST_SIG_BYTES];
        let root = sign(&mut sig, &seed, &masks, &m_hash);
        assert_eq!(verify(&sig, &masks, &m_hash), Some(root));
    }

    #[test]
    fn tampering_is_detected() {
        let seed = [0x63u8; SEED_BYTES];
        let masks = test_masks();
        let mut m_hash = [0u8; MSG_HASH_BYTES];
        for (i, b) in m_hash.iter_mut().enumerate() {
            *b = (i * 59 + 1) as u8;
        }

        let mut sig = vec![0u8; HORST_SIG_BYTES];
        let root = sign(&mut sig, &seed, &masks, &m_hash);

        // Flip one bit of a revealed secret.
        let mut bad = sig.clone();
        bad[CACHE_NODES * HASH_BYTES] ^= 1;
        assert_eq!(verify(&bad, &masks, &m_hash), None);

        // A flipped cache node either breaks a reveal or shifts the root.
        let mut bad = sig.clone();
        bad[0] ^= 1;
        assert_ne!(verify(&bad, &masks, &m_hash), Some(root));

        // A different digest selects different leaves.
        let mut other = m_hash;
        other[0] ^= 0xff;
        assert_ne!(verify(&sig, &masks, &other), Some(root));
    }
}
