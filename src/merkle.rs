// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Merkle subtrees over WOTS+ leaves: the L-tree compressing a WOTS+ public
//! key to a single node, treehash for subtree roots, and authentication-path
//! generation and validation.
//!
//! Mask schedule: L-tree level i uses masks[2i..], subtree level L uses
//! masks[2(WOTS_LOG_L + L)..], so the two never collide.

use zeroize::Zeroize;

use crate::address::{get_seed, LeafAddr};
use crate::hash::{hash2_mask, hash_2n_n_mask};
use crate::params::{HASH_BYTES, SUBTREE_HEIGHT, WOTS_L, WOTS_LOG_L};
use crate::wots;

/// Compresses the 67 WOTS+ public-key hashes into one leaf node, promoting
/// the odd node unchanged at each level.
pub fn l_tree(wots_pk: &mut [[u8; HASH_BYTES]; WOTS_L], masks: &[u8]) -> [u8; HASH_BYTES] {
    let mut l = WOTS_L;
    for i in 0..WOTS_LOG_L {
        for j in 0..l >> 1 {
            wots_pk[j] = hash2_mask(
                &wots_pk[2 * j],
                &wots_pk[2 * j + 1],
                &masks[i * 2 * HASH_BYTES..],
            );
        }
        if l & 1 != 0 {
            wots_pk[l >> 1] = wots_pk[l - 1];
            l = (l >> 1) + 1;
        } else {
            l >>= 1;
        }
    }
    wots_pk[0]
}

/// WOTS+ public key for the address, L-tree'd down to its subtree leaf.
pub fn gen_leaf_wots(sk: &[u8], masks: &[u8], a: &LeafAddr) -> [u8; HASH_BYTES] {
    let mut seed = get_seed(sk, a);
    let mut pk = wots::pkgen(&seed, masks);
    seed.zeroize();
    l_tree(&mut pk, masks)
}

/// Computes the root of the height-`height` subtree starting at `leaf`,
/// using an auxiliary stack of height+1 nodes.
pub fn treehash(height: usize, sk: &[u8], leaf: &LeafAddr, masks: &[u8]) -> [u8; HASH_BYTES] {
    let mut a = *leaf;
    let mut stack = vec![[0u8; HASH_BYTES]; height + 1];
    let mut stacklevels = vec![0usize; height + 1];
    let mut stackoffset = 0;

    let lastnode = a.subleaf + (1 << height);
    while a.subleaf < lastnode {
        stack[stackoffset] = gen_leaf_wots(sk, masks, &a);
        stacklevels[stackoffset] = 0;
        stackoffset += 1;
        while stackoffset > 1 && stacklevels[stackoffset - 1] == stacklevels[stackoffset - 2] {
            let maskoffset = 2 * (stacklevels[stackoffset - 1] + WOTS_LOG_L) * HASH_BYTES;
            stack[stackoffset - 2] = hash2_mask(
                &stack[stackoffset - 2],
                &stack[stackoffset - 1],
                &masks[maskoffset..],
            );
            stacklevels[stackoffset - 2] += 1;
            stackoffset -= 1;
        }
        a.subleaf += 1;
    }

    stack[0]
}

/// Builds the full subtree for `a`, writes the authentication path for its
/// subleaf into `authpath`, and returns the root.
pub fn compute_authpath_wots(
    authpath: &mut [u8],
    a: &LeafAddr,
    sk: &[u8],
    masks: &[u8],
    height: usize,
) -> [u8; HASH_BYTES] {
    let leaves = 1 << SUBTREE_HEIGHT;
    let mut ta = *a;
    let mut tree = vec![[0u8; HASH_BYTES]; 2 * leaves];

    for subleaf in 0..leaves {
        ta.subleaf = subleaf;
        tree[leaves + subleaf] = gen_leaf_wots(sk, masks, &ta);
    }

    let mut level = 0;
    let mut width = leaves;
    while width > 1 {
        for j in (0..width).step_by(2) {
            tree[(width >> 1) + (j >> 1)] = hash2_mask(
                &tree[width + j],
                &tree[width + j + 1],
                &masks[2 * (WOTS_LOG_L + level) * HASH_BYTES..],
            );
        }
        level += 1;
        width >>= 1;
    }

    // Sibling of the subleaf's ancestor at each level, low to high.
    let idx = a.subleaf;
    for i in 0..height {
        let node = (leaves >> i) + ((idx >> i) ^ 1);
        authpath[i * HASH_BYTES..(i + 1) * HASH_BYTES].copy_from_slice(&tree[node]);
    }

    tree[1]
}

/// Walks `leaf` up through the provided sibling hashes and returns the root
/// the path claims, for comparison by the caller.
pub fn validate_authpath(
    leaf: &[u8; HASH_BYTES],
    mut leafidx: usize,
    authpath: &[u8],
    masks: &[u8],
    height: usize,
) -> [u8; HASH_BYTES] {
    let mut buffer = [0u8; 2 * HASH_BYTES];
    if leafidx & 1 != 0 {
        buffer[HASH_BYTES..].copy_from_slice(leaf);
        buffer[..HASH_BYTES].copy_from_slice(&authpath[..HASH_BYTES]);
    } else {
        buffer[..HASH_BYTES].copy_from_slice(leaf);
        buffer[HASH_BYTES..].copy_from_slice(&authpath[..HASH_BYTES]);
    }
    let mut authpath = &authpath[HASH_BYTES..];

    for i in 0..height - 1 {
        leafidx >>= 1;
        let node = hash_2n_n_mask(&buffer, &masks[2 * (WOTS_LOG_L + i) * HASH_BYTES..]);
        if leafidx & 1 != 0 {
            buffer[HASH_BYTES..].copy_from_slice(&node);
            buffer[..HASH_BYTES].copy_from_slice(&authpath[..HASH_BYTES]);
        } else {
            buffer[..HASH_BYTES].copy_from_slice(&node);
            buffer[HASH_BYTES..].copy_from_slice(&authpath[..HASH_BYTES]);
        }
        authpath = &authpath[HASH_BYTES..];
    }

    hash_2n_n_mask(&buffer, &masks[2 * (WOTS_LOG_L + height - 1) * HASH_BYTES..])
}
