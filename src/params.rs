// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Fixed SPHINCS-256 parameter set and derived sizes.

/// Hash output size in bytes, for every tree node and mask half.
pub const HASH_BYTES: usize = 32;

/// Message digest length in bytes (BLAKE-512 output).
pub const MSG_HASH_BYTES: usize = 64;

/// Seed size for WOTS and HORST instances.
pub const SEED_BYTES: usize = 32;

/// Secret seed feeding the deterministic leaf-index/randomizer derivation.
pub const SK_RAND_SEED_BYTES: usize = 32;

/// Public randomizer R carried at the front of every signature.
pub const MESSAGE_HASH_SEED_BYTES: usize = 32;

/// Height of a single WOTS subtree.
pub const SUBTREE_HEIGHT: usize = 5;

/// Total hypertree height.
pub const TOTAL_TREE_HEIGHT: usize = 60;

/// Number of stacked WOTS subtree layers.
pub const N_LEVELS: usize = TOTAL_TREE_HEIGHT / SUBTREE_HEIGHT;

/// The Winternitz parameter, determining time-space tradeoff.
pub const WOTS_LOG_W: usize = 4;
pub const WOTS_W: usize = 1 << WOTS_LOG_W;

/// Number of base-W digits covering a 256-bit message digest.
pub const WOTS_L1: usize = (256 + WOTS_LOG_W - 1) / WOTS_LOG_W;

/// Total number of function chains (message digits plus checksum digits).
pub const WOTS_L: usize = 67;

/// ceil(log2(WOTS_L)); number of L-tree levels and first subtree mask index.
pub const WOTS_LOG_L: usize = 7;

pub const WOTS_SIG_BYTES: usize = WOTS_L * HASH_BYTES;

/// log2 of the number of HORST leaves.
pub const HORST_LOG_T: usize = 16;

/// Number of HORST leaf secrets.
pub const HORST_T: usize = 1 << HORST_LOG_T;

/// Number of secrets revealed per HORST signature.
pub const HORST_K: usize = 32;

/// Size of one HORST leaf secret.
pub const HORST_SK_BYTES: usize = 32;

/// Level-10 cache (64 nodes) plus K reveals of secret + 10-hash partial path.
pub const HORST_SIG_BYTES: usize =
    64 * HASH_BYTES + HORST_K * (HORST_SK_BYTES + (HORST_LOG_T - 6) * HASH_BYTES);

/// Number of public 32-byte masks; covers the deepest masking schedule (HORST).
pub const N_MASKS: usize = 2 * HORST_LOG_T;

/// Mask array followed by the top-subtree root.
pub const PUBLIC_KEY_BYTES: usize = (N_MASKS + 1) * HASH_BYTES;

/// Master seed, mask array, secret rand seed.
pub const SECRET_KEY_BYTES: usize = SEED_BYTES + N_MASKS * HASH_BYTES + SK_RAND_SEED_BYTES;

/// R, leaf index, HORST signature, then one WOTS signature + auth path per layer.
pub const SIGNATURE_BYTES: usize = MESSAGE_HASH_SEED_BYTES
    + (TOTAL_TREE_HEIGHT + 7) / 8
    + HORST_SIG_BYTES
    + N_LEVELS * (WOTS_SIG_BYTES + SUBTREE_HEIGHT * HASH_BYTES);

// Parameter relationships the byte formats depend on.
const _: () = assert!(N_LEVELS * SUBTREE_HEIGHT == TOTAL_TREE_HEIGHT);
const _: () = assert!(TOTAL_TREE_HEIGHT - SUBTREE_HEIGHT <= 64);
const _: () = assert!(N_LEVELS >= 8);
const _: () = assert!(N_LEVELS <= 15);
const _: () = assert!(SUBTREE_HEIGHT == 5);
const _: () = assert!(TOTAL_TREE_HEIGHT == 60);
const _: () = assert!(SEED_BYTES == HASH_BYTES);
const _: () = assert!(HASH_BYTES == 32);
const _: () = assert!(MESSAGE_HASH_SEED_BYTES == 32);
const _: () = assert!(HORST_SK_BYTES == HASH_BYTES);
const _: () = assert!(HORST_K == MSG_HASH_BYTES / 2);
const _: () = assert!(WOTS_L1 == 64);
const _: () = assert!(WOTS_L == WOTS_L1 + 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertised_sizes() {
        assert_eq!(PUBLIC_KEY_BYTES, 1056);
        assert_eq!(SECRET_KEY_BYTES, 1088);
        assert_eq!(WOTS_SIG_BYTES, 2144);
        assert_eq!(HORST_SIG_BYTES, 13_312);
        assert_eq!(SIGNATURE_BYTES, 41_000);
    }
}
