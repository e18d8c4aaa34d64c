// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! SPHINCS-256: a practical stateless hash-based signature scheme.
//!
//! Security rests on preimage and second-preimage resistance of the
//! underlying hash family only. Keys are generated once from 1088 bytes of
//! caller-supplied randomness; signing is deterministic given the key and
//! message, and yields a 41 000-byte signature followed by the message.

pub mod address;
pub mod blake;
pub mod chacha;
pub mod hash;
pub mod horst;
pub mod merkle;
pub mod params;
pub mod sphincs;
pub mod wots;

pub use crate::params::{PUBLIC_KEY_BYTES, SECRET_KEY_BYTES, SIGNATURE_BYTES};
pub use crate::sphincs::{generate_key, open, sign, Error, PublicKey, SecretKey};
