// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! BLAKE-256 and BLAKE-512, the SHA-3 finalist digests (not BLAKE2/BLAKE3).
//!
//! Message words and output are big-endian. The compression counter tracks
//! message bits and is suppressed for padding-only blocks, per the BLAKE
//! submission document.

use std::convert::TryInto;

/// Message-word schedule, shared by both digest sizes (rounds repeat mod 10).
const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// First digits of pi as 32-bit constants.
const C256: [u32; 16] = [
    0x243f_6a88, 0x85a3_08d3, 0x1319_8a2e, 0x0370_7344,
    0xa409_3822, 0x299f_31d0, 0x082e_fa98, 0xec4e_6c89,
    0x4528_21e6, 0x38d0_1377, 0xbe54_66cf, 0x34e9_0c6c,
    0xc0ac_29b7, 0xc97c_50dd, 0x3f84_d5b5, 0xb547_0917,
];

/// First digits of pi as 64-bit constants.
const C512: [u64; 16] = [
    0x243f_6a88_85a3_08d3, 0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0, 0x082e_fa98_ec4e_6c89,
    0x4528_21e6_38d0_1377, 0xbe54_66cf_34e9_0c6c,
    0xc0ac_29b7_c97c_50dd, 0x3f84_d5b5_b547_0917,
    0x9216_d5d9_8979_fb1b, 0xd131_0ba6_98df_b5ac,
    0x2ffd_72db_d01a_dfb7, 0xb8e1_afed_6a26_7e96,
    0xba7c_9045_f12c_7f99, 0x24a1_9947_b391_6cf7,
    0x0801_f2e2_858e_fc16, 0x6369_20d8_7157_4e69,
];

const IV256: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
    0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
];

const IV512: [u64; 8] = [
    0x6a09_e667_f3bc_c908, 0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b, 0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1, 0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b, 0x5be0_cd19_137e_2179,
];

/// BLAKE-256: 14 rounds over 32-bit words, 64-byte blocks, 32-byte digest.
#[derive(Clone)]
pub struct Blake256 {
    h: [u32; 8],
    t: u64,
    buf: [u8; 64],
    buflen: usize,
    nullt: bool,
}

/// BLAKE-512: 16 rounds over 64-bit words, 128-byte blocks, 64-byte digest.
#[derive(Clone)]
pub struct Blake512 {
    h: [u64; 8],
    t: u64,
    buf: [u8; 128],
    buflen: usize,
    nullt: bool,
}

fn g256(v: &mut [u32; 16], m: &[u32; 16], s: &[usize; 16], i: usize, a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[2 * i]] ^ C256[s[2 * i + 1]]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[2 * i + 1]] ^ C256[s[2 * i]]);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

fn g512(v: &mut [u64; 16], m: &[u64; 16], s: &[usize; 16], i: usize, a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[2 * i]] ^ C512[s[2 * i + 1]]);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(25);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[2 * i + 1]] ^ C512[s[2 * i]]);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(11);
}

impl Blake256 {
    pub fn new() -> Self {
        Self {
            h: IV256,
            t: 0,
            buf: [0u8; 64],
            buflen: 0,
            nullt: false,
        }
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> [u8; 32] {
        let mut d = Self::new();
        d.update(data);
        d.finalize()
    }

    pub fn update(&mut self, mut data: &[u8]) {
        if self.buflen > 0 {
            let take = (64 - self.buflen).min(data.len());
            self.buf[self.buflen..self.buflen + take].copy_from_slice(&data[..take]);
            self.buflen += take;
            data = &data[take..];
            if self.buflen == 64 {
                let block = self.buf;
                self.compress(&block);
                self.buflen = 0;
            }
        }
        while data.len() >= 64 {
            let block: [u8; 64] = data[..64].try_into().unwrap();
            self.compress(&block);
            data = &data[64..];
        }
        if !data.is_empty() {
            self.buf[..data.len()].copy_from_slice(data);
            self.buflen = data.len();
        }
    }

    pub fn finalize(mut self) -> [u8; 32] {
        let nx = self.buflen as u64;
        let len_bytes = self.t.wrapping_add(nx << 3).to_be_bytes();

        if self.buflen == 55 {
            // Exactly one padding byte fits before the length.
            self.t = self.t.wrapping_sub(8);
            self.update(&[0x81]);
        } else {
            let mut pad = [0u8; 64];
            pad[0] = 0x80;
            if self.buflen < 55 {
                if self.buflen == 0 {
                    self.nullt = true;
                }
                self.t = self.t.wrapping_sub(440 - (nx << 3));
                let n = 55 - self.buflen;
                self.update(&pad[..n]);
            } else {
                self.t = self.t.wrapping_sub(512 - (nx << 3));
                let n = 64 - self.buflen;
                self.update(&pad[..n]);
                self.t = self.t.wrapping_sub(440);
                self.update(&pad[1..56]);
                self.nullt = true;
            }
            self.t = self.t.wrapping_sub(8);
            self.update(&[0x01]);
        }
        self.t = self.t.wrapping_sub(64);
        self.update(&len_bytes);

        let mut out = [0u8; 32];
        for (i, word) in self.h.iter().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    fn compress(&mut self, block: &[u8; 64]) {
        let mut m = [0u32; 16];
        for (i, word) in m.iter_mut().enumerate() {
            *word = u32::from_be_bytes(block[4 * i..4 * i + 4].try_into().unwrap());
        }
        self.t = self.t.wrapping_add(512);

        let mut v = [0u32; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&C256[..8]);
        if !self.nullt {
            v[12] ^= self.t as u32;
            v[13] ^= self.t as u32;
            v[14] ^= (self.t >> 32) as u32;
            v[15] ^= (self.t >> 32) as u32;
        }

        for r in 0..14 {
            let s = &SIGMA[r % 10];
            g256(&mut v, &m, s, 0, 0, 4, 8, 12);
            g256(&mut v, &m, s, 1, 1, 5, 9, 13);
            g256(&mut v, &m, s, 2, 2, 6, 10, 14);
            g256(&mut v, &m, s, 3, 3, 7, 11, 15);
            g256(&mut v, &m, s, 4, 0, 5, 10, 15);
            g256(&mut v, &m, s, 5, 1, 6, 11, 12);
            g256(&mut v, &m, s, 6, 2, 7, 8, 13);
            g256(&mut v, &m, s, 7, 3, 4, 9, 14);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }
    }
}

impl Blake512 {
    pub fn new() -> Self {
        Self {
            h: IV512,
            t: 0,
            buf: [0u8; 128],
            buflen: 0,
            nullt: false,
        }
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> [u8; 64] {
        let mut d = Self::new();
        d.update(data);
        d.finalize()
    }

    pub fn update(&mut self, mut data: &[u8]) {
        if self.buflen > 0 {
            let take = (128 - self.buflen).min(data.len());
            self.buf[self.buflen..self.buflen + take].copy_from_slice(&data[..take]);
            self.buflen += take;
            data = &data[take..];
            if self.buflen == 128 {
                let block = self.buf;
                self.compress(&block);
                self.buflen = 0;
            }
        }
        while data.len() >= 128 {
            let block: [u8; 128] = data[..128].try_into().unwrap();
            self.compress(&block);
            data = &data[128..];
        }
        if !data.is_empty() {
            self.buf[..data.len()].copy_from_slice(data);
            self.buflen = data.len();
        }
    }

    pub fn finalize(mut self) -> [u8; 64] {
        let nx = self.buflen as u64;
        let bitlen = self.t.wrapping_add(nx << 3);
        let mut len_bytes = [0u8; 16];
        len_bytes[8..].copy_from_slice(&bitlen.to_be_bytes());

        if self.buflen == 111 {
            // Exactly one padding byte fits before the length.
            self.t = self.t.wrapping_sub(8);
            self.update(&[0x81]);
        } else {
            let mut pad = [0u8; 128];
            pad[0] = 0x80;
            if self.buflen < 111 {
                if self.buflen == 0 {
                    self.nullt = true;
                }
                self.t = self.t.wrapping_sub(888 - (nx << 3));
                let n = 111 - self.buflen;
                self.update(&pad[..n]);
            } else {
                self.t = self.t.wrapping_sub(1024 - (nx << 3));
                let n = 128 - self.buflen;
                self.update(&pad[..n]);
                self.t = self.t.wrapping_sub(888);
                self.update(&pad[1..112]);
                self.nullt = true;
            }
            self.t = self.t.wrapping_sub(8);
            self.update(&[0x01]);
        }
        self.t = self.t.wrapping_sub(128);
        self.update(&len_bytes);

        let mut out = [0u8; 64];
        for (i, word) in self.h.iter().enumerate() {
            out[8 * i..8 * i + 8].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    fn compress(&mut self, block: &[u8; 128]) {
        let mut m = [0u64; 16];
        for (i, word) in m.iter_mut().enumerate() {
            *word = u64::from_be_bytes(block[8 * i..8 * i + 8].try_into().unwrap());
        }
        self.t = self.t.wrapping_add(1024);

        let mut v = [0u64; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&C512[..8]);
        if !self.nullt {
            v[12] ^= self.t;
            v[13] ^= self.t;
            // High counter half stays zero for any message this crate hashes.
        }

        for r in 0..16 {
            let s = &SIGMA[r % 10];
            g512(&mut v, &m, s, 0, 0, 4, 8, 12);
            g512(&mut v, &m, s, 1, 1, 5, 9, 13);
            g512(&mut v, &m, s, 2, 2, 6, 10, 14);
            g512(&mut v, &m, s, 3, 3, 7, 11, 15);
            g512(&mut v, &m, s, 4, 0, 5, 10, 15);
            g512(&mut v, &m, s, 5, 1, 6, 11, 12);
            g512(&mut v, &m, s, 6, 2, 7, 8, 13);
            g512(&mut v, &m, s, 7, 3, 4, 9, 14);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }
    }
}

impl Default for Blake256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Blake512 {
    fn default() -> Self {
        Self::new()
    }
}
