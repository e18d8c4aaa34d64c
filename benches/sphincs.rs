// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

use criterion::*;
use rand::rngs::OsRng;
use rand::RngCore;

use sphincs256::{generate_key, open, sign, SIGNATURE_BYTES};

fn sphincs_keygen(c: &mut Criterion) {
    c.bench_function("SPHINCS-256 KeyGen", |b| {
        b.iter(|| generate_key(&mut OsRng).unwrap())
    });
}

fn sphincs_sign(c: &mut Criterion) {
    let mut rng = OsRng;
    let (_, sk) = generate_key(&mut rng).unwrap();
    println!("Signature Size: {} Bytes", SIGNATURE_BYTES);
    c.bench_function("SPHINCS-256 Sign", |b| {
        b.iter_with_setup(
            || {
                let n = rng.next_u32();
                format!("msg{}", n)
            },
            |m| sign(&sk, m.as_bytes()),
        )
    });
}

fn sphincs_open(c: &mut Criterion) {
    let mut rng = OsRng;
    let (pk, sk) = generate_key(&mut rng).unwrap();
    c.bench_function("SPHINCS-256 Open", |b| {
        b.iter_with_setup(
            || {
                let n = rng.next_u32();
                sign(&sk, format!("msg{}", n).as_bytes())
            },
            |sm| open(&pk, &sm).unwrap(),
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = sphincs_keygen, sphincs_sign, sphincs_open
}
criterion_main!(benches);
