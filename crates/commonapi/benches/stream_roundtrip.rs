// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

use commonapi::{decode, encode, stream_struct, variant, Variant};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;

variant! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Value {
        Int(i64),
        Real(f64),
        Text(String),
    }
}

stream_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Sample {
        pub id: u32,
        pub readings: Vec<f64>,
        pub tags: BTreeMap<String, Variant<Value>>,
    }
}

fn sample() -> Sample {
    let tags = (0..16)
        .map(|i| {
            let value = match i % 3 {
                0 => Variant::new(i64::from(i)),
                1 => Variant::new(f64::from(i) * 0.5),
                _ => Variant::new(format!("tag-{}", i)),
            };
            (format!("key-{}", i), value)
        })
        .collect();
    Sample {
        id: 42,
        readings: (0..256).map(f64::from).collect(),
        tags,
    }
}

fn bench_encode(c: &mut Criterion) {
    let value = sample();
    c.bench_function("stream_encode_sample", |b| {
        b.iter(|| encode(black_box(&value), None))
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = encode(&sample(), None).unwrap();
    c.bench_function("stream_decode_sample", |b| {
        b.iter(|| decode::<Sample>(black_box(&bytes), None))
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
