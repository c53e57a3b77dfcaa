// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use firewood_critbit::CritBit64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_keys(n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(1234);
    (0..n).map(|_| rng.random()).collect()
}

fn populated(keys: &[u64]) -> CritBit64<u64> {
    keys.iter().map(|&key| (key, key)).collect()
}

fn bench_put<const N: usize>(criterion: &mut Criterion) {
    let keys = random_keys(N);
    criterion
        .benchmark_group("put")
        .bench_function(BenchmarkId::from_parameter(N), |b| {
            b.iter_batched(
                CritBit64::new,
                |mut trie| {
                    for &key in &keys {
                        trie.put(key, key);
                    }
                    trie
                },
                BatchSize::SmallInput,
            );
        });
}

fn bench_put_with_snapshot<const N: usize>(criterion: &mut Criterion) {
    // a live snapshot forces every write to copy its path
    let keys = random_keys(N);
    let base = populated(&keys);
    criterion
        .benchmark_group("put_with_snapshot")
        .bench_function(BenchmarkId::from_parameter(N), |b| {
            b.iter_batched(
                || (base.snapshot(), base.clone()),
                |(snapshot, mut trie)| {
                    for &key in &keys {
                        trie.put(!key, key);
                    }
                    (snapshot, trie)
                },
                BatchSize::SmallInput,
            );
        });
}

fn bench_get<const N: usize>(criterion: &mut Criterion) {
    let keys = random_keys(N);
    let trie = populated(&keys);
    criterion
        .benchmark_group("get")
        .bench_function(BenchmarkId::from_parameter(N), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(trie.get(*key));
                }
            });
        });
}

fn bench_iter<const N: usize>(criterion: &mut Criterion) {
    let trie = populated(&random_keys(N));
    criterion
        .benchmark_group("iter")
        .bench_function(BenchmarkId::from_parameter(N), |b| {
            b.iter(|| black_box(trie.iter().count()));
        });
}

fn bench_query<const N: usize>(criterion: &mut Criterion) {
    let trie = populated(&random_keys(N));
    let mut group = criterion.benchmark_group("query");
    group.bench_function(BenchmarkId::new("range", N), |b| {
        b.iter(|| black_box(trie.query(1 << 62, 1 << 63).count()));
    });
    group.bench_function(BenchmarkId::new("mask", N), |b| {
        b.iter(|| black_box(trie.query_with_mask(1 << 62, !(1 << 63)).count()));
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_put::<10_000>, bench_put_with_snapshot::<10_000>, bench_get::<10_000>,
        bench_iter::<10_000>, bench_query::<100_000>
}

criterion_main!(benches);
