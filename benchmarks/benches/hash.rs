// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use rampart_hash::{fnv1a, murmur2};

fn benchmark_digests(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");

    for size in [64, 256, 1024, 4096, 16384].iter() {
        let data = vec![0xA5u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(format!("murmur2 {} bytes", size), &data, |b, data| {
            b.iter(|| murmur2(black_box(data)));
        });
        group.bench_with_input(format!("fnv1a {} bytes", size), &data, |b, data| {
            b.iter(|| fnv1a(black_box(data)));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_digests);
criterion_main!(benches);
