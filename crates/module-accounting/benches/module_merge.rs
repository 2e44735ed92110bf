// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for per-item timing accumulation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use module_accounting::{ComplexityPair, Module, ModuleComplexityMap, ModuleTimingMap, ENCODE_MODULES};
use std::time::Duration;

fn per_item_maps(n: usize) -> Vec<ModuleTimingMap> {
    (0..n)
        .map(|i| {
            Module::ALL
                .iter()
                .skip(i % 3)
                .map(|&m| (m, Duration::from_micros(i as u64 + 1)))
                .collect()
        })
        .collect()
}

fn bench_merge_stream(c: &mut Criterion) {
    let maps = per_item_maps(10_000);
    c.bench_function("merge_10k_item_maps", |b| {
        b.iter(|| {
            let mut acc = ModuleTimingMap::new();
            for m in black_box(&maps) {
                acc.merge_from(m);
            }
            acc.retained(&ENCODE_MODULES)
        })
    });
}

fn bench_complexity(c: &mut Criterion) {
    c.bench_function("accumulate_complexity_10k", |b| {
        b.iter(|| {
            let mut acc = ModuleComplexityMap::new();
            for i in 0..10_000u64 {
                acc.add(Module::NnPart1, ComplexityPair::new(i as f64, 640 * 480));
            }
            acc.kmacs_per_pixel()
        })
    });
}

criterion_group!(benches, bench_merge_stream, bench_complexity);
criterion_main!(benches);
