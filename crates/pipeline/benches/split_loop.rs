// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the split-inference loop and bitstream resolution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use feature_ir::DatasetItem;
use pipeline::{BitstreamResolver, PipelineConfig, SplitInference};
use split_adapters::{PoolingStage, ZstdFeatureCodec};
use tensor_core::{Shape, Tensor};

fn synthetic_items(n: u64, side: usize) -> Vec<DatasetItem> {
    (0..n)
        .map(|id| {
            let values: Vec<f32> = (0..3 * side * side)
                .map(|i| ((i as u64 * 31 + id * 7) % 255) as f32 / 255.0)
                .collect();
            let image = Tensor::from_f32(Shape::chw(3, side, side), &values).unwrap();
            DatasetItem::from_image(id, format!("{id}.png"), image).unwrap()
        })
        .collect()
}

fn bench_round_trip(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = SplitInference::new(PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        log_every: 0,
        ..Default::default()
    })
    .validate()
    .unwrap();
    let stage = PoolingStage::default();

    let mut group = c.benchmark_group("round_trip_8_items");
    for level in [1, 9] {
        let items = synthetic_items(8, 128);
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            let mut codec = ZstdFeatureCodec::new(level).unwrap();
            b.iter(|| {
                pipeline
                    .run(&stage, &mut codec, items.clone(), None)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    for id in 0..1000 {
        std::fs::write(dir.path().join(format!("run-img_id_{id}.bin")), [0u8; 8]).unwrap();
    }
    let resolver = BitstreamResolver::new(dir.path());
    c.bench_function("resolve_in_1000_files", |b| {
        b.iter(|| resolver.resolve("run-img_id_500").unwrap());
    });
}

criterion_group!(benches, bench_round_trip, bench_resolve);
criterion_main!(benches);
