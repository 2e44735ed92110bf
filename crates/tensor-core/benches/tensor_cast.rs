// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for precision casts applied to feature tensors.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{DType, Shape, Tensor};

fn feature_map() -> Tensor {
    let shape = Shape::chw(256, 64, 64);
    let values: Vec<f32> = (0..shape.num_elements())
        .map(|i| (i % 97) as f32 * 0.125)
        .collect();
    Tensor::from_f32(shape, &values).unwrap()
}

fn bench_cast(c: &mut Criterion) {
    let t = feature_map();
    for dtype in [DType::F16, DType::BF16, DType::I8] {
        c.bench_function(&format!("cast_f32_to_{dtype}"), |b| {
            b.iter(|| black_box(&t).cast(dtype))
        });
    }
}

fn bench_decode(c: &mut Criterion) {
    let t = feature_map().cast(DType::F16);
    c.bench_function("decode_f16_to_f32", |b| {
        b.iter(|| black_box(&t).to_f32_vec())
    });
}

criterion_group!(benches, bench_cast, bench_decode);
criterion_main!(benches);
