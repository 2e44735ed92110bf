// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Deterministic three-class image set for exercising the pipeline without
//! a real dataset on disk.
//!
//! Item `i` has label `i % 3` and its dominant channel is the label, so the
//! pooling stage classifies every item correctly at lossless settings.

use crate::commands::DatasetArgs;
use feature_ir::DatasetItem;
use split_adapters::TopOneAccuracy;
use tensor_core::{Shape, Tensor};

const CHANNELS: usize = 3;
const FIRST_ID: u64 = 1;

/// Builds the dataset described by `args`.
pub fn build(args: &DatasetArgs) -> anyhow::Result<Vec<DatasetItem>> {
    if args.size < 16 {
        anyhow::bail!("--size must be at least 16, got {}", args.size);
    }
    (0..args.items).map(|i| item(i, args.size)).collect()
}

fn item(index: usize, size: usize) -> anyhow::Result<DatasetItem> {
    let label = index % CHANNELS;
    // Every other item is slightly off-square so crops differ between items.
    let (h, w) = if index % 2 == 0 { (size, size) } else { (size + 5, size - 3) };
    let mut rng = Lcg::new(index as u64);
    let mut values = Vec::with_capacity(CHANNELS * h * w);
    for c in 0..CHANNELS {
        let base = if c == label { 0.8 } else { 0.2 };
        values.extend((0..h * w).map(|_| base + 0.1 * (rng.next_f32() - 0.5)));
    }
    let image = Tensor::from_f32(Shape::chw(CHANNELS, h, w), &values)?;
    let image_id = FIRST_ID + index as u64;
    Ok(DatasetItem::from_image(image_id, format!("synthetic_{image_id:05}.png"), image)?
        .with_metadata(TopOneAccuracy::LABEL_KEY, label as u64))
}

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_are_deterministic_and_labelled() {
        let args = DatasetArgs { items: 4, size: 32 };
        let a = build(&args).unwrap();
        let b = build(&args).unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a[1].image.to_f32_vec(), b[1].image.to_f32_vec());
        assert_eq!(a[2].metadata[TopOneAccuracy::LABEL_KEY], 2);
        assert_eq!(a[0].image_id, 1);
        assert_eq!((a[1].height, a[1].width), (37, 29));
    }

    #[test]
    fn test_too_small_is_rejected() {
        assert!(build(&DatasetArgs { items: 1, size: 8 }).is_err());
    }
}
