// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Average-pooling feature pyramid.
//!
//! Part 1 builds a pyramid of average-pooled copies of the input, one level
//! per stride, keyed `p{log2(stride)}` the way FPN levels are named. Part 2
//! reads the coarsest level and scores each channel by its mean activation,
//! which is enough to classify images by their dominant colour.
//!
//! # Cost Model
//!
//! Every input element contributes one MAC to every pyramid level, and part 2
//! performs one MAC per element of the coarsest level:
//!
//! ```text
//! part1_kmacs = C * H' * W' * levels / 1000
//! part2_kmacs = C * (H' / s_max) * (W' / s_max) / 1000
//! ```
//!
//! where `H' x W'` is the input cropped to a multiple of the largest stride.

use crate::stage::StageAdapter;
use crate::AdapterError;
use feature_ir::{DatasetItem, FeatureBundle, ImageSize};
use module_accounting::ComplexityPair;
use std::collections::BTreeMap;
use tensor_core::{Shape, Tensor};

/// Part-2 output: per-channel scores and the winning channel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Classification {
    pub scores: Vec<f32>,
    pub label: usize,
}

impl Classification {
    /// Score of the predicted label.
    pub fn best_score(&self) -> f32 {
        self.scores.get(self.label).copied().unwrap_or(f32::NEG_INFINITY)
    }
}

/// Stage pair producing an average-pooled feature pyramid.
#[derive(Debug, Clone)]
pub struct PoolingStage {
    strides: Vec<usize>,
}

impl PoolingStage {
    pub const NAME: &'static str = "pooling";

    /// Creates a stage with the given pyramid strides.
    ///
    /// Strides must be non-empty powers of two; they are kept sorted and
    /// deduplicated.
    pub fn new(mut strides: Vec<usize>) -> Result<Self, AdapterError> {
        strides.sort_unstable();
        strides.dedup();
        if strides.is_empty() {
            return Err(Self::error("at least one stride is required"));
        }
        if let Some(bad) = strides.iter().find(|s| !s.is_power_of_two()) {
            return Err(Self::error(format!("stride {bad} is not a power of two")));
        }
        Ok(Self { strides })
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Feature key of the level pooled at `stride`.
    pub fn level_key(stride: usize) -> String {
        format!("p{}", stride.trailing_zeros())
    }

    fn max_stride(&self) -> usize {
        // Non-empty by construction.
        self.strides[self.strides.len() - 1]
    }

    fn cropped_size(&self, height: u32, width: u32) -> ImageSize {
        let s = self.max_stride() as u32;
        ImageSize::new(height - height % s, width - width % s)
    }

    fn chw(item: &DatasetItem) -> Result<(usize, usize, usize), AdapterError> {
        item.image.shape().as_chw().ok_or_else(|| {
            Self::error(format!(
                "item {} has non-CHW image {}",
                item.image_id,
                item.image.shape()
            ))
        })
    }

    fn error(detail: impl Into<String>) -> AdapterError {
        AdapterError::Stage {
            stage: Self::NAME.to_string(),
            detail: detail.into(),
        }
    }
}

impl Default for PoolingStage {
    fn default() -> Self {
        Self {
            strides: vec![4, 8, 16],
        }
    }
}

/// Average-pools a `[c, h, w]` buffer by `stride`. `h` and `w` must be
/// multiples of `stride`; only the top-left `h x w` window of a row of
/// length `row_len` is read.
fn avg_pool(values: &[f32], c: usize, h: usize, w: usize, row_len: usize, plane_len: usize, stride: usize) -> Vec<f32> {
    let (oh, ow) = (h / stride, w / stride);
    let norm = (stride * stride) as f32;
    let mut out = Vec::with_capacity(c * oh * ow);
    for ch in 0..c {
        let plane = &values[ch * plane_len..];
        for oy in 0..oh {
            for ox in 0..ow {
                let mut acc = 0.0f32;
                for dy in 0..stride {
                    let row = (oy * stride + dy) * row_len + ox * stride;
                    acc += plane[row..row + stride].iter().sum::<f32>();
                }
                out.push(acc / norm);
            }
        }
    }
    out
}

impl StageAdapter for PoolingStage {
    type Prediction = Classification;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn part1(&self, item: &DatasetItem) -> Result<FeatureBundle, AdapterError> {
        let (c, h, w) = Self::chw(item)?;
        let cropped = self.cropped_size(h as u32, w as u32);
        if cropped.pixels() == 0 {
            return Err(Self::error(format!(
                "item {} ({h}x{w}) is smaller than the largest stride {}",
                item.image_id,
                self.max_stride()
            )));
        }

        let (ch, cw) = (cropped.height as usize, cropped.width as usize);
        let values = item.image.to_f32_vec();
        let mut data = BTreeMap::new();
        for &stride in &self.strides {
            let pooled = avg_pool(&values, c, ch, cw, w, h * w, stride);
            let tensor = Tensor::from_f32(Shape::chw(c, ch / stride, cw / stride), &pooled)?;
            data.insert(Self::level_key(stride), tensor);
        }

        Ok(FeatureBundle::new(data).with_input_size(vec![cropped]))
    }

    fn part2(&self, bundle: &FeatureBundle) -> Result<Classification, AdapterError> {
        let coarsest = bundle.tensor(&Self::level_key(self.max_stride()))?;
        let (c, h, w) = coarsest
            .shape()
            .as_chw()
            .ok_or_else(|| Self::error(format!("coarsest level has shape {}", coarsest.shape())))?;

        let values = coarsest.to_f32_vec();
        let plane = (h * w).max(1);
        let scores: Vec<f32> = (0..c)
            .map(|ch| values[ch * h * w..(ch + 1) * h * w].iter().sum::<f32>() / plane as f32)
            .collect();

        let label = scores
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &s)| if s > best.1 { (i, s) } else { best })
            .0;

        Ok(Classification { scores, label })
    }

    fn input_size(&self, item: &DatasetItem) -> Vec<ImageSize> {
        vec![self.cropped_size(item.height, item.width)]
    }

    fn part1_complexity(&self, item: &DatasetItem) -> Result<ComplexityPair, AdapterError> {
        let (c, h, w) = Self::chw(item)?;
        let cropped = self.cropped_size(h as u32, w as u32);
        let macs = c as u64 * cropped.pixels() * self.strides.len() as u64;
        Ok(ComplexityPair::new(macs as f64 / 1000.0, cropped.pixels()))
    }

    fn part2_complexity(&self, bundle: &FeatureBundle) -> Result<ComplexityPair, AdapterError> {
        let coarsest = bundle.tensor(&Self::level_key(self.max_stride()))?;
        let pixels = bundle.primary_input_size().map(|s| s.pixels()).unwrap_or(0);
        Ok(ComplexityPair::new(coarsest.num_elements() as f64 / 1000.0, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DType;

    /// 3-channel image whose channel `hot` is bright and the rest dark.
    fn item(h: usize, w: usize, hot: usize) -> DatasetItem {
        let mut values = vec![0.1f32; 3 * h * w];
        values[hot * h * w..(hot + 1) * h * w].fill(0.9);
        let image = Tensor::from_f32(Shape::chw(3, h, w), &values).unwrap();
        DatasetItem::from_image(1, "one.png", image).unwrap()
    }

    #[test]
    fn test_new_validates_strides() {
        assert!(PoolingStage::new(vec![]).is_err());
        assert!(PoolingStage::new(vec![4, 6]).is_err());
        let s = PoolingStage::new(vec![8, 2, 8]).unwrap();
        assert_eq!(s.strides(), &[2, 8]);
    }

    #[test]
    fn test_level_keys() {
        assert_eq!(PoolingStage::level_key(4), "p2");
        assert_eq!(PoolingStage::level_key(16), "p4");
    }

    #[test]
    fn test_part1_builds_pyramid_on_cropped_input() {
        let stage = PoolingStage::new(vec![2, 4]).unwrap();
        let bundle = stage.part1(&item(10, 13, 0)).unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.data["p1"].shape().dims(), &[3, 4, 6]);
        assert_eq!(bundle.data["p2"].shape().dims(), &[3, 2, 3]);
        assert_eq!(bundle.primary_input_size(), Some(ImageSize::new(8, 12)));
        assert!(bundle.org_input_size.is_none());
    }

    #[test]
    fn test_avg_pool_values() {
        // Single channel 2x4, pooled by 2.
        let values = [1.0, 3.0, 5.0, 7.0, 1.0, 3.0, 5.0, 7.0];
        let out = avg_pool(&values, 1, 2, 4, 4, 8, 2);
        assert_eq!(out, vec![2.0, 6.0]);
    }

    #[test]
    fn test_part2_picks_dominant_channel() {
        let stage = PoolingStage::default();
        for hot in 0..3 {
            let bundle = stage.part1(&item(32, 32, hot)).unwrap();
            let pred = stage.part2(&bundle).unwrap();
            assert_eq!(pred.label, hot);
            assert!((pred.best_score() - 0.9).abs() < 1e-5);
        }
    }

    #[test]
    fn test_part2_accepts_reduced_precision() {
        let stage = PoolingStage::default();
        let mut bundle = stage.part1(&item(32, 32, 2)).unwrap();
        bundle.cast_all(DType::F16);
        assert_eq!(stage.part2(&bundle).unwrap().label, 2);
    }

    #[test]
    fn test_too_small_item_is_rejected() {
        let stage = PoolingStage::default();
        let err = stage.part1(&item(8, 8, 0)).unwrap_err();
        assert!(matches!(err, AdapterError::Stage { .. }));
    }

    #[test]
    fn test_input_size_is_pure() {
        let stage = PoolingStage::default();
        let it = item(33, 50, 1);
        assert_eq!(stage.input_size(&it), stage.input_size(&it));
        assert_eq!(stage.input_size(&it), vec![ImageSize::new(32, 48)]);
    }

    #[test]
    fn test_complexity_estimates() {
        let stage = PoolingStage::new(vec![2, 4]).unwrap();
        let it = item(8, 8, 0);
        let p1 = stage.part1_complexity(&it).unwrap();
        assert_eq!(p1.pixels, 64);
        assert!((p1.kmacs - 3.0 * 64.0 * 2.0 / 1000.0).abs() < 1e-12);

        let bundle = stage.part1(&it).unwrap();
        let p2 = stage.part2_complexity(&bundle).unwrap();
        assert_eq!(p2.pixels, 64);
        assert!((p2.kmacs - 12.0 / 1000.0).abs() < 1e-12);
    }
}
