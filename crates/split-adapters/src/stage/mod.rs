// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`StageAdapter`] trait and stage implementations.

pub mod pooling;

use crate::AdapterError;
use feature_ir::{DatasetItem, FeatureBundle, ImageSize};
use module_accounting::ComplexityPair;

/// The two halves of a split network.
///
/// Part 1 runs on the "edge" side and turns an item into intermediate
/// features; part 2 runs on the "cloud" side and turns recovered features
/// into a task prediction. Both halves are assumed to be loaded and ready.
pub trait StageAdapter {
    /// Task output of part 2, consumed by the evaluation sink.
    type Prediction;

    /// Human-readable name of this stage pair.
    fn name(&self) -> &str;

    /// Runs part 1 on one item.
    fn part1(&self, item: &DatasetItem) -> Result<FeatureBundle, AdapterError>;

    /// Runs part 2 on a recovered bundle.
    fn part2(&self, bundle: &FeatureBundle) -> Result<Self::Prediction, AdapterError>;

    /// Sizes that part 1 would feed for this item. Must not depend on
    /// earlier calls.
    fn input_size(&self, item: &DatasetItem) -> Vec<ImageSize>;

    /// Estimated cost of part 1 on `item`.
    fn part1_complexity(&self, item: &DatasetItem) -> Result<ComplexityPair, AdapterError>;

    /// Estimated cost of part 2 on `bundle`.
    fn part2_complexity(&self, bundle: &FeatureBundle) -> Result<ComplexityPair, AdapterError>;

    /// Blocks until outstanding work has finished. Called before each stage
    /// timing is read; a no-op for stages that run synchronously.
    fn synchronize(&self) {}
}
