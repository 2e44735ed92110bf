// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`EvaluationSink`] trait and evaluator implementations.

pub mod accuracy;

use crate::AdapterError;
use feature_ir::DatasetItem;
use std::collections::BTreeMap;
use std::path::Path;

/// Named task metrics, e.g. `{"top1": 92.5, "samples": 200.0}`.
pub type EvalMetrics = BTreeMap<String, f64>;

/// Consumes predictions and produces task metrics.
pub trait EvaluationSink<P> {
    /// Records the prediction for one item.
    fn digest(&mut self, item: &DatasetItem, prediction: &P) -> Result<(), AdapterError>;

    /// Whether [`save_visualization`](Self::save_visualization) does anything.
    fn supports_visualization(&self) -> bool {
        false
    }

    /// Writes a visual dump of `prediction` under `dir`, keeping only
    /// detections scoring at least `threshold`.
    fn save_visualization(
        &mut self,
        _item: &DatasetItem,
        _prediction: &P,
        _dir: &Path,
        _threshold: f32,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Produces the final metrics. Called once, after the last item.
    fn finalize(&mut self) -> Result<EvalMetrics, AdapterError>;
}
