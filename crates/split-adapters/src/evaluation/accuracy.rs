// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Top-1 classification accuracy.

use crate::evaluation::{EvalMetrics, EvaluationSink};
use crate::stage::pooling::Classification;
use crate::AdapterError;
use feature_ir::DatasetItem;
use std::path::Path;

/// Counts predictions whose label matches the item's `label` metadata.
#[derive(Debug, Default)]
pub struct TopOneAccuracy {
    correct: usize,
    total: usize,
    finalized: bool,
}

impl TopOneAccuracy {
    /// Metadata key holding the ground-truth class index.
    pub const LABEL_KEY: &'static str = "label";
    /// Metric key of the accuracy percentage.
    pub const TOP1_KEY: &'static str = "top1";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> usize {
        self.total
    }

    fn ground_truth(item: &DatasetItem) -> Result<usize, AdapterError> {
        item.metadata
            .get(Self::LABEL_KEY)
            .and_then(serde_json::Value::as_u64)
            .map(|v| v as usize)
            .ok_or_else(|| {
                AdapterError::Evaluation(format!(
                    "item {} has no integer '{}' field",
                    item.image_id,
                    Self::LABEL_KEY
                ))
            })
    }
}

impl EvaluationSink<Classification> for TopOneAccuracy {
    fn digest(&mut self, item: &DatasetItem, prediction: &Classification) -> Result<(), AdapterError> {
        if self.finalized {
            return Err(AdapterError::Evaluation(
                "digest called after finalize".to_string(),
            ));
        }
        let label = Self::ground_truth(item)?;
        self.total += 1;
        if prediction.label == label {
            self.correct += 1;
        }
        Ok(())
    }

    fn supports_visualization(&self) -> bool {
        true
    }

    fn save_visualization(
        &mut self,
        item: &DatasetItem,
        prediction: &Classification,
        dir: &Path,
        threshold: f32,
    ) -> Result<(), AdapterError> {
        if prediction.best_score() < threshold {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|e| AdapterError::io(dir, e))?;
        let path = dir.join(format!("{}.json", item.file_prefix()));
        let dump = serde_json::json!({
            "file_name": item.file_name,
            "label": prediction.label,
            "scores": prediction.scores,
        });
        let text = serde_json::to_string_pretty(&dump)
            .map_err(|e| AdapterError::Evaluation(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| AdapterError::io(&path, e))
    }

    fn finalize(&mut self) -> Result<EvalMetrics, AdapterError> {
        if self.finalized {
            return Err(AdapterError::Evaluation("finalize called twice".to_string()));
        }
        self.finalized = true;

        let top1 = if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        };
        Ok(EvalMetrics::from([
            (Self::TOP1_KEY.to_string(), top1),
            ("samples".to_string(), self.total as f64),
        ]))
    }
}
