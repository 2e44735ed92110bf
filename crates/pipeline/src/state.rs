// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mutable bookkeeping of a single run.

use crate::{BitstreamResolver, ComplexityReport, PipelineConfig, TimingReport};
use feature_ir::OutputRecord;
use module_accounting::{
    ComplexityPair, Module, ModuleComplexityMap, ModuleTimingMap, Stage, StageTimingMap,
    DECODE_MODULES, ENCODE_MODULES,
};
use std::time::Duration;

/// Everything a run accumulates. Created when the run starts, owned by it,
/// and consumed by [`RunState::finish`]; a failed run simply drops it.
#[derive(Debug)]
pub(crate) struct RunState {
    pub(crate) decode_only: bool,
    pub(crate) encode_only: bool,
    skip_frames: usize,
    end_frame_index: Option<usize>,
    mac_calculation: bool,
    /// Present in decode-only mode.
    pub(crate) resolver: Option<BitstreamResolver>,
    stages: StageTimingMap,
    encode: ModuleTimingMap,
    decode: ModuleTimingMap,
    complexity: ModuleComplexityMap,
    pub(crate) records: Vec<OutputRecord>,
    /// Items that went through the loop body; doubles as the coded order
    /// of the next item.
    pub(crate) items_processed: usize,
    pub(crate) metadata_recoveries: usize,
}

impl RunState {
    pub(crate) fn new(config: &PipelineConfig) -> Self {
        Self {
            decode_only: config.decode_only,
            encode_only: config.encode_only,
            skip_frames: config.skip_frames,
            end_frame_index: config.end_frame_index,
            mac_calculation: config.mac_calculation,
            resolver: config
                .decode_only
                .then(|| BitstreamResolver::new(&config.output_dir)),
            stages: StageTimingMap::new(),
            encode: ModuleTimingMap::new(),
            decode: ModuleTimingMap::new(),
            complexity: ModuleComplexityMap::new(),
            records: Vec::new(),
            items_processed: 0,
            metadata_recoveries: 0,
        }
    }

    /// `true` for leading items excluded by `skip_frames`.
    pub(crate) fn is_skipped(&self, index: usize) -> bool {
        !self.decode_only && index < self.skip_frames
    }

    /// `true` once `index` reaches `end_frame_index`.
    pub(crate) fn is_past_end(&self, index: usize) -> bool {
        !self.decode_only && self.end_frame_index.is_some_and(|end| index >= end)
    }

    pub(crate) fn measures_complexity(&self) -> bool {
        self.mac_calculation
    }

    pub(crate) fn charge_stage(&mut self, stage: Stage, elapsed: Duration) {
        self.stages.add(stage, elapsed);
    }

    /// Charges `pair` to `module`, only when complexity is measured.
    pub(crate) fn charge_complexity(&mut self, module: Module, pair: Option<ComplexityPair>) {
        if let (true, Some(pair)) = (self.mac_calculation, pair) {
            self.complexity.add(module, pair);
        }
    }

    pub(crate) fn merge_encode(&mut self, timings: &ModuleTimingMap) {
        self.encode.merge_from(timings);
    }

    pub(crate) fn merge_decode(&mut self, timings: &ModuleTimingMap) {
        self.decode.merge_from(timings);
    }

    /// Closes the books: filters the per-direction maps to their module
    /// sets and derives complexity figures.
    pub(crate) fn finish(self, wall: Duration) -> FinishedRun {
        let timings = TimingReport {
            stages: self.stages,
            encode_modules: (!self.decode_only).then(|| self.encode.retained(&ENCODE_MODULES)),
            decode_modules: (!self.encode_only).then(|| self.decode.retained(&DECODE_MODULES)),
            wall,
        };
        let complexity = self
            .mac_calculation
            .then(|| ComplexityReport::from_totals(self.complexity));
        FinishedRun {
            timings,
            complexity,
            records: self.records,
            items_processed: self.items_processed,
            metadata_recoveries: self.metadata_recoveries,
        }
    }
}

/// What is left of a [`RunState`] after the loop.
#[derive(Debug)]
pub(crate) struct FinishedRun {
    pub(crate) timings: TimingReport,
    pub(crate) complexity: Option<ComplexityReport>,
    pub(crate) records: Vec<OutputRecord>,
    pub(crate) items_processed: usize,
    pub(crate) metadata_recoveries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_frame_bounds() {
        let config = PipelineConfig {
            skip_frames: 2,
            end_frame_index: Some(4),
            ..Default::default()
        };
        let s = RunState::new(&config);
        assert!(s.is_skipped(1));
        assert!(!s.is_skipped(2));
        assert!(!s.is_past_end(3));
        assert!(s.is_past_end(4));
        assert!(s.resolver.is_none());
    }

    #[test]
    fn test_decode_only_ignores_bounds() {
        let config = PipelineConfig {
            decode_only: true,
            skip_frames: 2,
            end_frame_index: Some(1),
            ..Default::default()
        };
        let s = RunState::new(&config);
        assert!(!s.is_skipped(0));
        assert!(!s.is_past_end(10));
        assert!(s.resolver.is_some());
    }

    #[test]
    fn test_finish_filters_direction_modules() {
        let mut s = RunState::new(&PipelineConfig::default());
        let enc: ModuleTimingMap = [(Module::FeatureReduction, ms(1)), (Module::NnPart1, ms(9))]
            .into_iter()
            .collect();
        let dec: ModuleTimingMap = [(Module::FeatureRestoration, ms(2))].into_iter().collect();
        s.merge_encode(&enc);
        s.merge_decode(&dec);
        let done = s.finish(ms(5));
        let encode = done.timings.encode_modules.unwrap();
        assert_eq!(encode.len(), 1);
        assert!(encode.contains(&Module::FeatureReduction));
        assert_eq!(done.timings.decode_modules.unwrap().len(), 1);
        assert!(done.complexity.is_none());
    }

    #[test]
    fn test_complexity_only_when_enabled() {
        let pair = Some(ComplexityPair::new(1.0, 1));
        let mut off = RunState::new(&PipelineConfig::default());
        off.charge_complexity(Module::NnPart1, pair);
        assert!(off.finish(ms(1)).complexity.is_none());

        let mut on = RunState::new(&PipelineConfig {
            mac_calculation: true,
            ..Default::default()
        });
        on.charge_complexity(Module::NnPart1, pair);
        on.charge_complexity(Module::NnPart2, None);
        let report = on.finish(ms(1)).complexity.unwrap();
        assert_eq!(report.module(Module::NnPart1), Some(1.0));
        assert_eq!(report.module(Module::NnPart2), None);
    }
}
