// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Run-level timing and complexity reports.
//!
//! [`TimingReport`] carries the four coarse stage timings measured by the
//! pipeline and the per-module breakdown reported by the codec for each
//! direction that actually ran. These are the primary numbers for comparing
//! codecs on latency.

use module_accounting::{Module, ModuleComplexityMap, ModuleTimingMap, StageTimingMap};
use std::collections::BTreeMap;
use std::time::Duration;

/// Accumulated wall time of one run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TimingReport {
    /// Time per coarse stage, summed over items.
    pub stages: StageTimingMap,
    /// Encoder modules; `None` when no compression ran (decode-only).
    pub encode_modules: Option<ModuleTimingMap>,
    /// Decoder modules; `None` when no decompression ran (encode-only).
    pub decode_modules: Option<ModuleTimingMap>,
    /// Wall-clock time of the whole loop.
    pub wall: Duration,
}

impl TimingReport {
    /// Time charged to `stage`, zero if it never ran.
    pub fn stage(&self, stage: module_accounting::Stage) -> Duration {
        self.stages.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    /// All timings in seconds, keyed `stage`, `encode.<module>` and
    /// `decode.<module>`.
    pub fn as_seconds(&self) -> BTreeMap<String, f64> {
        let mut out = self.stages.as_seconds();
        for (direction, modules) in [("encode", &self.encode_modules), ("decode", &self.decode_modules)] {
            if let Some(modules) = modules {
                for (m, secs) in modules.as_seconds() {
                    out.insert(format!("{direction}.{m}"), secs);
                }
            }
        }
        out
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let direction = |m: &Option<ModuleTimingMap>| match m {
            Some(m) => m.summary(),
            None => "skipped".to_string(),
        };
        format!(
            "Timing: {:.2}ms wall; stages [{}]; encode [{}]; decode [{}]",
            self.wall.as_secs_f64() * 1000.0,
            self.stages.summary(),
            direction(&self.encode_modules),
            direction(&self.decode_modules),
        )
    }
}

/// Computational complexity of one run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ComplexityReport {
    /// Raw kMAC and pixel totals per module.
    pub totals: ModuleComplexityMap,
    /// Derived kMAC/pixel per module.
    pub kmacs_per_pixel: BTreeMap<Module, f64>,
}

impl ComplexityReport {
    pub fn from_totals(totals: ModuleComplexityMap) -> Self {
        let kmacs_per_pixel = totals.kmacs_per_pixel();
        Self {
            totals,
            kmacs_per_pixel,
        }
    }

    /// kMAC/pixel of `module`, if it was probed.
    pub fn module(&self, module: Module) -> Option<f64> {
        self.kmacs_per_pixel.get(&module).copied()
    }

    pub fn summary(&self) -> String {
        format!("Complexity: {}", self.totals.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use module_accounting::{ComplexityPair, Stage};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_summary_marks_skipped_directions() {
        let mut stages = StageTimingMap::new();
        stages.add(Stage::Decode, ms(4));
        let report = TimingReport {
            stages,
            encode_modules: None,
            decode_modules: Some([(Module::InnerCodec, ms(3))].into_iter().collect()),
            wall: ms(10),
        };
        let s = report.summary();
        assert!(s.contains("10.00ms wall"));
        assert!(s.contains("encode [skipped]"));
        assert!(s.contains("decode [inner_codec 3.00ms]"));
        assert_eq!(report.stage(Stage::Decode), ms(4));
        assert_eq!(report.stage(Stage::Encode), Duration::ZERO);
    }

    #[test]
    fn test_as_seconds_flattens_directions() {
        let report = TimingReport {
            stages: [(Stage::NnPart1, ms(1))].into_iter().collect(),
            encode_modules: Some([(Module::Conversion, ms(2))].into_iter().collect()),
            decode_modules: None,
            wall: ms(3),
        };
        let secs = report.as_seconds();
        assert_eq!(secs["nn_part_1"], 0.001);
        assert_eq!(secs["encode.conversion"], 0.002);
        assert_eq!(secs.len(), 2);
    }

    #[test]
    fn test_complexity_report() {
        let mut totals = ModuleComplexityMap::new();
        totals.add(Module::NnPart2, ComplexityPair::new(40.0, 20));
        let r = ComplexityReport::from_totals(totals);
        assert_eq!(r.module(Module::NnPart2), Some(2.0));
        assert_eq!(r.module(Module::NnPart1), None);
        assert!(r.summary().contains("nn_part_2 2.00 kMAC/px"));
    }
}
