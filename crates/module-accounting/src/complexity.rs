// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Computational-complexity accounting.
//!
//! Complexity is collected as raw (kMAC, pixel) totals per module and only
//! turned into kMAC/pixel once the run is over, so that images of different
//! sizes are weighted by their pixel count.

use crate::{Module, ModuleMap};
use std::collections::BTreeMap;
use std::ops::Add;

/// Accumulated compute cost and the number of pixels it was spent on.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComplexityPair {
    /// Thousands of multiply-accumulate operations.
    pub kmacs: f64,
    /// Pixels processed.
    pub pixels: u64,
}

impl ComplexityPair {
    pub fn new(kmacs: f64, pixels: u64) -> Self {
        Self { kmacs, pixels }
    }

    /// kMAC per pixel, `0.0` when no pixels were recorded.
    pub fn kmacs_per_pixel(&self) -> f64 {
        if self.pixels == 0 {
            return 0.0;
        }
        self.kmacs / self.pixels as f64
    }

    pub fn is_zero(&self) -> bool {
        self.kmacs == 0.0 && self.pixels == 0
    }
}

impl Add for ComplexityPair {
    type Output = ComplexityPair;

    fn add(self, rhs: Self) -> Self::Output {
        ComplexityPair {
            kmacs: self.kmacs + rhs.kmacs,
            pixels: self.pixels + rhs.pixels,
        }
    }
}

/// Accumulated complexity per module.
pub type ModuleComplexityMap = ModuleMap<Module, ComplexityPair>;

impl ModuleMap<Module, ComplexityPair> {
    /// Derives kMAC/pixel for every module with recorded complexity.
    pub fn kmacs_per_pixel(&self) -> BTreeMap<Module, f64> {
        self.iter()
            .map(|(m, pair)| (m, pair.kmacs_per_pixel()))
            .collect()
    }

    /// Returns a human-readable summary, e.g. `"nn_part_1 12.50 kMAC/px"`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        self.iter()
            .map(|(m, pair)| format!("{m} {:.2} kMAC/px", pair.kmacs_per_pixel()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmacs_per_pixel() {
        let p = ComplexityPair::new(500.0, 100);
        assert!((p.kmacs_per_pixel() - 5.0).abs() < 1e-12);
        assert_eq!(ComplexityPair::default().kmacs_per_pixel(), 0.0);
        assert!(ComplexityPair::default().is_zero());
    }

    #[test]
    fn test_accumulate_is_pixel_weighted() {
        let mut m = ModuleComplexityMap::new();
        // 100 px at 1 kMAC/px and 300 px at 3 kMAC/px.
        m.add(Module::NnPart1, ComplexityPair::new(100.0, 100));
        m.add(Module::NnPart1, ComplexityPair::new(900.0, 300));
        let derived = m.kmacs_per_pixel();
        assert!((derived[&Module::NnPart1] - 2.5).abs() < 1e-12);
        assert!(!derived.contains_key(&Module::NnPart2));
    }

    #[test]
    fn test_summary() {
        let mut m = ModuleComplexityMap::new();
        m.add(Module::FeatureReduction, ComplexityPair::new(25.0, 10));
        assert_eq!(m.summary(), "feature_reduction 2.50 kMAC/px");
        assert_eq!(ModuleComplexityMap::new().summary(), "none");
    }
}
