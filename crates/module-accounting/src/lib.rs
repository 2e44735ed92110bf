// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # module-accounting
//!
//! Pure bookkeeping for split-inference runs: how much wall time and how
//! much compute each named pipeline module consumed, summed over items.
//!
//! # Key Components
//!
//! - [`Module`]: the fixed module vocabulary (`nn_part_1`,
//!   `feature_reduction`, `inner_codec`, `conversion`,
//!   `feature_restoration`, `nn_part_2`).
//! - [`Stage`]: the four coarse stages the pipeline times directly.
//! - [`ModuleMap`]: a key-wise summing map. `merge` is commutative and
//!   associative, and never invents keys that neither side had.
//! - [`ComplexityPair`]: accumulated (kMAC, pixel) counts, from which
//!   kMAC/pixel is derived at the end of a run.
//!
//! # Example
//! ```
//! use module_accounting::{Module, ModuleTimingMap};
//! use std::time::Duration;
//!
//! let mut a = ModuleTimingMap::new();
//! a.add(Module::InnerCodec, Duration::from_millis(4));
//! let mut b = ModuleTimingMap::new();
//! b.add(Module::InnerCodec, Duration::from_millis(6));
//! b.add(Module::Conversion, Duration::from_millis(1));
//!
//! let total = a.merge(&b);
//! assert_eq!(total.get(&Module::InnerCodec), Some(&Duration::from_millis(10)));
//! assert_eq!(total.len(), 2);
//! ```

mod complexity;
mod map;
mod module;

pub use complexity::{ComplexityPair, ModuleComplexityMap};
pub use map::{ModuleMap, ModuleTimingMap, StageTimingMap};
pub use module::{Module, Stage, DECODE_MODULES, ENCODE_MODULES};
