// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # feature-ir
//!
//! The data model shared by every stage of a split-inference evaluation:
//!
//! - [`DatasetItem`]: one sample read from the dataset, with its declared
//!   size and task-specific ground truth.
//! - [`FeatureBundle`]: the named feature tensors that cross the codec
//!   boundary, plus the size metadata stage 2 needs.
//! - [`BitstreamHandle`]: where a compressed bundle lives on disk.
//! - [`OutputRecord`]: the per-item result row of a run.
//!
//! ```text
//! DatasetItem ──part 1──► FeatureBundle ──compress──► BitstreamHandle
//!                                                          │
//!        OutputRecord ◄──part 2── FeatureBundle ◄──decompress
//! ```

mod bitstream;
mod error;
mod features;
mod item;
mod record;

pub use bitstream::{BitstreamFile, BitstreamHandle};
pub use error::IrError;
pub use features::FeatureBundle;
pub use item::{DatasetItem, ImageSize};
pub use record::{OutputRecord, QuantizationParameter};
