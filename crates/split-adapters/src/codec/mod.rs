// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`CodecAdapter`] trait and feature codec implementations.

pub mod container;
pub mod zstd;

use crate::AdapterError;
use feature_ir::{BitstreamHandle, FeatureBundle};
use module_accounting::{ComplexityPair, ModuleTimingMap};
use std::path::Path;

/// Result of compressing one bundle.
#[derive(Debug, Clone)]
pub struct CompressOutcome {
    /// Where the bitstream was committed.
    pub handle: BitstreamHandle,
    /// Time spent per encoder-side module.
    pub timings: ModuleTimingMap,
    /// Cost of the feature reduction step, if the codec measures it.
    pub complexity: Option<ComplexityPair>,
}

/// Result of decompressing one bitstream.
#[derive(Debug, Clone)]
pub struct DecompressOutcome {
    /// Recovered features. Size metadata may be absent.
    pub features: FeatureBundle,
    /// Time spent per decoder-side module.
    pub timings: ModuleTimingMap,
    /// Cost of the feature restoration step, if the codec measures it.
    pub complexity: Option<ComplexityPair>,
}

/// A feature codec: compresses bundles to bitstreams on disk and back.
///
/// Both calls must return only once their work is complete, since the
/// caller times them from the outside. A codec that cannot carry
/// `org_input_size` / `input_size` through the bitstream may return a
/// bundle without them.
pub trait CodecAdapter {
    /// Human-readable name of this codec.
    fn name(&self) -> &str;

    /// Quantisation parameter, `None` for codecs that do not quantise.
    fn qp(&self) -> Option<i32>;

    /// Tag describing how rate is evaluated (e.g. `"bpp"`).
    fn eval_encode_type(&self) -> &str;

    /// Compresses `bundle` and writes its bitstream under `output_dir`,
    /// named after `bitstream_name` and `file_prefix`.
    fn compress(
        &mut self,
        bundle: &FeatureBundle,
        output_dir: &Path,
        bitstream_name: &str,
        file_prefix: &str,
    ) -> Result<CompressOutcome, AdapterError>;

    /// Reads the bitstream at `handle` and recovers its features.
    fn decompress(
        &mut self,
        handle: &BitstreamHandle,
        output_dir: &Path,
        file_prefix: &str,
    ) -> Result<DecompressOutcome, AdapterError>;
}
