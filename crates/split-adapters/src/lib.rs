// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # split-adapters
//!
//! The three collaborator contracts the split-inference loop is written
//! against, and one reference implementation of each:
//!
//! | Contract | Reference implementation |
//! |---|---|
//! | [`StageAdapter`] (network halves) | [`PoolingStage`] |
//! | [`CodecAdapter`] (feature codec) | [`ZstdFeatureCodec`] |
//! | [`EvaluationSink`] (task metrics) | [`TopOneAccuracy`] |
//!
//! The reference implementations are deliberately small. They exist so the
//! harness can be driven end to end without a neural network or a video
//! codec on the machine.

pub mod codec;
pub mod error;
pub mod evaluation;
pub mod stage;

pub use codec::zstd::ZstdFeatureCodec;
pub use codec::{CodecAdapter, CompressOutcome, DecompressOutcome};
pub use error::AdapterError;
pub use evaluation::accuracy::TopOneAccuracy;
pub use evaluation::{EvalMetrics, EvaluationSink};
pub use stage::pooling::{Classification, PoolingStage};
pub use stage::StageAdapter;
