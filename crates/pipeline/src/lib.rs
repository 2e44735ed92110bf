// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pipeline
//!
//! The split-inference evaluation loop.
//!
//! For every dataset item the loop runs stage 1 of a split network, hands
//! the intermediate features to a codec that commits a bitstream to disk,
//! decodes the bitstream again, runs stage 2 on the recovered features and
//! feeds the prediction to an evaluator. Every step is timed and charged to
//! a named module, so codecs can be compared on rate, accuracy and latency
//! under one harness.
//!
//! Three modes are supported:
//! - **full**: the whole round trip per item.
//! - **encode-only**: stop after the bitstream is written.
//! - **decode-only**: skip stage 1 and compression, locate the bitstream
//!   written by an earlier encode-only run with [`BitstreamResolver`].
//!
//! # Type-State Pipeline
//! ```text
//! SplitInference<Unchecked> → SplitInference<Checked> → PipelineOutput
//! ```
//! A configuration cannot be run before it has been validated.

mod config;
mod error;
mod metrics;
mod pipeline;
mod progress;
mod resolver;
mod state;

pub use config::{PipelineConfig, RunMode};
pub use error::PipelineError;
pub use metrics::{ComplexityReport, TimingReport};
pub use pipeline::{Checked, PipelineOutput, PipelineState, SplitInference, Unchecked};
pub use resolver::{bitstream_prefix, BitstreamResolver};
