// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the split-inference pipeline.

use std::path::PathBuf;

/// Errors that can abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration is invalid. Raised before any item is processed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Decode-only: no committed bitstream matches the item's prefix.
    #[error("no bitstream matching '{prefix}*' in {}", .dir.display())]
    MissingBitstream { prefix: String, dir: PathBuf },

    /// Decode-only: more than one committed bitstream matches the prefix.
    #[error("{} bitstreams match '{prefix}*': {matches:?}", .matches.len())]
    AmbiguousBitstream { prefix: String, matches: Vec<PathBuf> },

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage, codec or evaluator failed.
    #[error(transparent)]
    Adapter(#[from] split_adapters::AdapterError),
}
