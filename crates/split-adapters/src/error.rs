// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for adapters.

use std::path::PathBuf;

/// Errors raised by stage, codec and evaluation adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A network half failed on an item or bundle.
    #[error("stage '{stage}' failed: {detail}")]
    Stage { stage: String, detail: String },

    /// The feature codec failed to compress or decompress.
    #[error("codec '{codec}' failed: {detail}")]
    Codec { codec: String, detail: String },

    /// The evaluator rejected a prediction or could not produce metrics.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bitstream container could not be parsed.
    #[error("malformed bitstream: {0}")]
    Format(String),

    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    #[error(transparent)]
    Ir(#[from] feature_ir::IrError),
}

impl AdapterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AdapterError::Io {
            path: path.into(),
            source,
        }
    }
}
