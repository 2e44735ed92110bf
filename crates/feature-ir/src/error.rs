// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the split-inference data model.

/// Errors raised while building or querying data-model values.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// An image size string or value is malformed.
    #[error("invalid image size '{0}': expected HEIGHTxWIDTH with non-zero sides")]
    InvalidSize(String),

    /// A feature tensor was requested but is not part of the bundle.
    #[error("feature '{key}' not found in bundle (available: {available:?})")]
    MissingFeature { key: String, available: Vec<String> },

    /// A dataset item is inconsistent with its pixel payload.
    #[error("invalid dataset item {image_id}: {detail}")]
    InvalidItem { image_id: u64, detail: String },

    /// A tensor operation failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),
}
