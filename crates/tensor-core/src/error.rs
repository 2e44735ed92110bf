// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use crate::Shape;

/// Errors raised while building tensors or naming precisions.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// A raw buffer does not hold exactly one element per position at the given precision.
    #[error("buffer of {actual} bytes does not fit {shape} at {expected} bytes")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// A value slice has the wrong number of elements for its shape.
    #[error("{actual} values given for shape {shape}")]
    ElementCountMismatch { shape: Shape, actual: usize },

    #[error("unknown datatype '{0}'; expected float32, float16, bfloat16 or int8")]
    UnknownDType(String),
}
