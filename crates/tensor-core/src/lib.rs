// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensors exchanged between the two halves of a split network.
//!
//! A [`Tensor`] is a shape, a [`DType`] and a little-endian byte buffer.
//! Images enter stage 1 as `f32`; feature maps are cast with
//! [`Tensor::cast`] to the run's configured precision before a codec sees
//! them, and decoded back to `f32` before stage 2.

mod dtype;
mod error;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use shape::Shape;
pub use tensor::Tensor;
