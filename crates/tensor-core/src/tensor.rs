// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::{DType, Shape, TensorError};
use half::{bf16, f16};

/// An owned, n-dimensional tensor stored in contiguous memory.
///
/// `Tensor` is the data carrier between the two network stages and the
/// codec: images, feature maps and score vectors all travel as tensors.
///
/// # Memory Layout
/// Data is stored in row-major (C) order as a flat little-endian byte
/// buffer in the tensor's own precision. Element access always goes
/// through an explicit decode ([`Tensor::to_f32_vec`]), so the buffer never
/// needs to be aligned for the element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::chw(1, 2, 3), DType::F32);
    /// assert_eq!(t.size_bytes(), 24);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            shape,
            dtype,
            data: vec![0u8; size],
        }
    }

    /// Creates a tensor from raw little-endian bytes.
    ///
    /// Returns an error if the buffer size does not match `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape.size_bytes(dtype);
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, dtype, data })
    }

    /// Creates an `f32` tensor from a slice of values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_f32_vec(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        if values.len() != shape.num_elements() {
            return Err(TensorError::ElementCountMismatch {
                shape,
                actual: values.len(),
            });
        }
        Ok(Self {
            data: encode(values, DType::F32),
            shape,
            dtype: DType::F32,
        })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the raw byte slice backing this tensor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Decodes every element to `f32`, whatever the storage precision.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        let width = self.dtype.size_bytes();
        let chunks = self.data.chunks_exact(width);
        match self.dtype {
            DType::F32 => chunks
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            DType::F16 => chunks
                .map(|c| f16::from_le_bytes([c[0], c[1]]).to_f32())
                .collect(),
            DType::BF16 => chunks
                .map(|c| bf16::from_le_bytes([c[0], c[1]]).to_f32())
                .collect(),
            DType::I8 => chunks.map(|c| c[0] as i8 as f32).collect(),
        }
    }

    /// Returns a copy of this tensor converted to `dtype`.
    ///
    /// Float-to-float casts round to nearest; casts to `I8` round and
    /// saturate to `[-128, 127]`.
    pub fn cast(&self, dtype: DType) -> Tensor {
        if dtype == self.dtype {
            return self.clone();
        }
        Tensor {
            shape: self.shape.clone(),
            dtype,
            data: encode(&self.to_f32_vec(), dtype),
        }
    }

    /// Consuming variant of [`Tensor::cast`] that avoids a copy when the
    /// precision already matches.
    pub fn into_dtype(self, dtype: DType) -> Tensor {
        if dtype == self.dtype {
            self
        } else {
            self.cast(dtype)
        }
    }

    /// Arithmetic mean of all elements, `0.0` for an empty tensor.
    pub fn mean(&self) -> f32 {
        let values = self.to_f32_vec();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Encodes `f32` values into little-endian bytes of the target precision.
fn encode(values: &[f32], dtype: DType) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * dtype.size_bytes());
    match dtype {
        DType::F32 => values
            .iter()
            .for_each(|v| out.extend_from_slice(&v.to_le_bytes())),
        DType::F16 => values
            .iter()
            .for_each(|v| out.extend_from_slice(&f16::from_f32(*v).to_le_bytes())),
        DType::BF16 => values
            .iter()
            .for_each(|v| out.extend_from_slice(&bf16::from_f32(*v).to_le_bytes())),
        DType::I8 => values
            .iter()
            .for_each(|v| out.push(v.round().clamp(-128.0, 127.0) as i8 as u8)),
    }
    out
}
