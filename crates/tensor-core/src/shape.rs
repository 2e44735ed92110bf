// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor dimensions.

use crate::DType;
use std::fmt;

/// Dimensions of a [`crate::Tensor`], outermost first.
///
/// Images and feature maps are `[C, H, W]`; score vectors are rank 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![8, 4, 4]);
    /// assert_eq!(s.num_elements(), 128);
    /// assert_eq!(s.as_chw(), Some((8, 4, 4)));
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// `[channels, height, width]`.
    pub fn chw(channels: usize, height: usize, width: usize) -> Self {
        Self {
            dims: vec![channels, height, width],
        }
    }

    /// Element count; `1` for rank 0.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Bytes needed to hold this shape at `dtype`.
    pub fn size_bytes(&self, dtype: DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Splits a rank-3 shape into `(channels, height, width)`.
    pub fn as_chw(&self) -> Option<(usize, usize, usize)> {
        match self.dims.as_slice() {
            &[c, h, w] => Some((c, h, w)),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "[{}]", dims.join("x"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_zero_has_one_element() {
        assert_eq!(Shape::new(vec![]).num_elements(), 1);
        assert_eq!(Shape::new(vec![]).as_chw(), None);
    }

    #[test]
    fn test_chw_split() {
        let s = Shape::chw(3, 4, 5);
        assert_eq!(s.as_chw(), Some((3, 4, 5)));
        assert_eq!(Shape::vector(4).as_chw(), None);
    }

    #[test]
    fn test_display_and_serde() {
        let s = Shape::chw(64, 8, 12);
        assert_eq!(s.to_string(), "[64x8x12]");
        assert_eq!(serde_json::to_string(&s).unwrap(), "[64,8,12]");
    }

    #[test]
    fn test_size_bytes_follows_precision() {
        let s = Shape::chw(2, 10, 10);
        assert_eq!(s.size_bytes(DType::F32), 800);
        assert_eq!(s.size_bytes(DType::F16), 400);
        assert_eq!(s.size_bytes(DType::I8), 200);
    }
}
