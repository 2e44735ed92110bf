// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Feature bundles: what crosses the codec boundary.

use crate::{ImageSize, IrError};
use std::collections::BTreeMap;
use tensor_core::{DType, Tensor};

/// Named feature tensors plus the size metadata stage 2 needs.
///
/// Produced by stage 1 and consumed by the codec on the encoder side,
/// recovered by the codec and consumed by stage 2 on the decoder side.
/// A bundle is transient: it never outlives one item's processing.
///
/// Size metadata is optional because some codecs (anchor codecs) do not
/// carry it through decompression; the pipeline reconstructs it from the
/// dataset item in that case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBundle {
    /// Feature tensors keyed by name (e.g. `"p2"`, `"p3"`).
    pub data: BTreeMap<String, Tensor>,
    /// Pre-resize size of the source item.
    pub org_input_size: Option<ImageSize>,
    /// Size actually fed to stage 1, one entry per input copy.
    pub input_size: Option<Vec<ImageSize>>,
}

impl FeatureBundle {
    /// Creates a bundle without size metadata.
    pub fn new(data: BTreeMap<String, Tensor>) -> Self {
        Self {
            data,
            org_input_size: None,
            input_size: None,
        }
    }

    /// Attaches the fed input sizes (builder style).
    pub fn with_input_size(mut self, sizes: Vec<ImageSize>) -> Self {
        self.input_size = Some(sizes);
        self
    }

    /// Attaches the original item size (builder style).
    pub fn with_org_input_size(mut self, size: ImageSize) -> Self {
        self.org_input_size = Some(size);
        self
    }

    /// Casts every tensor to `dtype` in place.
    pub fn cast_all(&mut self, dtype: DType) {
        let data = std::mem::take(&mut self.data);
        self.data = data
            .into_iter()
            .map(|(k, t)| (k, t.into_dtype(dtype)))
            .collect();
    }

    /// `true` when both size fields are present.
    pub fn has_size_metadata(&self) -> bool {
        self.org_input_size.is_some() && self.input_size.is_some()
    }

    /// Sum of all tensor buffer sizes in bytes.
    pub fn total_bytes(&self) -> usize {
        self.data.values().map(Tensor::size_bytes).sum()
    }

    /// Sum of element counts over all tensors.
    pub fn total_elements(&self) -> usize {
        self.data.values().map(Tensor::num_elements).sum()
    }

    /// Looks up a tensor by key.
    pub fn tensor(&self, key: &str) -> Result<&Tensor, IrError> {
        self.data.get(key).ok_or_else(|| IrError::MissingFeature {
            key: key.to_string(),
            available: self.data.keys().cloned().collect(),
        })
    }

    /// First entry of `input_size`, if any.
    pub fn primary_input_size(&self) -> Option<ImageSize> {
        self.input_size.as_ref().and_then(|s| s.first().copied())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
