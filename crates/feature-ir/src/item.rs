// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dataset samples and image sizes.

use crate::IrError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tensor_core::Tensor;

/// A `height × width` pair.
///
/// Serialises as the string `"HxW"` (e.g. `"480x640"`), which is the
/// format result files use for input sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Number of pixels covered by this size.
    pub fn pixels(&self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

impl FromStr for ImageSize {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IrError::InvalidSize(s.to_string());
        let (h, w) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        if height == 0 || width == 0 {
            return Err(invalid());
        }
        Ok(Self { height, width })
    }
}

impl TryFrom<String> for ImageSize {
    type Error = IrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImageSize> for String {
    fn from(size: ImageSize) -> Self {
        size.to_string()
    }
}

/// One sample drawn from the dataset.
///
/// Items are immutable once read: the dataset owns them and the pipeline
/// borrows each one for the duration of a single iteration.
#[derive(Debug, Clone)]
pub struct DatasetItem {
    /// Unique key; bitstream file names are derived from it.
    pub image_id: u64,
    /// Source file name, carried through to output records.
    pub file_name: String,
    /// Declared (pre-resize) height of the source image.
    pub height: u32,
    /// Declared (pre-resize) width of the source image.
    pub width: u32,
    /// Raw pixel payload, channel-first.
    pub image: Tensor,
    /// Ground truth and any further dataset fields.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DatasetItem {
    /// Creates an item whose declared size is taken from a `[C, H, W]` image.
    pub fn from_image(image_id: u64, file_name: impl Into<String>, image: Tensor) -> Result<Self, IrError> {
        let (_, h, w) = image.shape().as_chw().ok_or_else(|| IrError::InvalidItem {
            image_id,
            detail: format!("image must be [C, H, W], got {}", image.shape()),
        })?;
        Ok(Self {
            image_id,
            file_name: file_name.into(),
            height: h as u32,
            width: w as u32,
            image,
            metadata: BTreeMap::new(),
        })
    }

    /// Adds a metadata field (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Per-item naming prefix used for bitstream files.
    pub fn file_prefix(&self) -> String {
        format!("img_id_{}", self.image_id)
    }

    /// The declared size of the source image.
    pub fn original_size(&self) -> ImageSize {
        ImageSize::new(self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{DType, Shape};

    #[test]
    fn test_size_display_and_parse() {
        let s = ImageSize::new(480, 640);
        assert_eq!(s.to_string(), "480x640");
        assert_eq!("480x640".parse::<ImageSize>().unwrap(), s);
        assert_eq!(s.pixels(), 307_200);
    }

    #[test]
    fn test_size_rejects_garbage() {
        assert!("480".parse::<ImageSize>().is_err());
        assert!("0x640".parse::<ImageSize>().is_err());
        assert!("axb".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_size_serde_as_string() {
        let json = serde_json::to_string(&ImageSize::new(2, 3)).unwrap();
        assert_eq!(json, "\"2x3\"");
        let back: ImageSize = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ImageSize::new(2, 3));
    }

    #[test]
    fn test_item_from_image() {
        let img = Tensor::zeros(Shape::chw(3, 8, 12), DType::F32);
        let item = DatasetItem::from_image(42, "a.jpg", img)
            .unwrap()
            .with_metadata("label", 2);
        assert_eq!(item.file_prefix(), "img_id_42");
        assert_eq!(item.original_size(), ImageSize::new(8, 12));
        assert_eq!(item.metadata["label"], serde_json::json!(2));
    }

    #[test]
    fn test_item_rejects_non_chw() {
        let img = Tensor::zeros(Shape::vector(4), DType::F32);
        assert!(DatasetItem::from_image(1, "x", img).is_err());
    }
}
