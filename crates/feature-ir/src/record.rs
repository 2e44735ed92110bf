// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-item output records.

use crate::{DatasetItem, ImageSize};
use std::collections::BTreeMap;
use std::fmt;

/// The codec's quantisation setting as reported in results.
///
/// Serialises as the bare number, or as the string `"uncmp"` when the codec
/// does not quantise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum QuantizationParameter {
    Value(i32),
    Uncompressed,
}

const UNCOMPRESSED_TAG: &str = "uncmp";

impl From<Option<i32>> for QuantizationParameter {
    fn from(qp: Option<i32>) -> Self {
        qp.map_or(QuantizationParameter::Uncompressed, QuantizationParameter::Value)
    }
}

impl From<QuantizationParameter> for serde_json::Value {
    fn from(qp: QuantizationParameter) -> Self {
        match qp {
            QuantizationParameter::Value(v) => serde_json::Value::from(v),
            QuantizationParameter::Uncompressed => serde_json::Value::from(UNCOMPRESSED_TAG),
        }
    }
}

impl TryFrom<serde_json::Value> for QuantizationParameter {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match &value {
            serde_json::Value::String(s) if s == UNCOMPRESSED_TAG => {
                Ok(QuantizationParameter::Uncompressed)
            }
            serde_json::Value::Number(n) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(QuantizationParameter::Value)
                .ok_or_else(|| format!("qp out of range: {n}")),
            other => Err(format!("expected integer qp or \"{UNCOMPRESSED_TAG}\", got {other}")),
        }
    }
}

impl fmt::Display for QuantizationParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizationParameter::Value(v) => write!(f, "{v}"),
            QuantizationParameter::Uncompressed => f.write_str(UNCOMPRESSED_TAG),
        }
    }
}

/// Result row for one processed item.
///
/// Built from exactly the fields it needs: the pixel payload, the declared
/// height/width and the image id never enter a record (the id is already
/// encoded in the bitstream name, the size in `org_input_size`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputRecord {
    pub file_name: String,
    /// Remaining dataset fields (ground truth and friends), minus
    /// [`RESERVED_FIELDS`](Self::RESERVED_FIELDS).
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub qp: QuantizationParameter,
    /// Bitstream size charged to this item.
    pub bytes: u64,
    /// 0-based position among processed items.
    pub coded_order: usize,
    pub org_input_size: ImageSize,
    /// First component of the size fed to stage 1.
    pub input_size: ImageSize,
}

impl OutputRecord {
    /// Field names owned by the record; dataset metadata under these names
    /// is not carried over.
    pub const RESERVED_FIELDS: [&'static str; 6] = [
        "file_name",
        "qp",
        "bytes",
        "coded_order",
        "org_input_size",
        "input_size",
    ];

    pub fn from_item(
        item: &DatasetItem,
        qp: QuantizationParameter,
        bytes: u64,
        coded_order: usize,
        input_size: ImageSize,
    ) -> Self {
        Self {
            file_name: item.file_name.clone(),
            metadata: item
                .metadata
                .iter()
                .filter(|(k, _)| !Self::RESERVED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            qp,
            bytes,
            coded_order,
            org_input_size: item.original_size(),
            input_size,
        }
    }

    /// Bits per pixel of the original image.
    pub fn bits_per_pixel(&self) -> f64 {
        let pixels = self.org_input_size.pixels();
        if pixels == 0 {
            return 0.0;
        }
        (self.bytes * 8) as f64 / pixels as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{DType, Shape, Tensor};

    fn item() -> DatasetItem {
        DatasetItem::from_image(7, "seven.png", Tensor::zeros(Shape::chw(3, 10, 20), DType::F32))
            .unwrap()
            .with_metadata("label", 1)
    }

    #[test]
    fn test_from_item_drops_payload_fields() {
        let rec = OutputRecord::from_item(
            &item(),
            QuantizationParameter::Value(3),
            25,
            0,
            ImageSize::new(8, 16),
        );
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["file_name"], "seven.png");
        assert_eq!(json["label"], 1);
        assert_eq!(json["qp"], 3);
        assert_eq!(json["org_input_size"], "10x20");
        assert_eq!(json["input_size"], "8x16");
        assert!(json.get("image").is_none());
        assert!(json.get("image_id").is_none());
        assert!(json.get("height").is_none());
    }

    #[test]
    fn test_bits_per_pixel() {
        let rec = OutputRecord::from_item(
            &item(),
            QuantizationParameter::Uncompressed,
            25,
            0,
            ImageSize::new(10, 20),
        );
        assert!((rec.bits_per_pixel() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_qp_serde() {
        let q: QuantizationParameter = Some(5).into();
        assert_eq!(serde_json::to_string(&q).unwrap(), "5");
        let u: QuantizationParameter = None.into();
        assert_eq!(serde_json::to_string(&u).unwrap(), "\"uncmp\"");
        let back: QuantizationParameter = serde_json::from_str("\"uncmp\"").unwrap();
        assert_eq!(back, QuantizationParameter::Uncompressed);
        assert!(serde_json::from_str::<QuantizationParameter>("\"lossless\"").is_err());
    }

    #[test]
    fn test_record_roundtrip() {
        let rec = OutputRecord::from_item(
            &item(),
            QuantizationParameter::Value(1),
            99,
            4,
            ImageSize::new(10, 20),
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: OutputRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_metadata_cannot_shadow_record_fields() {
        let item = item().with_metadata("bytes", 7).with_metadata("qp", "high");
        let rec = OutputRecord::from_item(&item, QuantizationParameter::Value(3), 100, 0, ImageSize::new(10, 20));
        assert!(!rec.metadata.contains_key("bytes"));
        assert!(!rec.metadata.contains_key("qp"));
        assert_eq!(rec.metadata["label"], 1);

        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json.matches("\"bytes\"").count(), 1);
        let back: OutputRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bytes, 100);
        assert_eq!(back, rec);
    }
}
