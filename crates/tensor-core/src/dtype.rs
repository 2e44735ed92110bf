// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;
use std::str::FromStr;

use crate::TensorError;

/// Enumerates the numeric precisions a [`crate::Tensor`] can hold.
///
/// The pipeline casts every feature tensor to a configured `DType` before
/// handing it to a codec, so this is also the unit of the `datatype`
/// configuration option. Both short (`"f16"`) and framework-style
/// (`"float16"`) spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    #[serde(alias = "float32", alias = "float")]
    F32,
    /// 16-bit IEEE 754 floating point.
    #[serde(alias = "float16", alias = "half")]
    F16,
    /// 16-bit brain floating point.
    #[serde(alias = "bfloat16")]
    BF16,
    /// 8-bit signed integer (rounded and saturated on cast).
    #[serde(alias = "int8")]
    I8,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::I8 => 1,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::I8 => "i8",
        }
    }
}

impl FromStr for DType {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "f32" | "float32" | "float" => Ok(DType::F32),
            "f16" | "float16" | "half" => Ok(DType::F16),
            "bf16" | "bfloat16" => Ok(DType::BF16),
            "i8" | "int8" => Ok(DType::I8),
            other => Err(TensorError::UnknownDType(other.to_string())),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("F16".parse::<DType>().unwrap(), DType::F16);
        assert_eq!("bfloat16".parse::<DType>().unwrap(), DType::BF16);
        assert_eq!("int8".parse::<DType>().unwrap(), DType::I8);
        assert!("float64".parse::<DType>().is_err());
    }

    #[test]
    fn test_serde_alias() {
        let dt: DType = serde_json::from_str("\"float16\"").unwrap();
        assert_eq!(dt, DType::F16);
        assert_eq!(serde_json::to_string(&DType::BF16).unwrap(), "\"bf16\"");
    }
}
