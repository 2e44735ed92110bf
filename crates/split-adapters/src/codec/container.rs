// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! On-disk layout of an uncompressed feature container.
//!
//! ```text
//! +-------+---------+------------+-------------+----------------------+
//! | magic | version | header_len |   header    |    tensor payloads   |
//! | VCMF  |  u16 LE |   u32 LE   | JSON bytes  | raw LE, header order |
//! +-------+---------+------------+-------------+----------------------+
//! ```
//!
//! The header lists every tensor with its dtype, dims and payload length,
//! and optionally the size metadata of the bundle.

use crate::AdapterError;
use feature_ir::{FeatureBundle, ImageSize};
use std::collections::BTreeMap;
use tensor_core::{DType, Shape, Tensor};

/// Identifies a feature container.
pub const FILE_MAGIC: &[u8; 4] = b"VCMF";
/// Current container version.
pub const FORMAT_VERSION: u16 = 1;

const PREAMBLE_LEN: usize = 4 + 2 + 4;

/// Describes one tensor payload in the container.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorEntry {
    pub name: String,
    pub dtype: DType,
    pub dims: Vec<usize>,
    pub byte_len: u64,
}

/// JSON header following the preamble.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerHeader {
    pub tensors: Vec<TensorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_input_size: Option<ImageSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_size: Option<Vec<ImageSize>>,
}

/// Serialises `bundle` into a container. Size metadata is written only
/// when `include_sizes` is set.
pub fn pack(bundle: &FeatureBundle, include_sizes: bool) -> Result<Vec<u8>, AdapterError> {
    let header = ContainerHeader {
        tensors: bundle
            .data
            .iter()
            .map(|(name, t)| TensorEntry {
                name: name.clone(),
                dtype: t.dtype(),
                dims: t.shape().dims().to_vec(),
                byte_len: t.size_bytes() as u64,
            })
            .collect(),
        org_input_size: bundle.org_input_size.filter(|_| include_sizes),
        input_size: bundle.input_size.clone().filter(|_| include_sizes),
    };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| AdapterError::Format(format!("header encode: {e}")))?;
    let header_len = u32::try_from(header_json.len())
        .map_err(|_| AdapterError::Format(format!("header too large: {} bytes", header_json.len())))?;

    let mut out = Vec::with_capacity(PREAMBLE_LEN + header_json.len() + bundle.total_bytes());
    out.extend_from_slice(FILE_MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_json);
    for t in bundle.data.values() {
        out.extend_from_slice(t.as_bytes());
    }
    Ok(out)
}

/// Parses a container back into a bundle.
pub fn unpack(bytes: &[u8]) -> Result<FeatureBundle, AdapterError> {
    let header = read_header(bytes)?;
    let mut offset = PREAMBLE_LEN + header_len(bytes)?;

    let mut data = BTreeMap::new();
    for entry in &header.tensors {
        let len = entry.byte_len as usize;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                AdapterError::Format(format!(
                    "tensor '{}' needs {len} bytes at offset {offset}, container has {}",
                    entry.name,
                    bytes.len()
                ))
            })?;
        let tensor = Tensor::from_bytes(
            Shape::new(entry.dims.clone()),
            entry.dtype,
            bytes[offset..end].to_vec(),
        )?;
        data.insert(entry.name.clone(), tensor);
        offset = end;
    }
    if offset != bytes.len() {
        return Err(AdapterError::Format(format!(
            "{} trailing bytes after last tensor",
            bytes.len() - offset
        )));
    }

    Ok(FeatureBundle {
        data,
        org_input_size: header.org_input_size,
        input_size: header.input_size,
    })
}

/// Parses only the header of a container.
pub fn read_header(bytes: &[u8]) -> Result<ContainerHeader, AdapterError> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(AdapterError::Format(format!(
            "container too short: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[..4] != FILE_MAGIC {
        return Err(AdapterError::Format("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(AdapterError::Format(format!(
            "unsupported container version {version}"
        )));
    }
    let len = header_len(bytes)?;
    let raw = bytes
        .get(PREAMBLE_LEN..PREAMBLE_LEN + len)
        .ok_or_else(|| AdapterError::Format(format!("header of {len} bytes is truncated")))?;
    serde_json::from_slice(raw).map_err(|e| AdapterError::Format(format!("header decode: {e}")))
}

fn header_len(bytes: &[u8]) -> Result<usize, AdapterError> {
    let raw: [u8; 4] = bytes
        .get(6..10)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| AdapterError::Format("missing header length".to_string()))?;
    Ok(u32::from_le_bytes(raw) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> FeatureBundle {
        let mut data = BTreeMap::new();
        data.insert(
            "p2".to_string(),
            Tensor::from_f32(Shape::chw(1, 2, 2), &[1.0, 2.0, 3.0, 4.0]).unwrap(),
        );
        data.insert(
            "p3".to_string(),
            Tensor::from_f32(Shape::chw(1, 1, 1), &[5.0]).unwrap().cast(DType::F16),
        );
        FeatureBundle::new(data)
            .with_org_input_size(ImageSize::new(10, 12))
            .with_input_size(vec![ImageSize::new(8, 8)])
    }

    #[test]
    fn test_pack_unpack_preserves_bundle() {
        let b = bundle();
        let bytes = pack(&b, true).unwrap();
        assert_eq!(&bytes[..4], FILE_MAGIC);
        assert_eq!(unpack(&bytes).unwrap(), b);
    }

    #[test]
    fn test_sizes_omitted_when_not_requested() {
        let bytes = pack(&bundle(), false).unwrap();
        let header = read_header(&bytes).unwrap();
        assert!(header.org_input_size.is_none());
        let back = unpack(&bytes).unwrap();
        assert!(!back.has_size_metadata());
        assert_eq!(back.data, bundle().data);
    }

    #[test]
    fn test_header_describes_tensors() {
        let header = read_header(&pack(&bundle(), true).unwrap()).unwrap();
        assert_eq!(header.tensors.len(), 2);
        assert_eq!(header.tensors[1].dtype, DType::F16);
        assert_eq!(header.tensors[1].byte_len, 2);
    }

    #[test]
    fn test_rejects_corrupt_input() {
        assert!(matches!(unpack(b"VCM"), Err(AdapterError::Format(_))));
        let mut bytes = pack(&bundle(), true).unwrap();
        bytes[0] = b'X';
        assert!(matches!(unpack(&bytes), Err(AdapterError::Format(_))));

        let mut truncated = pack(&bundle(), true).unwrap();
        truncated.pop();
        assert!(matches!(unpack(&truncated), Err(AdapterError::Format(_))));

        let mut trailing = pack(&bundle(), true).unwrap();
        trailing.push(0);
        assert!(matches!(unpack(&trailing), Err(AdapterError::Format(_))));
    }
}
