// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Zstandard feature codec.
//!
//! Encoder side, one timed module per step:
//!
//! 1. `feature_reduction`: cast every tensor to the reduced precision.
//! 2. `conversion`: pack the bundle into a [`container`](super::container).
//! 3. `inner_codec`: zstd-compress the container and commit it to
//!    `{output_dir}/{bitstream_name}-{file_prefix}.bin`.
//!
//! The decoder runs `inner_codec`, `conversion` and `feature_restoration`
//! (back to f32) in that order.
//!
//! The bitstream is first written under a `_tmp` name and renamed once
//! complete, so a reader listing the directory never sees a partial file.

use crate::codec::{container, CodecAdapter, CompressOutcome, DecompressOutcome};
use crate::AdapterError;
use feature_ir::{BitstreamFile, BitstreamHandle, FeatureBundle};
use module_accounting::{ComplexityPair, Module, ModuleTimingMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tensor_core::DType;
use tracing::debug;

/// Extension of committed bitstreams.
pub const BITSTREAM_EXTENSION: &str = "bin";

/// Feature codec built on zstd; the zstd level doubles as the qp.
#[derive(Debug, Clone)]
pub struct ZstdFeatureCodec {
    level: i32,
    reduced_dtype: DType,
    preserve_size_metadata: bool,
}

impl ZstdFeatureCodec {
    pub const NAME: &'static str = "zstd";

    /// Creates a codec compressing at `level`, reducing features to f16 and
    /// carrying size metadata through the bitstream.
    pub fn new(level: i32) -> Result<Self, AdapterError> {
        let range = ::zstd::compression_level_range();
        if !range.contains(&level) {
            return Err(AdapterError::Codec {
                codec: Self::NAME.to_string(),
                detail: format!(
                    "level {level} outside supported range {}..={}",
                    range.start(),
                    range.end()
                ),
            });
        }
        Ok(Self {
            level,
            reduced_dtype: DType::F16,
            preserve_size_metadata: true,
        })
    }

    /// Sets the precision features are reduced to before packing.
    pub fn with_reduced_dtype(mut self, dtype: DType) -> Self {
        self.reduced_dtype = dtype;
        self
    }

    /// Anchor mode: size metadata is dropped from the bitstream and must be
    /// reconstructed by the caller after decompression.
    pub fn anchor(mut self) -> Self {
        self.preserve_size_metadata = false;
        self
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn reduced_dtype(&self) -> DType {
        self.reduced_dtype
    }

    pub fn preserves_size_metadata(&self) -> bool {
        self.preserve_size_metadata
    }

    /// Path of the committed bitstream for an item.
    pub fn bitstream_path(output_dir: &Path, bitstream_name: &str, file_prefix: &str) -> PathBuf {
        output_dir.join(format!("{bitstream_name}-{file_prefix}.{BITSTREAM_EXTENSION}"))
    }

    /// Reads the container header of a committed bitstream without
    /// restoring its tensors.
    pub fn read_header(path: &Path) -> Result<container::ContainerHeader, AdapterError> {
        let compressed = std::fs::read(path).map_err(|e| AdapterError::io(path, e))?;
        container::read_header(&Self::decode(&compressed)?)
    }

    fn codec_error(detail: impl Into<String>) -> AdapterError {
        AdapterError::Codec {
            codec: Self::NAME.to_string(),
            detail: detail.into(),
        }
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, AdapterError> {
        let mut out = Vec::new();
        let mut encoder = ::zstd::stream::Encoder::new(&mut out, self.level)
            .map_err(|e| Self::codec_error(e.to_string()))?;
        encoder
            .write_all(input)
            .map_err(|e| Self::codec_error(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| Self::codec_error(e.to_string()))?;
        Ok(out)
    }

    fn decode(input: &[u8]) -> Result<Vec<u8>, AdapterError> {
        let mut out = Vec::new();
        let mut decoder =
            ::zstd::stream::Decoder::new(input).map_err(|e| Self::codec_error(e.to_string()))?;
        std::io::copy(&mut decoder, &mut out).map_err(|e| Self::codec_error(e.to_string()))?;
        Ok(out)
    }

    /// Writes `bytes` to `path` through a `_tmp` sibling.
    fn commit(path: &Path, bytes: &[u8]) -> Result<(), AdapterError> {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let tmp = path.with_file_name(format!("{stem}_tmp.{BITSTREAM_EXTENSION}"));
        std::fs::write(&tmp, bytes).map_err(|e| AdapterError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| AdapterError::io(path, e))
    }

    fn cost(bundle: &FeatureBundle) -> ComplexityPair {
        let pixels = bundle
            .org_input_size
            .or_else(|| bundle.primary_input_size())
            .map(|s| s.pixels())
            .unwrap_or(0);
        ComplexityPair::new(bundle.total_elements() as f64 / 1000.0, pixels)
    }
}

impl CodecAdapter for ZstdFeatureCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn qp(&self) -> Option<i32> {
        Some(self.level)
    }

    fn eval_encode_type(&self) -> &str {
        "bpp"
    }

    fn compress(
        &mut self,
        bundle: &FeatureBundle,
        output_dir: &Path,
        bitstream_name: &str,
        file_prefix: &str,
    ) -> Result<CompressOutcome, AdapterError> {
        let mut timings = ModuleTimingMap::new();

        let start = Instant::now();
        let mut reduced = bundle.clone();
        reduced.cast_all(self.reduced_dtype);
        timings.add(Module::FeatureReduction, start.elapsed());

        let start = Instant::now();
        let packed = container::pack(&reduced, self.preserve_size_metadata)?;
        timings.add(Module::Conversion, start.elapsed());

        let start = Instant::now();
        let compressed = self.encode(&packed)?;
        std::fs::create_dir_all(output_dir).map_err(|e| AdapterError::io(output_dir, e))?;
        let path = Self::bitstream_path(output_dir, bitstream_name, file_prefix);
        Self::commit(&path, &compressed)?;
        timings.add(Module::InnerCodec, start.elapsed());

        debug!(
            path = %path.display(),
            raw_bytes = packed.len(),
            compressed_bytes = compressed.len(),
            "bitstream committed"
        );

        Ok(CompressOutcome {
            handle: BitstreamFile::new(path, compressed.len() as u64).into(),
            timings,
            complexity: Some(Self::cost(bundle)),
        })
    }

    fn decompress(
        &mut self,
        handle: &BitstreamHandle,
        _output_dir: &Path,
        file_prefix: &str,
    ) -> Result<DecompressOutcome, AdapterError> {
        let path = handle
            .primary_path()
            .ok_or_else(|| Self::codec_error(format!("no bitstream file for {file_prefix}")))?;
        let mut timings = ModuleTimingMap::new();

        let start = Instant::now();
        let compressed = std::fs::read(path).map_err(|e| AdapterError::io(path, e))?;
        let packed = Self::decode(&compressed)?;
        timings.add(Module::InnerCodec, start.elapsed());

        let start = Instant::now();
        let mut features = container::unpack(&packed)?;
        timings.add(Module::Conversion, start.elapsed());

        let start = Instant::now();
        features.cast_all(DType::F32);
        timings.add(Module::FeatureRestoration, start.elapsed());

        let complexity = Some(Self::cost(&features));
        Ok(DecompressOutcome {
            features,
            timings,
            complexity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_ir::ImageSize;
    use module_accounting::{DECODE_MODULES, ENCODE_MODULES};
    use std::collections::BTreeMap;
    use tensor_core::{Shape, Tensor};

    fn bundle() -> FeatureBundle {
        let values: Vec<f32> = (0..64).map(|v| v as f32 * 0.25).collect();
        let mut data = BTreeMap::new();
        data.insert("p2".to_string(), Tensor::from_f32(Shape::chw(4, 4, 4), &values).unwrap());
        FeatureBundle::new(data)
            .with_org_input_size(ImageSize::new(16, 16))
            .with_input_size(vec![ImageSize::new(16, 16)])
    }

    #[test]
    fn test_rejects_out_of_range_level() {
        assert!(ZstdFeatureCodec::new(1000).is_err());
        assert!(ZstdFeatureCodec::new(3).is_ok());
    }

    #[test]
    fn test_roundtrip_preserves_sizes_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(3).unwrap();
        let b = bundle();

        let enc = codec.compress(&b, dir.path(), "run", "img_id_1").unwrap();
        let path = dir.path().join("run-img_id_1.bin");
        assert_eq!(enc.handle.primary_path(), Some(path.as_path()));
        assert_eq!(enc.handle.byte_size(), std::fs::metadata(&path).unwrap().len());
        assert!(enc.timings.keys().all(|m| ENCODE_MODULES.contains(&m)));
        assert_eq!(enc.timings.len(), 3);

        let dec = codec.decompress(&enc.handle, dir.path(), "img_id_1").unwrap();
        assert!(dec.timings.keys().all(|m| DECODE_MODULES.contains(&m)));
        assert_eq!(dec.features.org_input_size, b.org_input_size);
        assert_eq!(dec.features.input_size, b.input_size);
        // Multiples of 0.25 up to 15.75 are exact in f16.
        assert_eq!(dec.features.data, b.data);
    }

    #[test]
    fn test_anchor_mode_drops_size_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(1).unwrap().anchor();
        let enc = codec.compress(&bundle(), dir.path(), "run", "img_id_2").unwrap();
        let dec = codec.decompress(&enc.handle, dir.path(), "img_id_2").unwrap();
        assert!(!dec.features.has_size_metadata());
        assert_eq!(dec.features.data["p2"].dtype(), DType::F32);
    }

    #[test]
    fn test_read_header_of_committed_bitstream() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(3).unwrap();
        let enc = codec.compress(&bundle(), dir.path(), "run", "img_id_6").unwrap();
        let header = ZstdFeatureCodec::read_header(enc.handle.primary_path().unwrap()).unwrap();
        assert_eq!(header.tensors.len(), 1);
        assert_eq!(header.tensors[0].dtype, DType::F16);
        assert_eq!(header.org_input_size, Some(ImageSize::new(16, 16)));
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(3).unwrap();
        codec.compress(&bundle(), dir.path(), "run", "img_id_3").unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["run-img_id_3.bin".to_string()]);
    }

    #[test]
    fn test_complexity_charges_elements_over_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(3).unwrap();
        let enc = codec.compress(&bundle(), dir.path(), "run", "img_id_4").unwrap();
        let c = enc.complexity.unwrap();
        assert_eq!(c.pixels, 256);
        assert!((c.kmacs - 0.064).abs() < 1e-12);
    }

    #[test]
    fn test_missing_bitstream_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut codec = ZstdFeatureCodec::new(3).unwrap();
        let handle: BitstreamHandle = BitstreamFile::new(dir.path().join("absent.bin"), 0).into();
        let err = codec.decompress(&handle, dir.path(), "img_id_5").unwrap_err();
        assert!(matches!(err, AdapterError::Io { .. }));
    }

    #[test]
    fn test_reports_qp_and_encode_type() {
        let codec = ZstdFeatureCodec::new(7).unwrap().with_reduced_dtype(DType::BF16);
        assert_eq!(codec.qp(), Some(7));
        assert_eq!(codec.eval_encode_type(), "bpp");
        assert_eq!(codec.reduced_dtype(), DType::BF16);
        assert!(codec.preserves_size_metadata());
    }
}
