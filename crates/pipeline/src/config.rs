// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! output_dir = "./bitstreams"
//! bitstream_name = "zstd-qp3"
//! encode_only = false
//! decode_only = false
//! skip_frames = 0
//! end_frame_index = 100
//! datatype = "float32"
//! mac_calculation = true
//! vis_dir = "./vis"
//! vis_threshold = 0.5
//! log_every = 20
//! ```
//!
//! Every field is optional; missing fields take their [`Default`] value.

use crate::PipelineError;
use std::fmt;
use std::path::{Path, PathBuf};
use tensor_core::DType;

/// Which part of the round trip a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    Full,
    EncodeOnly,
    DecodeOnly,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::Full => "full",
            RunMode::EncodeOnly => "encode-only",
            RunMode::DecodeOnly => "decode-only",
        })
    }
}

/// Configuration for one split-inference run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory bitstreams are written to and, in decode-only mode, read from.
    pub output_dir: PathBuf,
    /// Leading component of every bitstream file name.
    pub bitstream_name: String,
    /// Skip stage 1 and compression; decode bitstreams from `output_dir`.
    pub decode_only: bool,
    /// Stop after the bitstream of each item is written.
    pub encode_only: bool,
    /// Number of leading items to skip (ignored in decode-only mode).
    pub skip_frames: usize,
    /// Exclusive upper bound on the dataset index (ignored in decode-only
    /// mode). `None` processes the whole dataset.
    pub end_frame_index: Option<usize>,
    /// Precision every feature tensor is cast to before compression.
    pub datatype: DType,
    /// Whether to probe and report kMAC/pixel per module.
    pub mac_calculation: bool,
    /// Where evaluators dump visualizations; `None` disables them.
    pub vis_dir: Option<PathBuf>,
    /// Minimum score for a detection to be visualized.
    pub vis_threshold: f32,
    /// Log progress every this many items; `0` disables progress logging.
    pub log_every: usize,
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("TOML serialise error: {e}")))
    }

    /// The mode selected by the two mode flags.
    ///
    /// Only meaningful for a configuration that passed [`validate`](Self::validate);
    /// when both flags are set this reports decode-only.
    pub fn mode(&self) -> RunMode {
        if self.decode_only {
            RunMode::DecodeOnly
        } else if self.encode_only {
            RunMode::EncodeOnly
        } else {
            RunMode::Full
        }
    }

    /// Checks the configuration for contradictions and missing preconditions.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.encode_only && self.decode_only {
            return Err(PipelineError::Config(
                "encode_only and decode_only are mutually exclusive; set at most one".to_string(),
            ));
        }
        if self.bitstream_name.is_empty() {
            return Err(PipelineError::Config(
                "bitstream_name must not be empty".to_string(),
            ));
        }
        if self.decode_only && !self.output_dir.is_dir() {
            return Err(PipelineError::Config(format!(
                "decode_only requires an existing output_dir, '{}' is not a directory",
                self.output_dir.display()
            )));
        }
        if !self.vis_threshold.is_finite() {
            return Err(PipelineError::Config(format!(
                "vis_threshold must be finite, got {}",
                self.vis_threshold
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./bitstreams"),
            bitstream_name: "bitstream".to_string(),
            decode_only: false,
            encode_only: false,
            skip_frames: 0,
            end_frame_index: None,
            datatype: DType::F32,
            mac_calculation: false,
            vis_dir: None,
            vis_threshold: 0.5,
            log_every: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = PipelineConfig::default();
        assert_eq!(c.mode(), RunMode::Full);
        assert_eq!(c.datatype, DType::F32);
        assert!(c.end_frame_index.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
output_dir = "/tmp/bits"
bitstream_name = "run"
encode_only = true
skip_frames = 2
end_frame_index = 10
datatype = "float16"
mac_calculation = true
"#;
        let c = PipelineConfig::from_toml(toml).unwrap();
        assert_eq!(c.output_dir, PathBuf::from("/tmp/bits"));
        assert_eq!(c.bitstream_name, "run");
        assert_eq!(c.mode(), RunMode::EncodeOnly);
        assert_eq!(c.skip_frames, 2);
        assert_eq!(c.end_frame_index, Some(10));
        assert_eq!(c.datatype, DType::F16);
        assert!(c.mac_calculation);
        // Unset fields fall back to defaults.
        assert_eq!(c.log_every, 20);
        assert!(c.vis_dir.is_none());
    }

    #[test]
    fn test_from_toml_rejects_unknown_dtype() {
        assert!(matches!(
            PipelineConfig::from_toml("datatype = \"float64\""),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = PipelineConfig {
            end_frame_index: Some(5),
            vis_dir: Some(PathBuf::from("vis")),
            ..Default::default()
        };
        let back = PipelineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_mode_flags_mutually_exclusive() {
        let dir = std::env::temp_dir();
        let c = PipelineConfig {
            output_dir: dir,
            encode_only: true,
            decode_only: true,
            ..Default::default()
        };
        let msg = c.validate().unwrap_err().to_string();
        assert!(msg.contains("encode_only"));
        assert!(msg.contains("decode_only"));
    }

    #[test]
    fn test_decode_only_requires_output_dir() {
        let c = PipelineConfig {
            output_dir: PathBuf::from("/definitely/not/here"),
            decode_only: true,
            ..Default::default()
        };
        let msg = c.validate().unwrap_err().to_string();
        assert!(msg.contains("/definitely/not/here"));

        let c = PipelineConfig {
            output_dir: std::env::temp_dir(),
            decode_only: true,
            ..Default::default()
        };
        assert_eq!(c.mode(), RunMode::DecodeOnly);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_empty_bitstream_name_rejected() {
        let c = PipelineConfig {
            bitstream_name: String::new(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
