// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the pieces they share.

pub mod inspect;
pub mod run;
pub mod sweep;
pub mod synthetic;

use anyhow::Context;
use pipeline::PipelineConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Pipeline options that override the configuration file.
#[derive(Debug, Default, clap::Args)]
pub struct PipelineArgs {
    /// Directory bitstreams are written to / read from.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Bitstream name of the run.
    #[arg(long)]
    pub name: Option<String>,

    /// Stop after writing bitstreams.
    #[arg(long)]
    pub encode_only: bool,

    /// Decode bitstreams written by an earlier encode-only run.
    #[arg(long)]
    pub decode_only: bool,

    /// Number of leading items to skip.
    #[arg(long)]
    pub skip_frames: Option<usize>,

    /// Exclusive upper bound on the item index.
    #[arg(long)]
    pub end_frame: Option<usize>,

    /// Precision features are cast to before compression.
    #[arg(long)]
    pub datatype: Option<String>,

    /// Measure kMAC/pixel per module.
    #[arg(long)]
    pub mac: bool,

    /// Directory for prediction dumps.
    #[arg(long)]
    pub vis_dir: Option<PathBuf>,

    /// Minimum score for a prediction to be dumped.
    #[arg(long)]
    pub vis_threshold: Option<f32>,

    /// Log progress every N items (0 disables).
    #[arg(long)]
    pub log_every: Option<usize>,
}

impl PipelineArgs {
    /// Overrides the fields of `config` that were given on the command line.
    pub fn apply(&self, config: &mut PipelineConfig) -> anyhow::Result<()> {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(name) = &self.name {
            config.bitstream_name = name.clone();
        }
        config.encode_only |= self.encode_only;
        config.decode_only |= self.decode_only;
        config.mac_calculation |= self.mac;
        if let Some(n) = self.skip_frames {
            config.skip_frames = n;
        }
        if let Some(n) = self.end_frame {
            config.end_frame_index = Some(n);
        }
        if let Some(dtype) = &self.datatype {
            config.datatype = dtype
                .parse()
                .with_context(|| format!("invalid --datatype '{dtype}'"))?;
        }
        if let Some(dir) = &self.vis_dir {
            config.vis_dir = Some(dir.clone());
        }
        if let Some(t) = self.vis_threshold {
            config.vis_threshold = t;
        }
        if let Some(n) = self.log_every {
            config.log_every = n;
        }
        Ok(())
    }
}

/// Shape of the synthetic dataset.
#[derive(Debug, Clone, clap::Args)]
pub struct DatasetArgs {
    /// Number of synthetic images.
    #[arg(long, default_value_t = 12)]
    pub items: usize,

    /// Side length of the synthetic images in pixels.
    #[arg(long, default_value_t = 64)]
    pub size: usize,
}

/// Loads the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config '{}'", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Writes `value` as pretty JSON to `path`.
pub fn write_json(path: &Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating '{}'", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)
        .with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DType;

    #[test]
    fn test_flags_override_file_values() {
        let mut config = PipelineConfig::from_toml("bitstream_name = \"file\"\nskip_frames = 4").unwrap();
        let args = PipelineArgs {
            name: Some("flag".into()),
            encode_only: true,
            datatype: Some("float16".into()),
            ..Default::default()
        };
        args.apply(&mut config).unwrap();
        assert_eq!(config.bitstream_name, "flag");
        assert_eq!(config.skip_frames, 4);
        assert!(config.encode_only);
        assert_eq!(config.datatype, DType::F16);
    }

    #[test]
    fn test_bad_datatype_is_reported() {
        let args = PipelineArgs {
            datatype: Some("float128".into()),
            ..Default::default()
        };
        let err = args.apply(&mut PipelineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("float128"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "log_every = 3\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().log_every, 3);
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }
}
