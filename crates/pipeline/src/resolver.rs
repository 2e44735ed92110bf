// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Locating committed bitstreams on disk.
//!
//! A bitstream for item `img_id_42` of run `run` is any file in the output
//! directory named `run-img_id_42*` with a recognised extension. Codecs
//! write through temporary files whose names contain `_tmp`; those are
//! never matched, so a half-written bitstream cannot be picked up.
//!
//! The character following the prefix must not be a digit, so resolving
//! `run-img_id_4` does not pick up `run-img_id_42.bin`.

use crate::PipelineError;
use feature_ir::BitstreamFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builds the lookup prefix `{bitstream_name}-{file_prefix}`.
pub fn bitstream_prefix(bitstream_name: &str, file_prefix: &str) -> String {
    format!("{bitstream_name}-{file_prefix}")
}

/// Finds the unique committed bitstream for a prefix.
#[derive(Debug, Clone)]
pub struct BitstreamResolver {
    dir: PathBuf,
    extensions: Vec<String>,
    tmp_marker: String,
}

impl BitstreamResolver {
    /// Extensions of committed bitstreams.
    pub const DEFAULT_EXTENSIONS: [&'static str; 2] = ["bin", "mp4"];
    /// Substring marking files that are still being written.
    pub const TMP_MARKER: &'static str = "_tmp";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: Self::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            tmp_marker: Self::TMP_MARKER.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the single committed bitstream whose name starts with `prefix`.
    pub fn resolve(&self, prefix: &str) -> Result<BitstreamFile, PipelineError> {
        let mut matches = self.matching(|name| self.follows_prefix(name, prefix))?;
        match matches.len() {
            0 => Err(PipelineError::MissingBitstream {
                prefix: prefix.to_string(),
                dir: self.dir.clone(),
            }),
            1 => {
                let path = matches.remove(0);
                debug!(path = %path.display(), "resolved bitstream");
                BitstreamFile::from_disk(&path).map_err(|source| PipelineError::Io { path, source })
            }
            _ => Err(PipelineError::AmbiguousBitstream {
                prefix: prefix.to_string(),
                matches,
            }),
        }
    }

    /// Lists every committed bitstream of run `bitstream_name`, sorted by path.
    pub fn list(&self, bitstream_name: &str) -> Result<Vec<BitstreamFile>, PipelineError> {
        let run_prefix = format!("{bitstream_name}-");
        self.matching(|name| name.starts_with(&run_prefix))?
            .into_iter()
            .map(|path| BitstreamFile::from_disk(&path).map_err(|source| PipelineError::Io { path, source }))
            .collect()
    }

    fn follows_prefix(&self, name: &str, prefix: &str) -> bool {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
    }

    fn is_committed(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let recognised = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext));
        recognised && !name.contains(&self.tmp_marker)
    }

    /// Committed files whose name satisfies `accept`, sorted by path.
    fn matching(&self, accept: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, PipelineError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PipelineError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PipelineError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || !self.is_committed(&path) {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()).is_some_and(&accept) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}
