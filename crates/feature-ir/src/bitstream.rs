// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! References to persisted bitstreams.

use std::path::{Path, PathBuf};

/// One committed bitstream file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BitstreamFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl BitstreamFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    /// Builds a reference by reading the file size from disk.
    pub fn from_disk(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size_bytes = std::fs::metadata(&path)?.len();
        Ok(Self { path, size_bytes })
    }
}

/// Where a compressed feature bundle lives.
///
/// The codec decides whether it writes one file or one file per component;
/// the pipeline only needs [`BitstreamHandle::byte_size`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BitstreamHandle {
    /// A single bitstream file.
    Single(BitstreamFile),
    /// Per-component files, in component order.
    Components { files: Vec<BitstreamFile> },
}

impl BitstreamHandle {
    /// Size charged to the item: the single file's size, or the first
    /// component's size for multi-component bitstreams.
    pub fn byte_size(&self) -> u64 {
        match self {
            BitstreamHandle::Single(f) => f.size_bytes,
            BitstreamHandle::Components { files } => {
                files.first().map(|f| f.size_bytes).unwrap_or(0)
            }
        }
    }

    /// Sum over all component sizes.
    pub fn total_bytes(&self) -> u64 {
        self.files().map(|f| f.size_bytes).sum()
    }

    /// All referenced files.
    pub fn files(&self) -> impl Iterator<Item = &BitstreamFile> {
        let slice: &[BitstreamFile] = match self {
            BitstreamHandle::Single(f) => std::slice::from_ref(f),
            BitstreamHandle::Components { files } => files,
        };
        slice.iter()
    }

    /// Path of the single file or of the first component.
    pub fn primary_path(&self) -> Option<&Path> {
        self.files().next().map(|f| f.path.as_path())
    }
}

impl From<BitstreamFile> for BitstreamHandle {
    fn from(file: BitstreamFile) -> Self {
        BitstreamHandle::Single(file)
    }
}
