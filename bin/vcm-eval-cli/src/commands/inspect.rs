// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `vcm-eval inspect` command: list the bitstreams of a run.
//!
//! Uses the same resolution rules as a decode-only run, so a file listed
//! here is a file a decode-only run would pick up.

use pipeline::BitstreamResolver;
use split_adapters::ZstdFeatureCodec;
use std::path::Path;

pub fn execute(output_dir: &Path, name: &str) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           vcm-eval · Bitstream Inspector            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let files = BitstreamResolver::new(output_dir).list(name)?;
    println!("  Directory: {}", output_dir.display());
    println!("  Run:       {name}");
    println!("  Files:     {}", files.len());
    println!(
        "  Total:     {:.2} KB",
        files.iter().map(|f| f.size_bytes).sum::<u64>() as f64 / 1024.0,
    );
    println!();

    if files.is_empty() {
        return Ok(());
    }

    // ── Per-File Detail ────────────────────────────────────────
    println!(
        "  {:<40} {:>10} {:>8} {:<14} {:>6}",
        "File", "Bytes", "Tensors", "DTypes", "Sizes",
    );
    println!("  {}", "-".repeat(82));

    for file in &files {
        let label = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match ZstdFeatureCodec::read_header(&file.path) {
            Ok(header) => {
                let mut dtypes: Vec<&str> = header.tensors.iter().map(|t| t.dtype.as_str()).collect();
                dtypes.dedup();
                let sizes = header.org_input_size.is_some() && header.input_size.is_some();
                println!(
                    "  {:<40} {:>10} {:>8} {:<14} {:>6}",
                    truncate(&label, 40),
                    file.size_bytes,
                    header.tensors.len(),
                    dtypes.join(","),
                    if sizes { "yes" } else { "no" },
                );
            }
            Err(e) => {
                tracing::debug!(path = %file.path.display(), error = %e, "unreadable bitstream");
                println!(
                    "  {:<40} {:>10} {:>8}",
                    truncate(&label, 40),
                    file.size_bytes,
                    "unreadable",
                );
            }
        }
    }
    println!();

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_inspect_tolerates_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run-img_id_1.bin"), b"not a container").unwrap();
        std::fs::write(dir.path().join("run-img_id_2_tmp.bin"), b"partial").unwrap();
        execute(dir.path(), "run").unwrap();
        execute(&dir.path().join("absent"), "run").unwrap();
    }
}
