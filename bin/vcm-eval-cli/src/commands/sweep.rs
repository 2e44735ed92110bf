// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `vcm-eval sweep` command: rate/accuracy trade-off across codec levels.
//!
//! Runs the full pipeline once per level, each in its own bitstream
//! directory, and prints one table row per level.

use crate::commands::{self, synthetic, DatasetArgs};
use module_accounting::Stage;
use pipeline::SplitInference;
use split_adapters::{PoolingStage, TopOneAccuracy, ZstdFeatureCodec};
use std::path::{Path, PathBuf};
use tracing::info_span;

/// One row of the sweep table.
#[derive(Debug, serde::Serialize)]
struct SweepPoint {
    qp: i32,
    bpp: f64,
    top1: f64,
    encode_ms: f64,
    decode_ms: f64,
}

pub fn execute(
    config_path: Option<&Path>,
    qps: &str,
    output_dir: PathBuf,
    dataset: &DatasetArgs,
    results: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           vcm-eval · Rate Sweep                     ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let levels = parse_qps(qps)?;
    let base = commands::load_config(config_path)?;
    let items = synthetic::build(dataset)?;

    println!("  Levels:  {levels:?}");
    println!("  Dataset: {} synthetic items, {}px", dataset.items, dataset.size);
    println!();

    // ── Results Table ──────────────────────────────────────────
    println!(
        "  {:>6} {:>10} {:>8} {:>12} {:>12}",
        "QP", "bpp", "Top-1", "Encode ms", "Decode ms",
    );
    println!("  {}", "-".repeat(52));

    let stage = PoolingStage::default();
    let mut points = Vec::with_capacity(levels.len());
    for qp in levels {
        let mut config = base.clone();
        config.output_dir = output_dir.join(format!("qp{qp}"));
        config.bitstream_name = format!("zstd-qp{qp}");
        config.encode_only = false;
        config.decode_only = false;

        let pipeline = SplitInference::new(config)
            .with_span(info_span!("sweep", qp))
            .validate()?;
        let mut codec = ZstdFeatureCodec::new(qp)?;
        let mut accuracy = TopOneAccuracy::new();
        let output = pipeline.run(&stage, &mut codec, items.clone(), Some(&mut accuracy))?;

        let top1 = output
            .metrics
            .as_ref()
            .and_then(|m| m.get(TopOneAccuracy::TOP1_KEY).copied())
            .unwrap_or(0.0);
        let point = SweepPoint {
            qp,
            bpp: output.bpp().unwrap_or(0.0),
            top1,
            encode_ms: output.timings.stage(Stage::Encode).as_secs_f64() * 1000.0,
            decode_ms: output.timings.stage(Stage::Decode).as_secs_f64() * 1000.0,
        };
        println!(
            "  {:>6} {:>10.4} {:>7.1}% {:>12.2} {:>12.2}",
            point.qp, point.bpp, point.top1, point.encode_ms, point.decode_ms,
        );
        points.push(point);
    }
    println!();

    if let Some(path) = results {
        commands::write_json(&path, &points)?;
        println!("  Results written to {}", path.display());
    }

    Ok(())
}

fn parse_qps(qps: &str) -> anyhow::Result<Vec<i32>> {
    let levels = qps
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|e| anyhow::anyhow!("invalid level '{}': {e}", s.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if levels.is_empty() {
        anyhow::bail!("no levels given");
    }
    Ok(levels)
}
