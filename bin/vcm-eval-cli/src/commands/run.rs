// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `vcm-eval run` command: one split-inference pass at a single setting.

use crate::commands::{self, synthetic, DatasetArgs, PipelineArgs};
use anyhow::Context;
use pipeline::{PipelineOutput, RunMode, SplitInference};
use split_adapters::{Classification, EvaluationSink, PoolingStage, TopOneAccuracy, ZstdFeatureCodec};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Results file layout: the run output plus flattened timings.
#[derive(serde::Serialize)]
struct RunResults<'a> {
    mode: String,
    output: &'a PipelineOutput,
    timings_s: BTreeMap<String, f64>,
}

pub fn execute(
    config_path: Option<&Path>,
    pipeline_args: &PipelineArgs,
    dataset: &DatasetArgs,
    qp: i32,
    reduced_dtype: &str,
    anchor: bool,
    results: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           vcm-eval · Split Inference                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut config = commands::load_config(config_path)?;
    pipeline_args.apply(&mut config)?;

    let reduced = reduced_dtype
        .parse()
        .with_context(|| format!("invalid --reduced-dtype '{reduced_dtype}'"))?;
    let mut codec = ZstdFeatureCodec::new(qp)?.with_reduced_dtype(reduced);
    if anchor {
        codec = codec.anchor();
    }

    let pipeline = SplitInference::new(config).validate()?;
    let config = pipeline.config();
    let mode = config.mode();

    println!("  Mode:       {mode}");
    println!("  Bitstreams: {}", config.output_dir.display());
    println!(
        "  Codec:      zstd level {} ({} features{})",
        codec.level(),
        codec.reduced_dtype(),
        if anchor { ", anchor" } else { "" }
    );
    println!("  Dataset:    {} synthetic items, {}px", dataset.items, dataset.size);
    println!();

    let items = synthetic::build(dataset)?;
    let stage = PoolingStage::default();
    let mut accuracy = TopOneAccuracy::new();
    let sink: Option<&mut dyn EvaluationSink<Classification>> = match mode {
        RunMode::EncodeOnly => None,
        _ => Some(&mut accuracy),
    };

    let output = pipeline.run(&stage, &mut codec, items, sink)?;

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", output.summary());
    println!("  {}", output.timings.summary());
    if let Some(complexity) = &output.complexity {
        println!("  {}", complexity.summary());
    }
    if let Some(bpp) = output.bpp() {
        println!("  Mean rate:  {bpp:.4} bpp");
    }
    println!();

    if let Some(path) = results {
        let doc = RunResults {
            mode: mode.to_string(),
            output: &output,
            timings_s: output.timings.as_seconds(),
        };
        commands::write_json(&path, &doc)?;
        println!("  Results written to {}", path.display());
    }

    Ok(())
}
