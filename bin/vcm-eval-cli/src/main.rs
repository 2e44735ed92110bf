// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # vcm-eval
//!
//! Command-line interface for the split-inference evaluation pipeline.
//!
//! ## Usage
//! ```bash
//! # Full round trip at zstd level 3
//! vcm-eval run --qp 3 --output-dir ./bits --results run.json
//!
//! # Encode now, decode later
//! vcm-eval run --encode-only --output-dir ./bits --name qp3
//! vcm-eval run --decode-only --output-dir ./bits --name qp3
//!
//! # Rate/accuracy sweep over qp values
//! vcm-eval sweep --qps 1,3,9,19
//!
//! # List committed bitstreams
//! vcm-eval inspect --output-dir ./bits --name qp3
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vcm-eval",
    about = "Split-inference evaluation of feature codecs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML pipeline configuration (command-line flags take precedence).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the split-inference loop over a synthetic dataset.
    Run {
        #[command(flatten)]
        pipeline: commands::PipelineArgs,

        #[command(flatten)]
        dataset: commands::DatasetArgs,

        /// zstd level used as the codec's qp.
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        qp: i32,

        /// Precision features are reduced to inside the codec.
        #[arg(long, default_value = "float16")]
        reduced_dtype: String,

        /// Drop size metadata from bitstreams (anchor codec behaviour).
        #[arg(long)]
        anchor: bool,

        /// Write the full result as JSON to this file.
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Run the full round trip once per qp and tabulate rate against accuracy.
    Sweep {
        /// Comma-separated qp values (e.g. "1,3,9,19").
        #[arg(long, default_value = "1,3,9,19")]
        qps: String,

        /// Root directory; each qp writes to its own subdirectory.
        #[arg(short, long, default_value = "./sweep")]
        output_dir: PathBuf,

        #[command(flatten)]
        dataset: commands::DatasetArgs,

        /// Write all results as a JSON array to this file.
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// List committed bitstreams of a run and describe their contents.
    Inspect {
        /// Directory holding the bitstreams.
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Bitstream name of the run.
        #[arg(long, default_value = "bitstream")]
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            pipeline,
            dataset,
            qp,
            reduced_dtype,
            anchor,
            results,
        } => commands::run::execute(
            cli.config.as_deref(),
            &pipeline,
            &dataset,
            qp,
            &reduced_dtype,
            anchor,
            results,
        ),
        Commands::Sweep {
            qps,
            output_dir,
            dataset,
            results,
        } => commands::sweep::execute(cli.config.as_deref(), &qps, output_dir, &dataset, results),
        Commands::Inspect { output_dir, name } => commands::inspect::execute(&output_dir, &name),
    }
}
