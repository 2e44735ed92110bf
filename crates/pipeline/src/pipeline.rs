// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The split-inference loop with a type-state–enforced pipeline.
//!
//! ```text
//! SplitInference<Unchecked>
//!     │  .validate()
//!     ▼
//! SplitInference<Checked>
//!     │  .run(stage, codec, items, sink)
//!     ▼
//!   PipelineOutput
//! ```
//!
//! Validation consumes the unchecked value and returns a checked one, so a
//! configuration with contradicting mode flags can never reach the loop.

use crate::progress::ProgressLog;
use crate::state::RunState;
use crate::{bitstream_prefix, ComplexityReport, PipelineConfig, PipelineError, TimingReport};
use feature_ir::{BitstreamHandle, DatasetItem, OutputRecord, QuantizationParameter};
use module_accounting::{Module, Stage};
use split_adapters::{CodecAdapter, EvalMetrics, EvaluationSink, StageAdapter};
use std::time::Instant;
use tracing::{debug, info, warn};

// ── Type-state markers ─────────────────────────────────────────

/// Configuration has not been validated yet.
#[derive(Debug)]
pub struct Unchecked;

/// Configuration is valid; the pipeline can run.
#[derive(Debug)]
pub struct Checked;

/// Sealed trait for pipeline states.
pub trait PipelineState: std::fmt::Debug {}
impl PipelineState for Unchecked {}
impl PipelineState for Checked {}

// ── Pipeline output ────────────────────────────────────────────

/// Result of one run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineOutput {
    pub timings: TimingReport,
    /// Rate tag reported by the codec, passed through verbatim.
    pub eval_encode_type: String,
    /// One record per processed item; `None` in encode-only mode.
    pub records: Option<Vec<OutputRecord>>,
    /// Evaluator metrics plus `bpp`; `None` in encode-only mode.
    pub metrics: Option<EvalMetrics>,
    /// Present when complexity was measured.
    pub complexity: Option<ComplexityReport>,
    /// Items whose size metadata had to be rebuilt from the dataset.
    pub metadata_recoveries: usize,
    pub items_processed: usize,
}

impl PipelineOutput {
    /// Metric key of the mean bits-per-pixel over output records.
    pub const BPP_KEY: &'static str = "bpp";

    /// Mean bits per pixel, absent in encode-only mode.
    pub fn bpp(&self) -> Option<f64> {
        self.metrics.as_ref()?.get(Self::BPP_KEY).copied()
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let metrics = match &self.metrics {
            Some(m) => m
                .iter()
                .map(|(k, v)| format!("{k}={v:.4}"))
                .collect::<Vec<_>>()
                .join(", "),
            None => "none".to_string(),
        };
        format!(
            "Split inference: {} items, rate as {}, metrics [{}], {} metadata recoveries",
            self.items_processed, self.eval_encode_type, metrics, self.metadata_recoveries
        )
    }
}

/// Mean bits per pixel over `records`, `0.0` when there are none.
fn mean_bpp(records: &[OutputRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(OutputRecord::bits_per_pixel).sum::<f64>() / records.len() as f64
}

/// What happened to one item.
enum ItemOutcome {
    Skipped,
    Stop,
    Encoded,
    Done,
}

// ── Pipeline ───────────────────────────────────────────────────

/// The split-inference orchestrator.
///
/// `S` is a type-state marker: only a [`Checked`] pipeline has a `run`
/// method. All log events of a run are emitted inside the pipeline's span,
/// which defaults to `info_span!("split_inference")` and can be replaced
/// with [`with_span`](Self::with_span) to tag runs.
///
/// # Example
/// ```no_run
/// use pipeline::{PipelineConfig, SplitInference};
/// use split_adapters::{PoolingStage, TopOneAccuracy, ZstdFeatureCodec};
///
/// # fn example(items: Vec<feature_ir::DatasetItem>) -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = SplitInference::new(PipelineConfig::default()).validate()?;
/// let mut codec = ZstdFeatureCodec::new(3)?;
/// let mut evaluator = TopOneAccuracy::new();
/// let output = pipeline.run(&PoolingStage::default(), &mut codec, items, Some(&mut evaluator))?;
/// println!("{}", output.summary());
/// # Ok(())
/// # }
/// ```
pub struct SplitInference<S: PipelineState = Unchecked> {
    config: PipelineConfig,
    span: tracing::Span,
    _state: std::marker::PhantomData<S>,
}

impl<S: PipelineState> SplitInference<S> {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replaces the span all events of this pipeline are emitted in.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }
}

// ── Unchecked → Checked ────────────────────────────────────────

impl SplitInference<Unchecked> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            span: tracing::info_span!("split_inference"),
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the configuration. Transitions to the `Checked` state.
    pub fn validate(self) -> Result<SplitInference<Checked>, PipelineError> {
        {
            let _entered = self.span.enter();
            self.config.validate()?;
            info!(
                mode = %self.config.mode(),
                output_dir = %self.config.output_dir.display(),
                bitstream_name = %self.config.bitstream_name,
                "pipeline configured"
            );
        }
        Ok(SplitInference {
            config: self.config,
            span: self.span,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Checked: run ───────────────────────────────────────────────

impl SplitInference<Checked> {
    /// Runs the loop over `items`.
    ///
    /// Per item, depending on the mode:
    /// 1. Stage 1, cast to the configured precision, compress (not in
    ///    decode-only mode, where the bitstream is resolved on disk instead).
    /// 2. Decompress, rebuilding missing size metadata from the item.
    /// 3. Stage 2, evaluation, output record (not in encode-only mode).
    ///
    /// Any adapter failure aborts the run and is returned unchanged.
    pub fn run<St, C, I>(
        &self,
        stage: &St,
        codec: &mut C,
        items: I,
        mut sink: Option<&mut dyn EvaluationSink<St::Prediction>>,
    ) -> Result<PipelineOutput, PipelineError>
    where
        St: StageAdapter,
        C: CodecAdapter,
        I: IntoIterator<Item = DatasetItem>,
        I::IntoIter: ExactSizeIterator,
    {
        let _entered = self.span.enter();
        if sink.is_none() && self.config.vis_dir.is_some() && !self.config.encode_only {
            return Err(PipelineError::Config(
                "vis_dir is set but no evaluation sink was supplied".to_string(),
            ));
        }

        let items = items.into_iter();
        let total = items.len();
        info!(
            stage = stage.name(),
            codec = codec.name(),
            items = total,
            mode = %self.config.mode(),
            "split inference started"
        );

        let mut state = RunState::new(&self.config);
        let mut progress = ProgressLog::new(total, self.config.log_every);
        let run_start = Instant::now();

        for (index, item) in items.enumerate() {
            progress.arrived(index);
            let outcome = self.process_item(index, &item, stage, codec, sink.as_deref_mut(), &mut state)?;
            if let ItemOutcome::Stop = outcome {
                debug!(index, "end frame index reached");
                break;
            }
            progress.finished(index);
        }

        let encode_type = codec.eval_encode_type().to_string();
        let finished = state.finish(run_start.elapsed());
        let encode_only = self.config.encode_only;

        let (records, metrics) = if encode_only {
            info!(bitstreams = finished.items_processed, "bitstreams generated");
            (None, None)
        } else {
            let mut metrics = match sink {
                Some(sink) => sink.finalize()?,
                None => EvalMetrics::new(),
            };
            metrics.insert(PipelineOutput::BPP_KEY.to_string(), mean_bpp(&finished.records));
            (Some(finished.records), Some(metrics))
        };

        let output = PipelineOutput {
            timings: finished.timings,
            eval_encode_type: encode_type,
            records,
            metrics,
            complexity: finished.complexity,
            metadata_recoveries: finished.metadata_recoveries,
            items_processed: finished.items_processed,
        };
        info!("{}", output.timings.summary());
        if let Some(complexity) = &output.complexity {
            info!("{}", complexity.summary());
        }
        info!("{}", output.summary());
        Ok(output)
    }

    fn process_item<St, C>(
        &self,
        index: usize,
        item: &DatasetItem,
        stage: &St,
        codec: &mut C,
        sink: Option<&mut (dyn EvaluationSink<St::Prediction> + '_)>,
        state: &mut RunState,
    ) -> Result<ItemOutcome, PipelineError>
    where
        St: StageAdapter,
        C: CodecAdapter,
    {
        let config = &self.config;
        let original_size = item.original_size();
        let file_prefix = item.file_prefix();

        let handle: BitstreamHandle = match &state.resolver {
            Some(resolver) => {
                let prefix = bitstream_prefix(&config.bitstream_name, &file_prefix);
                resolver.resolve(&prefix)?.into()
            }
            None => {
                if state.is_skipped(index) {
                    debug!(index, "skipped");
                    return Ok(ItemOutcome::Skipped);
                }
                if state.is_past_end(index) {
                    return Ok(ItemOutcome::Stop);
                }

                if state.measures_complexity() {
                    let pair = stage.part1_complexity(item)?;
                    state.charge_complexity(Module::NnPart1, Some(pair));
                }

                let start = Instant::now();
                let mut bundle = stage.part1(item)?;
                stage.synchronize();
                state.charge_stage(Stage::NnPart1, start.elapsed());

                bundle.cast_all(config.datatype);
                bundle.org_input_size = Some(original_size);

                let start = Instant::now();
                let encoded = codec.compress(&bundle, &config.output_dir, &config.bitstream_name, &file_prefix)?;
                state.charge_stage(Stage::Encode, start.elapsed());
                state.merge_encode(&encoded.timings);
                state.charge_complexity(Module::FeatureReduction, encoded.complexity);

                encoded.handle
            }
        };

        if state.encode_only {
            state.items_processed += 1;
            debug!(index, file_prefix = %file_prefix, bytes = handle.byte_size(), "encoded");
            return Ok(ItemOutcome::Encoded);
        }

        let start = Instant::now();
        let decoded = codec.decompress(&handle, &config.output_dir, &file_prefix)?;
        state.charge_stage(Stage::Decode, start.elapsed());
        state.merge_decode(&decoded.timings);

        let mut restoration = decoded.complexity;
        let mut features = decoded.features;
        if !features.has_size_metadata() {
            warn!(
                image_id = item.image_id,
                file_prefix = %file_prefix,
                "decoded features carry no size metadata, rebuilding it from the dataset item"
            );
            features.org_input_size = Some(original_size);
            features.input_size = Some(stage.input_size(item));
            state.metadata_recoveries += 1;
        }
        // A decoder without size metadata cannot know the pixel count it worked on.
        if let Some(pair) = restoration.as_mut().filter(|p| p.pixels == 0) {
            pair.pixels = original_size.pixels();
        }
        state.charge_complexity(Module::FeatureRestoration, restoration);

        if state.measures_complexity() {
            let pair = stage.part2_complexity(&features)?;
            state.charge_complexity(Module::NnPart2, Some(pair));
        }

        let start = Instant::now();
        let prediction = stage.part2(&features)?;
        stage.synchronize();
        state.charge_stage(Stage::NnPart2, start.elapsed());

        if let Some(sink) = sink {
            sink.digest(item, &prediction)?;
            if let Some(dir) = &config.vis_dir {
                if sink.supports_visualization() {
                    sink.save_visualization(item, &prediction, dir, config.vis_threshold)?;
                }
            }
        }

        let record = OutputRecord::from_item(
            item,
            QuantizationParameter::from(codec.qp()),
            handle.byte_size(),
            state.items_processed,
            features.primary_input_size().unwrap_or(original_size),
        );
        debug!(
            index,
            coded_order = record.coded_order,
            bytes = record.bytes,
            "item done"
        );
        state.records.push(record);
        state.items_processed += 1;
        Ok(ItemOutcome::Done)
    }
}

impl<S: PipelineState> std::fmt::Debug for SplitInference<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitInference")
            .field("state", &std::any::type_name::<S>())
            .field("mode", &self.config.mode())
            .field("bitstream_name", &self.config.bitstream_name)
            .finish()
    }
}
