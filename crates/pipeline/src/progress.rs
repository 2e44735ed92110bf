// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Periodic progress logging.
//!
//! The first `min(5, total - 1)` items are treated as warm-up and excluded
//! from the rates. After that, every `log_every` items an `info!` event
//! reports the mean data time (how long the dataset took to hand over an
//! item), the mean compute time per item and an ETA for the rest of the
//! dataset. None of this ends up in the run's result.

use std::time::{Duration, Instant};
use tracing::info;

const MAX_WARMUP: usize = 5;

#[derive(Debug)]
pub(crate) struct ProgressLog {
    total: usize,
    warmup: usize,
    log_every: usize,
    /// End of the previous iteration.
    mark: Instant,
    /// Start of the current iteration.
    arrival: Instant,
    /// Start of the measured window (after warm-up).
    window_start: Instant,
    data_time: Duration,
    compute_time: Duration,
    measured: usize,
}

impl ProgressLog {
    pub(crate) fn new(total: usize, log_every: usize) -> Self {
        let now = Instant::now();
        Self {
            total,
            warmup: MAX_WARMUP.min(total.saturating_sub(1)),
            log_every,
            mark: now,
            arrival: now,
            window_start: now,
            data_time: Duration::ZERO,
            compute_time: Duration::ZERO,
            measured: 0,
        }
    }

    /// Called when item `index` has been handed over by the dataset.
    pub(crate) fn arrived(&mut self, index: usize) {
        let now = Instant::now();
        if index == self.warmup {
            self.window_start = self.mark;
            self.data_time = Duration::ZERO;
            self.compute_time = Duration::ZERO;
            self.measured = 0;
        }
        if index >= self.warmup {
            self.data_time += now - self.mark;
        }
        self.arrival = now;
    }

    /// Called when item `index` is done, whether processed or skipped.
    pub(crate) fn finished(&mut self, index: usize) {
        let now = Instant::now();
        if index >= self.warmup {
            self.compute_time += now - self.arrival;
            self.measured += 1;
        }
        self.mark = now;

        if self.log_every == 0 || self.measured == 0 || (index + 1) % self.log_every != 0 {
            return;
        }
        let n = self.measured as u32;
        let per_iter = (now - self.window_start) / n;
        let remaining = self.total.saturating_sub(index + 1) as u32;
        info!(
            done = index + 1,
            total = self.total,
            data_s_per_iter = (self.data_time / n).as_secs_f64(),
            compute_s_per_iter = (self.compute_time / n).as_secs_f64(),
            total_s_per_iter = per_iter.as_secs_f64(),
            eta_s = per_iter.checked_mul(remaining).unwrap_or(Duration::MAX).as_secs_f64(),
            "inference progress"
        );
    }
}
