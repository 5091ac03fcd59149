use crate::compressor::CompressionStat;
use crate::utils::format_megabytes;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PROGRESS_TEMPLATE: &str = " --|{prefix}|-- {pos} of {len} [{msg} was reduced]";

/// Number of filled bar segments for `done` out of `total`.
pub fn filled_segments(done: usize, total: usize, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let filled = (done as f64 / total as f64 * width as f64).round() as usize;
    filled.min(width)
}

/// Progress state after a stat has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub done: usize,
    pub total: usize,
    pub width: usize,
    pub filled: usize,
    pub freed_bytes: i64,
}

impl ProgressSnapshot {
    /// Plain text bar, `=` for done and `-` for remaining segments.
    pub fn bar(&self) -> String {
        format!(
            "{}{}",
            "=".repeat(self.filled),
            "-".repeat(self.width - self.filled)
        )
    }

    fn styled_bar(&self) -> String {
        format!(
            "{}{}",
            style("=".repeat(self.filled)).green().bright(),
            style("-".repeat(self.width - self.filled)).dim()
        )
    }

    pub fn freed_display(&self) -> String {
        format_megabytes(self.freed_bytes)
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub freed_bytes: i64,
}

impl RunSummary {
    pub fn input_display(&self) -> String {
        format_megabytes(self.total_input_bytes as i64)
    }

    pub fn output_display(&self) -> String {
        format_megabytes(self.total_output_bytes as i64)
    }

    pub fn freed_display(&self) -> String {
        format_megabytes(self.freed_bytes)
    }
}

/// Cumulative statistics of a run.
///
/// Owned by the orchestrator and updated only through [`record`], one stat
/// at a time, in arrival order.
///
/// [`record`]: ProgressAccumulator::record
#[derive(Debug)]
pub struct ProgressAccumulator {
    total: usize,
    width: usize,
    stats: Vec<CompressionStat>,
    total_input_bytes: u64,
    total_output_bytes: u64,
    failed: usize,
}

impl ProgressAccumulator {
    pub fn new(total: usize, width: usize) -> Self {
        Self {
            total,
            width,
            stats: Vec::with_capacity(total),
            total_input_bytes: 0,
            total_output_bytes: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, stat: CompressionStat) -> ProgressSnapshot {
        self.total_input_bytes += stat.size_in;
        self.total_output_bytes += stat.size_output;
        if stat.is_failure() {
            self.failed += 1;
        }
        self.stats.push(stat);
        self.snapshot()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            done: self.done(),
            total: self.total,
            width: self.width,
            filled: filled_segments(self.done(), self.total, self.width),
            freed_bytes: self.freed_bytes(),
        }
    }

    pub fn done(&self) -> usize {
        self.stats.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Stats in the order they arrived.
    pub fn stats(&self) -> &[CompressionStat] {
        &self.stats
    }

    pub fn total_input_bytes(&self) -> u64 {
        self.total_input_bytes
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.total_output_bytes
    }

    /// Input minus output over every stat so far. Negative if the engine
    /// grew files.
    pub fn freed_bytes(&self) -> i64 {
        self.total_input_bytes as i64 - self.total_output_bytes as i64
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn summary(&self, skipped: usize) -> RunSummary {
        RunSummary {
            processed: self.done(),
            failed: self.failed,
            skipped,
            total_input_bytes: self.total_input_bytes,
            total_output_bytes: self.total_output_bytes,
            freed_bytes: self.freed_bytes(),
        }
    }
}

/// Live terminal rendering of a [`ProgressSnapshot`].
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new(total: usize, visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        bar.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_prefix(snapshot.styled_bar());
        self.bar.set_message(style(snapshot.freed_display()).green().to_string());
        self.bar.set_position(snapshot.done as u64);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
