use crate::cancel::CancelToken;
use crate::constants::STAT_CHANNEL_CAPACITY;
use crate::error::{BatchError, Result};
use crate::formats::is_supported_image;
use crate::utils::calculate_compression_ratio;
use crossbeam_channel::{RecvTimeoutError, Sender};
use glob::glob;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// An engine that compresses one image file.
///
/// Implementations write the result to `output` and return its size in bytes.
pub trait Compressor: Send + Sync {
    fn compress_file(&self, input: &Path, output: &Path) -> Result<u64>;
}

/// Per-file result delivered to the progress accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStat {
    /// Staged file name, which is also the name written to the output directory
    pub file: String,
    pub size_in: u64,
    pub size_output: u64,
    /// Reduction relative to `size_in`, in percent
    pub percent: f64,
    /// Set when the engine failed and the file was passed through unchanged
    pub error: Option<String>,
}

impl CompressionStat {
    pub fn new(file: impl Into<String>, size_in: u64, size_output: u64) -> Self {
        Self {
            file: file.into(),
            size_in,
            size_output,
            percent: calculate_compression_ratio(size_in, size_output),
            error: None,
        }
    }

    /// A zero-reduction stat for a file the engine could not compress.
    pub fn failed(file: impl Into<String>, size_in: u64, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            size_in,
            size_output: size_in,
            percent: 0.0,
            error: Some(reason.into()),
        }
    }

    pub fn freed_bytes(&self) -> i64 {
        self.size_in as i64 - self.size_output as i64
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// What a chunk's compression pass delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Runs a [`Compressor`] over every image in a staged workspace.
///
/// Files are compressed in parallel on a dedicated pool. Their stats are
/// funnelled through a bounded channel and handed to the caller's callback
/// on the calling thread, one at a time.
pub struct CompressionInvoker {
    compressor: Arc<dyn Compressor>,
    pool: ThreadPool,
    timeout: Option<Duration>,
}

impl CompressionInvoker {
    pub fn new(
        compressor: Arc<dyn Compressor>,
        jobs: usize,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("squeeze-worker-{}", i))
            .build()?;

        Ok(Self {
            compressor,
            pool,
            timeout,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compresses every supported image in `workspace` into `output_dir`.
    ///
    /// # Arguments
    /// * `chunk_index` - Position of the chunk in the run, used in logs and errors
    /// * `workspace` - Staged chunk directory to read from
    /// * `output_dir` - Directory receiving one file per staged image
    /// * `cancel` - Checked before each file is started
    /// * `on_stat` - Called on the calling thread once per finished file
    ///
    /// # Returns
    /// * `Ok(ChunkOutcome)` - Every file was delivered through `on_stat`
    ///
    /// # Errors
    /// * `BatchError::ChunkTimedOut` - The deadline passed. The call returns
    ///   at the deadline and does not wait for files still being compressed
    /// * `BatchError::CopyThroughFailed` - A file the engine rejected could
    ///   not be copied to the output either
    /// * `BatchError::Cancelled` - `cancel` fired before every file started
    ///
    /// A file the engine fails on is copied through unchanged and reported
    /// as a zero-reduction stat. After an error, workers still running start
    /// no new files and their stats are discarded.
    pub fn compress<F>(
        &self,
        chunk_index: usize,
        workspace: &Path,
        output_dir: &Path,
        cancel: &CancelToken,
        mut on_stat: F,
    ) -> Result<ChunkOutcome>
    where
        F: FnMut(CompressionStat),
    {
        let files = collect_workspace_images(workspace)?;
        fs::create_dir_all(output_dir).map_err(|source| BatchError::DirectoryCreationFailed {
            path: output_dir.to_path_buf(),
            source,
        })?;

        debug!(
            "Compressing chunk {} ({} files) from {}",
            chunk_index,
            files.len(),
            workspace.display()
        );

        let expected = files.len();
        let (tx, rx) = crossbeam_channel::bounded(STAT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        self.spawn_workers(files, output_dir, cancel, &stop, tx);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut outcome = ChunkOutcome::default();

        let result = loop {
            let received = match deadline {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Ok(stat)) => {
                    outcome.delivered += 1;
                    if stat.is_failure() {
                        outcome.failed += 1;
                    }
                    on_stat(stat);
                }
                Ok(Err(e)) => break Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    warn!("Chunk {} exceeded its deadline, stopping", chunk_index);
                    break Err(BatchError::ChunkTimedOut {
                        index: chunk_index,
                        timeout: self.timeout.unwrap_or_default(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => break Ok(()),
            }
        };

        // Dropping the receiver turns pending sends into no-ops
        stop.store(true, Ordering::Relaxed);
        drop(rx);
        result?;

        if outcome.delivered < expected && cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }

        Ok(outcome)
    }

    /// Starts the chunk's file work on the pool without waiting for it.
    fn spawn_workers(
        &self,
        files: Vec<PathBuf>,
        output_dir: &Path,
        cancel: &CancelToken,
        stop: &Arc<AtomicBool>,
        tx: Sender<Result<CompressionStat>>,
    ) {
        let compressor = Arc::clone(&self.compressor);
        let output_dir = output_dir.to_path_buf();
        let cancel = cancel.clone();
        let stop = Arc::clone(stop);

        self.pool.spawn(move || {
            files.par_iter().for_each_with(tx, |tx, input| {
                if stop.load(Ordering::Relaxed) || cancel.is_cancelled() {
                    return;
                }
                let result = compress_one(compressor.as_ref(), input, &output_dir);
                if result.is_err() {
                    stop.store(true, Ordering::Relaxed);
                }
                let _ = tx.send(result);
            });
        });
    }
}

/// Supported images directly inside a workspace, in name order.
pub fn collect_workspace_images(workspace: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", glob::Pattern::escape(&workspace.to_string_lossy()));

    let files = glob(&pattern)?
        .flatten()
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    Ok(files)
}

fn compress_one(
    compressor: &dyn Compressor,
    input: &Path,
    output_dir: &Path,
) -> Result<CompressionStat> {
    let file = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output = output_dir.join(&file);
    let size_in = fs::metadata(input)?.len();

    match compressor.compress_file(input, &output) {
        Ok(size_output) => Ok(CompressionStat::new(file, size_in, size_output)),
        Err(e) => {
            warn!("Failed to compress {}: {}", file, e);
            // Keep the output complete even when the engine gives up
            fs::copy(input, &output)
                .map_err(|source| BatchError::CopyThroughFailed { file: output, source })?;
            Ok(CompressionStat::failed(file, size_in, e.to_string()))
        }
    }
}
