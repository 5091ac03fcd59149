use crate::cancel::CancelToken;
use crate::chunking::{create_chunks, Chunk};
use crate::compressor::{CompressionInvoker, Compressor};
use crate::constants::{
    CHUNK_SIZE, DEFAULT_CHUNK_TIMEOUT, DEFAULT_OUTPUT_DIR, PROGRESS_BAR_WIDTH, TEMP_ROOT_DIR_NAME,
};
use crate::error::{BatchError, Result};
use crate::listing::list_images;
use crate::processing::CompressionOptions;
use crate::progress::{ProgressAccumulator, ProgressDisplay, RunSummary};
use crate::staging::{count_staged, find_name_collisions, WorkspaceRoot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Input, output and options are still being chosen
    Selecting,
    /// Chunks are being staged and compressed
    Compressing,
    /// Temporary workspaces are being removed and totals computed
    Finalizing,
    Done,
}

/// Everything one run needs, fixed once selection is over.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ignore_compressed: bool,
    pub chunk_size: usize,
    /// Reserved directory for chunk workspaces, removed when the run ends
    pub temp_root: PathBuf,
    /// Worker threads used inside a chunk
    pub jobs: usize,
    pub chunk_timeout: Option<Duration>,
    pub compression: CompressionOptions,
    pub show_progress: bool,
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ignore_compressed: false,
            chunk_size: CHUNK_SIZE,
            temp_root: Self::default_temp_root(),
            jobs: num_cpus::get(),
            chunk_timeout: Some(DEFAULT_CHUNK_TIMEOUT),
            compression: CompressionOptions::default(),
            show_progress: true,
        }
    }

    pub fn default_output_dir() -> PathBuf {
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    }

    pub fn default_temp_root() -> PathBuf {
        std::env::temp_dir().join(TEMP_ROOT_DIR_NAME)
    }

    /// Checks the configuration before anything on disk is touched.
    ///
    /// The output directory is removed recursively at the start of a run,
    /// and run workspaces are removed from the temp root at its end. So
    /// neither may be the input directory or one of its ancestors, and the
    /// output may not live inside the temp root.
    ///
    /// # Errors
    /// * `BatchError::InvalidChunkSize` - If the chunk size is 0
    /// * `BatchError::InputDirectoryNotFound` - If the input is not a directory
    /// * `BatchError::WouldRemoveInput` - If clearing output or temp root reaches the input
    /// * `BatchError::OutputInsideTempRoot` - If the output is the temp root or below it
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BatchError::InvalidChunkSize(self.chunk_size));
        }
        if !self.input_dir.is_dir() {
            return Err(BatchError::InputDirectoryNotFound(self.input_dir.clone()));
        }

        let input = self.input_dir.canonicalize()?;
        for target in [&self.output_dir, &self.temp_root] {
            if input.starts_with(absolute(target)?) {
                return Err(BatchError::WouldRemoveInput {
                    input: self.input_dir.clone(),
                    target: target.clone(),
                });
            }
        }

        if absolute(&self.output_dir)?.starts_with(absolute(&self.temp_root)?) {
            return Err(BatchError::OutputInsideTempRoot {
                output: self.output_dir.clone(),
                temp_root: self.temp_root.clone(),
            });
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.canonicalize()?);
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Removes a stale output directory, if any, and creates it empty.
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed previous output in {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(BatchError::OutputDirectoryCleanupFailed {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    fs::create_dir_all(path).map_err(|source| BatchError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Drives one run: list, chunk, then stage and compress chunk by chunk.
///
/// Chunks are strictly sequential. The next chunk is not staged until every
/// stat of the previous one has been recorded.
pub struct Orchestrator {
    config: RunConfig,
    invoker: CompressionInvoker,
    cancel: CancelToken,
    phase: RunPhase,
}

impl Orchestrator {
    pub fn new(config: RunConfig, compressor: Arc<dyn Compressor>) -> Result<Self> {
        let invoker = CompressionInvoker::new(compressor, config.jobs, config.chunk_timeout)?;
        Ok(Self {
            config,
            invoker,
            cancel: CancelToken::new(),
            phase: RunPhase::Selecting,
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs the whole pipeline and returns the final totals.
    ///
    /// Any error is fatal to the run. The temporary workspace is removed on
    /// every path, best effort when the run fails.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.config.validate()?;
        self.phase = RunPhase::Compressing;

        let ignore = self.config.ignore_compressed;
        let images = list_images(&self.config.input_dir)?;

        let collisions = find_name_collisions(&images, ignore);
        if !collisions.is_empty() {
            return Err(BatchError::NameCollision(collisions));
        }

        prepare_output_dir(&self.config.output_dir)?;

        let chunks = create_chunks(&images, self.config.chunk_size)?;
        let total = count_staged(&images, ignore);
        let skipped = images.len() - total;
        info!(
            "Compressing {} of {} images in {} chunks with {} threads",
            total,
            images.len(),
            chunks.len(),
            self.invoker.threads()
        );

        let workspace_root = WorkspaceRoot::create(&self.config.temp_root)?;
        let mut progress = ProgressAccumulator::new(total, PROGRESS_BAR_WIDTH);
        let display = ProgressDisplay::new(total, self.config.show_progress);

        let result = self.process_chunks(&chunks, &workspace_root, &mut progress, &display);
        display.finish();
        result?;

        self.phase = RunPhase::Finalizing;
        if let Err(e) = workspace_root.cleanup() {
            warn!("{}", e);
        }

        let summary = progress.summary(skipped);
        self.phase = RunPhase::Done;
        Ok(summary)
    }

    fn process_chunks(
        &self,
        chunks: &[Chunk],
        workspace_root: &WorkspaceRoot,
        progress: &mut ProgressAccumulator,
        display: &ProgressDisplay,
    ) -> Result<()> {
        for chunk in chunks {
            if self.cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }

            let staged = workspace_root.stage(
                &self.config.input_dir,
                chunk,
                self.config.ignore_compressed,
            )?;

            let outcome = self.invoker.compress(
                chunk.index,
                &staged.path,
                &self.config.output_dir,
                &self.cancel,
                |stat| {
                    let snapshot = progress.record(stat);
                    display.update(&snapshot);
                },
            )?;

            debug!(
                "Chunk {} done: {} compressed, {} failed",
                chunk.index, outcome.delivered, outcome.failed
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new("in", "out");
        assert_eq!(config.chunk_size, 25);
        assert!(!config.ignore_compressed);
        assert!(config.jobs >= 1);
        assert!(config.temp_root.ends_with("batch-squeeze"));
        assert_eq!(RunConfig::default_output_dir(), PathBuf::from("dist/images"));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let input = TempDir::new().unwrap();
        let mut config = RunConfig::new(input.path(), input.path().join("out"));
        config.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(BatchError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_validate_missing_input() {
        let temp = TempDir::new().unwrap();
        let config = RunConfig::new(temp.path().join("missing"), temp.path().join("out"));
        assert!(matches!(
            config.validate(),
            Err(BatchError::InputDirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_output_that_contains_input() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("photos");
        fs::create_dir(&input).unwrap();

        let same = RunConfig::new(&input, &input);
        assert!(matches!(
            same.validate(),
            Err(BatchError::WouldRemoveInput { .. })
        ));

        let parent = RunConfig::new(&input, temp.path());
        assert!(matches!(
            parent.validate(),
            Err(BatchError::WouldRemoveInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_temp_root_that_contains_input() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("photos");
        fs::create_dir(&input).unwrap();

        let mut config = RunConfig::new(&input, temp.path().join("out"));
        config.temp_root = temp.path().to_path_buf();
        assert!(matches!(
            config.validate(),
            Err(BatchError::WouldRemoveInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_output_inside_temp_root() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("photos");
        fs::create_dir(&input).unwrap();

        let mut inside = RunConfig::new(&input, temp.path().join("scratch").join("out"));
        inside.temp_root = temp.path().join("scratch");
        assert!(matches!(
            inside.validate(),
            Err(BatchError::OutputInsideTempRoot { .. })
        ));

        let mut same = RunConfig::new(&input, temp.path().join("scratch"));
        same.temp_root = temp.path().join("scratch");
        assert!(matches!(
            same.validate(),
            Err(BatchError::OutputInsideTempRoot { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_sibling_directories() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("photos");
        fs::create_dir(&input).unwrap();

        let mut config = RunConfig::new(&input, temp.path().join("dist").join("images"));
        config.temp_root = temp.path().join(".temp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prepare_output_dir_removes_stale_files() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out");
        fs::create_dir_all(output.join("nested")).unwrap();
        fs::write(output.join("old.jpg"), b"stale").unwrap();
        fs::write(output.join("nested").join("older.png"), b"stale").unwrap();

        prepare_output_dir(&output).unwrap();

        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_prepare_output_dir_creates_missing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("dist").join("images");

        prepare_output_dir(&output).unwrap();
        assert!(output.is_dir());
    }
}
