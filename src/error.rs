use crate::constants::{
    EXIT_CANCELLED, EXIT_COMPRESSION_ERROR, EXIT_FILESYSTEM_ERROR, EXIT_INVALID_INPUT,
};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A single file that could not be copied into a chunk workspace.
#[derive(Debug)]
pub struct CopyFailure {
    pub file: String,
    pub source: std::io::Error,
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.source)
    }
}

/// Two source files that would be written under the same staged name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub first: String,
    pub second: String,
    pub staged_name: String,
}

impl fmt::Display for NameCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {} -> {}", self.first, self.second, self.staged_name)
    }
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input directory not found: {0}")]
    InputDirectoryNotFound(PathBuf),

    #[error("Clearing {target} would remove the input directory {input}")]
    WouldRemoveInput { input: PathBuf, target: PathBuf },

    #[error("Output directory {output} is inside the temporary root {temp_root}")]
    OutputInsideTempRoot { output: PathBuf, temp_root: PathBuf },

    #[error("Staged file names collide: {}", join_display(.0))]
    NameCollision(Vec<NameCollision>),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid PNG optimization level: {0}. Must be between 0 and 6")]
    InvalidPngLevel(u8),

    #[error("Invalid chunk size: {0}. Must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Failed to list images in {path}: {source}")]
    ListingFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to clear output directory {path}: {source}")]
    OutputDirectoryCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage {} file(s) into {workspace}: {}", .failures.len(), join_display(.failures))]
    StagingFailed {
        workspace: PathBuf,
        failures: Vec<CopyFailure>,
    },

    #[error("Compression failed for {file}: {reason}")]
    CompressionFailed { file: PathBuf, reason: String },

    #[error("Failed to copy {file} through after its compression failed: {source}")]
    CopyThroughFailed {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chunk {index} did not finish within {timeout:?}")]
    ChunkTimedOut { index: usize, timeout: Duration },

    #[error("Failed to remove temporary workspace {path}: {source}")]
    TempCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::InputDirectoryNotFound(_)
            | BatchError::WouldRemoveInput { .. }
            | BatchError::OutputInsideTempRoot { .. }
            | BatchError::NameCollision(_)
            | BatchError::InvalidQuality(_)
            | BatchError::InvalidPngLevel(_)
            | BatchError::InvalidChunkSize(_)
            | BatchError::Prompt(_) => EXIT_INVALID_INPUT,
            BatchError::ListingFailed { .. }
            | BatchError::OutputDirectoryCleanupFailed { .. }
            | BatchError::DirectoryCreationFailed { .. }
            | BatchError::StagingFailed { .. }
            | BatchError::CopyThroughFailed { .. }
            | BatchError::TempCleanupFailed { .. }
            | BatchError::Pattern(_)
            | BatchError::Io(_) => EXIT_FILESYSTEM_ERROR,
            BatchError::CompressionFailed { .. }
            | BatchError::ChunkTimedOut { .. }
            | BatchError::ThreadPool(_)
            | BatchError::ImageProcessing(_)
            | BatchError::PngOptimization(_)
            | BatchError::FileTooLarge(..)
            | BatchError::InvalidDimensions(..)
            | BatchError::UnsupportedFormat(_) => EXIT_COMPRESSION_ERROR,
            BatchError::Cancelled => EXIT_CANCELLED,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
