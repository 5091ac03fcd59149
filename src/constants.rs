use std::time::Duration;

/// Number of images staged and compressed together.
pub const CHUNK_SIZE: usize = 25;

/// Width of the textual progress bar, in characters.
pub const PROGRESS_BAR_WIDTH: usize = 25;

/// Filename marker for images that already went through the compressor.
pub const COMPRESSED_PREFIX: &str = "compressed-";

/// Extensions picked up from the input directory. Matching is case-sensitive.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub const DEFAULT_OUTPUT_DIR: &str = "dist/images";
pub const TEMP_ROOT_DIR_NAME: &str = "batch-squeeze";
pub const RUN_DIR_PREFIX: &str = "run-";
pub const CHUNK_DIR_PREFIX: &str = "chunk-";

pub const DEFAULT_JPEG_QUALITY: u8 = 40;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_PNG_LEVEL: u8 = 2;
pub const MAX_PNG_LEVEL: u8 = 6;

// Security limits, checked before an image is decoded
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 20_000;

pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(600);

/// Capacity of the stat channel between compression workers and the orchestrator.
pub const STAT_CHANNEL_CAPACITY: usize = CHUNK_SIZE * 2;

pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

// Exit codes
pub const EXIT_INVALID_INPUT: i32 = 1;
pub const EXIT_FILESYSTEM_ERROR: i32 = 2;
pub const EXIT_COMPRESSION_ERROR: i32 = 3;
pub const EXIT_CANCELLED: i32 = 130;

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✔";
pub const INFO_PREFIX: &str = "ℹ";
pub const WARNING_PREFIX: &str = "⚠";
pub const ERROR_PREFIX: &str = "✖";
