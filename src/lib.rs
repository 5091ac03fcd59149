pub mod cancel;
pub mod chunking;
pub mod cli;
pub mod compressor;
pub mod constants;
pub mod error;
pub mod formats;
pub mod listing;
pub mod logger;
pub mod processing;
pub mod progress;
pub mod report;
pub mod run;
pub mod staging;
pub mod utils;

pub use cancel::CancelToken;
pub use chunking::{create_chunks, Chunk};
pub use compressor::{CompressionInvoker, CompressionStat, Compressor};
pub use error::{BatchError, Result};
pub use listing::{list_images, ImageFile};
pub use processing::{CompressionOptions, ImageCompressor};
pub use progress::{ProgressAccumulator, RunSummary};
pub use run::{Orchestrator, RunConfig, RunPhase};
pub use staging::{staged_name, StagedWorkspace, WorkspaceRoot};
