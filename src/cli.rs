use crate::constants::{CHUNK_SIZE, COMPRESSED_PREFIX, DEFAULT_OUTPUT_DIR, ERROR_PREFIX};
use crate::error::{BatchError, Result};
use crate::listing::list_images;
use crate::processing::CompressionOptions;
use crate::report::{clear_screen, print_directory_summary};
use crate::run::RunConfig;
use clap::Parser;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "batch-squeeze",
    about = "Batch-compress the images of a directory, 25 at a time",
    long_about = "batch-squeeze compresses every JPEG and PNG image in a directory. \
                  Images are copied in chunks of 25 into a temporary workspace, renamed with a \
                  'compressed-' prefix, and compressed into the output directory while a live \
                  progress bar tracks the space saved. Without --input the tool asks for its \
                  settings interactively.",
    version,
    after_help = "EXAMPLES:\n  \
    batch-squeeze\n  \
    batch-squeeze --input ./src/images --output ./dist/images\n  \
    batch-squeeze -i ./photos --ignore-compressed -q 60 -j 4"
)]
pub struct Args {
    #[arg(
        short = 'i',
        long,
        help = "Input images directory",
        long_help = "Directory whose .jpg, .jpeg and .png files are compressed. \
                     Subdirectories are not scanned. Passing it skips the interactive prompts."
    )]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        help = "Output directory (default: dist/images)",
        long_help = "Directory receiving the compressed images. \
                     It is removed and recreated at the start of every run."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Skip files whose name starts with 'compressed-'",
        long_help = "Skip input files that already carry the 'compressed-' prefix \
                     instead of compressing them again."
    )]
    pub ignore_compressed: bool,

    #[arg(
        short = 'q',
        long,
        help = "JPEG quality (1-100, default: 40)"
    )]
    pub quality: Option<u8>,

    #[arg(
        long,
        help = "PNG optimization level (0-6, default: 2)",
        long_help = "oxipng preset used for lossless PNG optimization. \
                     Higher levels are slower and usually smaller."
    )]
    pub png_level: Option<u8>,

    #[arg(
        short = 'j',
        long,
        help = "Number of parallel threads per chunk (default: auto)"
    )]
    pub jobs: Option<usize>,

    #[arg(long, default_value_t = CHUNK_SIZE, help = "Number of images per chunk")]
    pub chunk_size: usize,

    #[arg(
        long,
        help = "Directory for temporary chunk workspaces",
        long_help = "Reserved directory holding the chunk workspaces. \
                     It is deleted recursively when the run ends. \
                     Defaults to 'batch-squeeze' inside the system temp directory."
    )]
    pub temp_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Seconds a chunk may run before the run is aborted (0 disables, default: 600)"
    )]
    pub chunk_timeout: Option<u64>,

    #[arg(short = 'v', long, help = "Print debug logs")]
    pub verbose: bool,

    #[arg(long, conflicts_with = "verbose", help = "Hide the progress bar and warnings")]
    pub quiet: bool,
}

/// What the user picked for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ignore_compressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Change,
    Start,
}

impl Args {
    /// The selection given on the command line, or `None` when the user
    /// should be prompted.
    pub fn selection_from_flags(&self) -> Option<Selection> {
        let input = self.input.clone()?;
        Some(Selection {
            input,
            output: self
                .output
                .clone()
                .unwrap_or_else(RunConfig::default_output_dir),
            ignore_compressed: self.ignore_compressed,
        })
    }

    pub fn compression_options(&self) -> Result<CompressionOptions> {
        CompressionOptions::new(self.quality, self.png_level)
    }

    pub fn build_config(&self, selection: Selection, compression: CompressionOptions) -> RunConfig {
        let mut config = RunConfig::new(selection.input, selection.output);
        config.ignore_compressed = selection.ignore_compressed;
        config.chunk_size = self.chunk_size;
        config.compression = compression;
        config.show_progress = !self.quiet;

        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(dir) = &self.temp_dir {
            config.temp_root = dir.clone();
        }
        if let Some(secs) = self.chunk_timeout {
            config.chunk_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config
    }
}

pub fn validate_input_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(BatchError::InputDirectoryNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Prompts until the user chooses to start.
///
/// A missing input directory is reported inline and asked for again.
pub fn select_interactively() -> Result<Selection> {
    let theme = ColorfulTheme::default();

    loop {
        let selection = prompt_selection(&theme)?;
        clear_screen();

        let images = list_images(&selection.input)?;
        print_directory_summary(images.len(), &selection.input, &selection.output);

        let action = prompt_next_action(&theme)?;
        clear_screen();

        match action {
            NextAction::Change => continue,
            NextAction::Start => return Ok(selection),
        }
    }
}

fn prompt_selection(theme: &ColorfulTheme) -> Result<Selection> {
    let input: String = Input::with_theme(theme)
        .with_prompt(format!(
            "Please define your {} images directory {}",
            style("INPUT").yellow().bright().bold(),
            style("( e.g src/images )").dim()
        ))
        .validate_with(|value: &String| -> std::result::Result<(), String> {
            validate_input_dir(Path::new(value))
                .map_err(|e| format!("{} {}", ERROR_PREFIX, e))
        })
        .interact_text()?;

    let output: String = Input::with_theme(theme)
        .with_prompt(format!(
            "Please define your {} images directory",
            style("OUTPUT").yellow().bright().bold()
        ))
        .default(DEFAULT_OUTPUT_DIR.to_string())
        .interact_text()?;

    let ignore_compressed = Confirm::with_theme(theme)
        .with_prompt(format!(
            "Do you want to ignore files that start with {} ?",
            style(COMPRESSED_PREFIX).cyan()
        ))
        .default(false)
        .interact()?;

    Ok(Selection {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        ignore_compressed,
    })
}

fn prompt_next_action(theme: &ColorfulTheme) -> Result<NextAction> {
    let choices = ["Change input/output", "Start compression process"];
    let index = Select::with_theme(theme)
        .with_prompt("To continue please choose one of these actions")
        .items(&choices)
        .default(1)
        .interact()?;

    Ok(if index == 0 {
        NextAction::Change
    } else {
        NextAction::Start
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_input_means_interactive() {
        let args = Args::parse_from(["batch-squeeze"]);
        assert_eq!(args.selection_from_flags(), None);
    }

    #[test]
    fn test_selection_from_flags_defaults_output() {
        let args = Args::parse_from(["batch-squeeze", "--input", "photos"]);
        assert_eq!(
            args.selection_from_flags(),
            Some(Selection {
                input: PathBuf::from("photos"),
                output: PathBuf::from("dist/images"),
                ignore_compressed: false,
            })
        );
    }

    #[test]
    fn test_build_config_applies_flags() {
        let args = Args::parse_from([
            "batch-squeeze",
            "-i",
            "photos",
            "-o",
            "out",
            "--ignore-compressed",
            "-q",
            "70",
            "-j",
            "3",
            "--chunk-size",
            "10",
            "--temp-dir",
            "scratch",
            "--chunk-timeout",
            "0",
            "--quiet",
        ]);
        let selection = args.selection_from_flags().unwrap();
        let options = args.compression_options().unwrap();
        let config = args.build_config(selection, options);

        assert!(config.ignore_compressed);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.compression.quality, 70);
        assert_eq!(config.jobs, 3);
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.temp_root, PathBuf::from("scratch"));
        assert_eq!(config.chunk_timeout, None);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_invalid_quality_is_rejected() {
        let args = Args::parse_from(["batch-squeeze", "-q", "0"]);
        assert!(matches!(
            args.compression_options(),
            Err(BatchError::InvalidQuality(0))
        ));
    }

    #[test]
    fn test_validate_input_dir() {
        let temp = TempDir::new().unwrap();
        assert!(validate_input_dir(temp.path()).is_ok());
        assert!(matches!(
            validate_input_dir(&temp.path().join("missing")),
            Err(BatchError::InputDirectoryNotFound(_))
        ));
    }
}
