use crate::error::{BatchError, Result};
use crate::formats::is_supported_image;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A filename known to exist in the input directory.
pub type ImageFile = String;

/// Lists the supported images directly inside `dir`.
///
/// Subdirectories and files with other extensions are left out, and the
/// directory is not descended into. Entries come back in the order the
/// filesystem enumerates them; no sorting is applied, so callers must not
/// rely on any particular order.
///
/// # Errors
/// * `InputDirectoryNotFound` if `dir` does not exist or is not a directory
/// * `ListingFailed` if the directory cannot be enumerated
pub fn list_images(dir: &Path) -> Result<Vec<ImageFile>> {
    if !dir.is_dir() {
        return Err(BatchError::InputDirectoryNotFound(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| BatchError::ListingFailed {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if !path.is_file() || !is_supported_image(path) {
            continue;
        }

        match entry.file_name().to_str() {
            Some(name) => images.push(name.to_string()),
            None => warn!("Skipping non UTF-8 file name: {:?}", entry.file_name()),
        }
    }

    debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}
