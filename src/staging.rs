use crate::chunking::Chunk;
use crate::constants::{CHUNK_DIR_PREFIX, COMPRESSED_PREFIX, RUN_DIR_PREFIX};
use crate::error::{BatchError, CopyFailure, NameCollision, Result};
use crate::listing::ImageFile;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name a file gets inside a chunk workspace, or `None` when it is skipped.
///
/// With `ignore_compressed` set, files that already carry the
/// `compressed-` prefix are skipped. Otherwise they keep their name, and
/// every other file gets the prefix prepended.
pub fn staged_name(file: &str, ignore_compressed: bool) -> Option<String> {
    let already_compressed = file.starts_with(COMPRESSED_PREFIX);
    match (already_compressed, ignore_compressed) {
        (true, true) => None,
        (true, false) => Some(file.to_string()),
        (false, _) => Some(format!("{}{}", COMPRESSED_PREFIX, file)),
    }
}

/// Number of files in `images` that will actually be staged.
pub fn count_staged(images: &[ImageFile], ignore_compressed: bool) -> usize {
    images
        .iter()
        .filter(|file| staged_name(file, ignore_compressed).is_some())
        .count()
}

/// Finds source files that would end up under the same staged name.
///
/// All chunks write into one output directory, so a collision anywhere in
/// the run would silently overwrite a result.
pub fn find_name_collisions(images: &[ImageFile], ignore_compressed: bool) -> Vec<NameCollision> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut collisions = Vec::new();

    for file in images {
        let Some(staged) = staged_name(file, ignore_compressed) else {
            continue;
        };
        if let Some(first) = seen.get(&staged) {
            collisions.push(NameCollision {
                first: first.to_string(),
                second: file.clone(),
                staged_name: staged,
            });
        } else {
            seen.insert(staged, file.as_str());
        }
    }

    collisions
}

/// A chunk's files, copied and renamed into their own directory.
#[derive(Debug, Clone)]
pub struct StagedWorkspace {
    pub path: PathBuf,
    /// Staged file names, in chunk order
    pub staged: Vec<String>,
    /// Files left out by the ignore flag
    pub skipped: usize,
}

/// A run's private directory under the reserved temp root.
///
/// Every chunk workspace of the run lives inside it until the run ends.
/// Only this directory is ever deleted. The reserved root itself is removed
/// only once it is empty, so other runs and foreign files in it survive.
/// If the guard is dropped without `cleanup` (a fatal error path) the run
/// directory is still removed, best effort.
#[derive(Debug)]
pub struct WorkspaceRoot {
    reserved: PathBuf,
    path: PathBuf,
    cleaned: bool,
}

impl WorkspaceRoot {
    /// Creates a fresh, uniquely named run directory under `reserved`.
    ///
    /// # Arguments
    /// * `reserved` - The temp root, created if missing
    ///
    /// # Errors
    /// * `BatchError::DirectoryCreationFailed` - If either directory cannot be created
    pub fn create(reserved: &Path) -> Result<Self> {
        let creation_failed = |source: io::Error| BatchError::DirectoryCreationFailed {
            path: reserved.to_path_buf(),
            source,
        };

        fs::create_dir_all(reserved).map_err(creation_failed)?;
        let path = tempfile::Builder::new()
            .prefix(RUN_DIR_PREFIX)
            .tempdir_in(reserved)
            .map_err(creation_failed)?
            .keep();
        debug!("Created run workspace {}", path.display());

        Ok(Self {
            reserved: reserved.to_path_buf(),
            path,
            cleaned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies `chunk` from `input_dir` into a fresh, uniquely named workspace.
    ///
    /// Copies run in parallel and all of them have finished when this
    /// returns. If any copy fails the error lists every failed file;
    /// files that did copy stay in place until the root is cleaned up.
    ///
    /// # Arguments
    /// * `input_dir` - Directory the chunk's file names are relative to
    /// * `chunk` - Files to stage
    /// * `ignore_compressed` - Skip files already carrying the `compressed-` prefix
    ///
    /// # Errors
    /// * `BatchError::DirectoryCreationFailed` - If the workspace cannot be created
    /// * `BatchError::StagingFailed` - Lists every file that could not be copied
    pub fn stage(
        &self,
        input_dir: &Path,
        chunk: &Chunk,
        ignore_compressed: bool,
    ) -> Result<StagedWorkspace> {
        let workspace = tempfile::Builder::new()
            .prefix(CHUNK_DIR_PREFIX)
            .tempdir_in(&self.path)
            .map_err(|source| BatchError::DirectoryCreationFailed {
                path: self.path.clone(),
                source,
            })?
            .keep();

        let plan: Vec<(&ImageFile, String)> = chunk
            .files
            .iter()
            .filter_map(|file| staged_name(file, ignore_compressed).map(|staged| (file, staged)))
            .collect();
        let skipped = chunk.len() - plan.len();

        let failures: Vec<CopyFailure> = plan
            .par_iter()
            .filter_map(|(file, staged)| {
                fs::copy(input_dir.join(file.as_str()), workspace.join(staged))
                    .err()
                    .map(|source| CopyFailure {
                        file: file.to_string(),
                        source,
                    })
            })
            .collect();

        if !failures.is_empty() {
            return Err(BatchError::StagingFailed {
                workspace,
                failures,
            });
        }

        debug!(
            "Staged chunk {} into {} ({} copied, {} skipped)",
            chunk.index,
            workspace.display(),
            plan.len(),
            skipped
        );

        Ok(StagedWorkspace {
            path: workspace,
            staged: plan.into_iter().map(|(_, staged)| staged).collect(),
            skipped,
        })
    }

    /// Removes the run directory and every workspace under it.
    ///
    /// # Errors
    /// * `BatchError::TempCleanupFailed` - If the run directory cannot be removed
    pub fn cleanup(mut self) -> Result<()> {
        self.cleaned = true;
        remove_tree(&self.path).map_err(|source| BatchError::TempCleanupFailed {
            path: self.path.clone(),
            source,
        })?;
        release_reserved(&self.reserved);
        Ok(())
    }
}

impl Drop for WorkspaceRoot {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        if let Err(e) = remove_tree(&self.path) {
            warn!(
                "Failed to remove temporary workspace {}: {}",
                self.path.display(),
                e
            );
            return;
        }
        release_reserved(&self.reserved);
    }
}

/// Removes the reserved root if nothing else is left in it.
fn release_reserved(reserved: &Path) {
    if fs::remove_dir(reserved).is_ok() {
        debug!("Removed empty temp root {}", reserved.display());
    }
}

fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
