use crate::error::{BatchError, Result};
use crate::listing::ImageFile;

/// A bounded, ordered slice of the image list processed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the run, starting at 0
    pub index: usize,
    pub files: Vec<ImageFile>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Splits `images` into contiguous chunks of at most `size` files.
///
/// Order is preserved and every file lands in exactly one chunk. An empty
/// list yields no chunks at all.
///
/// # Arguments
/// * `images` - The full listing, in the order it should be processed
/// * `size` - Maximum number of files per chunk
///
/// # Returns
/// * `Ok(chunks)` - `ceil(images.len() / size)` chunks, all but the last full
///
/// # Errors
/// * `BatchError::InvalidChunkSize` - If `size` is 0
pub fn create_chunks(images: &[ImageFile], size: usize) -> Result<Vec<Chunk>> {
    if size == 0 {
        return Err(BatchError::InvalidChunkSize(size));
    }

    Ok(images
        .chunks(size)
        .enumerate()
        .map(|(index, files)| Chunk {
            index,
            files: files.to_vec(),
        })
        .collect())
}
