use crate::compressor::Compressor;
use crate::constants::{
    DEFAULT_JPEG_QUALITY, DEFAULT_PNG_LEVEL, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION, MAX_PNG_LEVEL,
    MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{BatchError, Result};
use crate::formats::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use oxipng::Options;
use std::fs;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    /// JPEG re-encode quality, 1-100
    pub quality: u8,
    /// oxipng preset, 0-6
    pub png_level: u8,
}

impl CompressionOptions {
    pub fn new(quality: Option<u8>, png_level: Option<u8>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(BatchError::InvalidQuality(quality));
        }

        let png_level = png_level.unwrap_or(DEFAULT_PNG_LEVEL);
        if png_level > MAX_PNG_LEVEL {
            return Err(BatchError::InvalidPngLevel(png_level));
        }

        Ok(Self { quality, png_level })
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            png_level: DEFAULT_PNG_LEVEL,
        }
    }
}

/// The built-in engine: JPEG re-encode and lossless PNG optimization.
///
/// A result that is not smaller than its input is discarded and the input
/// bytes are written instead, so output never exceeds input.
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    options: CompressionOptions,
}

impl ImageCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }
}

impl Compressor for ImageCompressor {
    /// Compresses `input` into `output` according to the file's extension.
    ///
    /// # Arguments
    /// * `input` - Staged image file
    /// * `output` - Destination path, overwritten if present
    ///
    /// # Returns
    /// * `Ok(size)` - Bytes written to `output`
    ///
    /// # Errors
    /// * `BatchError::UnsupportedFormat` - If the extension is not JPEG or PNG
    /// * `BatchError::FileTooLarge` - If the input exceeds the size limit
    /// * `BatchError::CompressionFailed` - If decoding, encoding or optimizing fails
    fn compress_file(&self, input: &Path, output: &Path) -> Result<u64> {
        let kind = ImageKind::from_path(input)
            .ok_or_else(|| BatchError::UnsupportedFormat(input.display().to_string()))?;

        let original = read_image_bytes(input)?;
        let encoded = match kind {
            ImageKind::Jpeg => encode_jpeg(&original, self.options.quality),
            ImageKind::Png => optimize_png(&original, self.options.png_level),
        }
        .map_err(|e| BatchError::CompressionFailed {
            file: input.to_path_buf(),
            reason: e.to_string(),
        })?;

        let best = if encoded.len() < original.len() {
            &encoded
        } else {
            &original
        };
        fs::write(output, best)?;

        Ok(best.len() as u64)
    }
}

/// Reads an image file, refusing anything over the size limit.
///
/// # Errors
/// * `BatchError::FileTooLarge` - If the file is larger than `MAX_FILE_SIZE`
/// * `BatchError::Io` - If the file cannot be read
pub fn read_image_bytes(input: &Path) -> Result<Vec<u8>> {
    let file_size = fs::metadata(input)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(BatchError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }
    Ok(fs::read(input)?)
}

/// Decodes image bytes, refusing dimensions over the limit.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(BatchError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok(img)
}

/// Re-encodes image bytes as a JPEG at the given quality.
///
/// Any decodable source works; an alpha channel is dropped.
///
/// # Arguments
/// * `data` - Encoded source image
/// * `quality` - JPEG quality, 1-100
pub fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = decode_image(data)?;

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;

    Ok(buffer)
}

pub fn optimize_png(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let options = Options::from_preset(level);
    oxipng::optimize_from_memory(data, &options)
        .map_err(|e| BatchError::PngOptimization(e.to_string()))
}
