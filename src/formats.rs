//! Image kinds the batch pipeline accepts.
//!
//! The allow-list is matched against the exact file extension, so `photo.JPG`
//! is not picked up while `photo.jpg` is.

use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Lossy, re-encoded at the configured quality
    Jpeg,
    /// Lossless, optimized with oxipng
    Png,
}

impl ImageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

/// Returns true when `path` carries one of the supported extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.jpeg")));
        assert!(is_supported_image(Path::new("test.png")));

        assert!(!is_supported_image(Path::new("test.webp")));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("test")));
        assert!(!is_supported_image(Path::new(".jpg")));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert!(!is_supported_image(Path::new("test.JPG")));
        assert!(!is_supported_image(Path::new("test.Png")));
        assert_eq!(ImageKind::from_extension("JPEG"), None);
    }

    #[test]
    fn test_image_kind_from_path() {
        assert_eq!(ImageKind::from_path(Path::new("a.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("a.jpeg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("a.png")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("a.gif")), None);
    }

    #[test]
    fn test_image_kind_display() {
        assert_eq!(format!("{}", ImageKind::Jpeg), "JPEG");
        assert_eq!(format!("{}", ImageKind::Png), "PNG");
    }
}
