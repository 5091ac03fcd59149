//! Size conversions shared by the progress display and the final report.

use crate::constants::BYTES_PER_MEGABYTE;

/// Converts a byte count to megabytes, rounded to two decimals.
///
/// Small negative counts round to `0.0`, never `-0.0`.
pub fn bytes_to_megabytes(bytes: i64) -> f64 {
    let megabytes = ((bytes as f64 / BYTES_PER_MEGABYTE) * 100.0).round() / 100.0;
    if megabytes == 0.0 {
        0.0
    } else {
        megabytes
    }
}

/// Formats a byte count as a megabyte string, e.g. `"1.25 mb"`.
pub fn format_megabytes(bytes: i64) -> String {
    format!("{:.2} mb", bytes_to_megabytes(bytes))
}

/// Percentage of `original_size` saved by `compressed_size`, rounded to two
/// decimals. Negative when the file grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_megabytes() {
        assert_eq!(bytes_to_megabytes(0), 0.0);
        assert_eq!(bytes_to_megabytes(1024 * 1024), 1.0);
        assert_eq!(bytes_to_megabytes(1024 * 1024 * 3 / 2), 1.5);
        assert_eq!(bytes_to_megabytes(800), 0.0);
        assert_eq!(bytes_to_megabytes(-2 * 1024 * 1024), -2.0);
    }

    #[test]
    fn test_small_growth_formats_as_zero() {
        assert_eq!(format_megabytes(-100), "0.00 mb");
        assert!(bytes_to_megabytes(-100).is_sign_positive());
        assert_eq!(format_megabytes(-10 * 1024 * 1024), "-10.00 mb");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00 mb");
        assert_eq!(format_megabytes(1024 * 1024), "1.00 mb");
        assert_eq!(format_megabytes(5_452_595), "5.20 mb");
    }

    #[test]
    fn test_calculate_compression_ratio() {
        assert_eq!(calculate_compression_ratio(1000, 800), 20.0);
        assert_eq!(calculate_compression_ratio(1000, 1200), -20.0);
        assert_eq!(calculate_compression_ratio(1000, 1000), 0.0);
        assert_eq!(calculate_compression_ratio(0, 500), 0.0);
        assert_eq!(calculate_compression_ratio(3, 2), 33.33);
    }
}
