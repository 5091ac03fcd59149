#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a real gradient image; the format follows the extension.
pub fn create_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x ^ y) & 0xFF) as u8,
        ])
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// `count` files named `img-00.jpg`, `img-01.jpg`, ... filled with fake bytes.
pub fn create_fake_images(dir: &Path, count: usize, size: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("img-{:02}.jpg", i));
            File::create(&path)
                .unwrap()
                .write_all(&vec![0xAB; size])
                .unwrap();
            path
        })
        .collect()
}

pub fn create_text_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    path
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
