//! Disk-image sink for rebuilt scripts.
pub mod fat;

pub use fat::FatImage;
use thiserror::Error;

/// Directory inside the image holding the scenario scripts.
pub const IMAGE_SCRIPT_DIR: &str = "/EVE/";

#[derive(Debug, Error)]
/// Failures surfaced by the image writer. Each fails the file being written;
/// the batch continues.
pub enum ImageError {
    /// The path does not exist inside the image.
    #[error("path not found in image: {0}")]
    NotFound(String),
    /// Not enough free clusters for the new contents.
    #[error("not enough free space in image: need {needed} clusters, have {free}")]
    NoSpace { needed: usize, free: usize },
    /// The image's filesystem structures cannot be trusted.
    #[error("image corrupt: {0}")]
    ImageCorrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Replaces whole files inside a disk image. At most one writer may be open
/// per image at a time.
pub trait ImageWriter {
    fn replace_file(&mut self, path: &str, data: &[u8]) -> Result<(), ImageError>;
}

/// Absolute in-image path of a script, preserving the filename's case.
pub fn script_image_path(filename: &str) -> String {
    format!("{}{}", IMAGE_SCRIPT_DIR, filename)
}

#[test]
fn test_script_image_path() {
    assert_eq!(script_image_path("A001_6.CC"), "/EVE/A001_6.CC");
}
