//! Utilities for File Operations
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads the content of a file.
pub fn read_file<F: AsRef<Path> + ?Sized>(f: &F) -> io::Result<Vec<u8>> {
    fs::read(f)
}

/// Writes content to a file, creating the parent directory if necessary.
pub fn write_file<F: AsRef<Path> + ?Sized>(f: &F, data: &[u8]) -> io::Result<()> {
    make_sure_dir_exists(f)?;
    fs::write(f, data)
}

/// Ensures that the parent directory for the specified path exists, creating it if necessary.
pub fn make_sure_dir_exists<F: AsRef<Path> + ?Sized>(f: &F) -> io::Result<()> {
    let path = f.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Collects all regular files in the specified directory, sorted by name.
pub fn collect_dir_files(path: &str) -> io::Result<Vec<PathBuf>> {
    let dir_path = Path::new(path);
    if !dir_path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Path {} is not a directory", dir_path.display()),
        ));
    }
    let mut result = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}
