//! Locating DICOM files in input directories
//!
//! All listings are sorted so repeated runs over the same directory visit
//! files in the same order.

use log::info;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Checks if a file has a DICOM header
///
/// DICOM files typically have:
/// - 128-byte preamble
/// - 4-byte "DICM" magic string at offset 128
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

/// Accepts `.dcm`/`.dicom` files, and extensionless files with a DICOM header
fn is_candidate(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom"),
        None => {
            let found = is_dicom_file(path);
            if found {
                info!("Found headerless DICOM file: {}", path.display());
            }
            found
        }
    }
}

/// DICOM files directly inside `directory`, sorted by path
pub fn collect_dicom_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && is_candidate(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// DICOM files anywhere below `directory`, sorted by path
pub fn collect_dicom_files_recursive(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = collect_dicom_files(directory)?;
    for sub in list_subdirectories(directory)? {
        files.extend(collect_dicom_files_recursive(&sub)?);
    }
    files.sort();
    Ok(files)
}

/// Immediate subdirectories of `directory`, sorted by path
///
/// Symbolic links to directories are not followed.
pub fn list_subdirectories(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
