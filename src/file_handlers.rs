//! File Handlers Module
//!
//! This module loads report documents from plain XML files, GZIP-compressed XML, and
//! ZIP archives. It enforces security checks such as file size limits, decompression
//! limits, entry count and compression ratio limits, and prevention of path traversal.

use crate::config::Config;
use crate::error::{DmarcError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

const BUFFER_SIZE: usize = 8192; // 8KB buffer

/// FileHandler loads the raw bytes of one or more reports from a file.
pub struct FileHandler<'a> {
    config: &'a Config,
}

impl<'a> FileHandler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Loads every report contained in the file at `path`, applying security checks.
    ///
    /// `.xml` and `.gz` files hold one report; each entry of a `.zip` is one report.
    pub fn load(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size as u64 {
            return Err(DmarcError::FileTooLarge(format!(
                "File size {} bytes exceeds limit of {} bytes",
                metadata.len(),
                self.config.max_file_size
            )));
        }
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        log::debug!("Loading {} as {:?}", path.display(), ext);
        match ext.as_deref() {
            Some("zip") => self.handle_zip(path),
            Some("gz") => self.handle_gzip(path),
            Some("xml") => self.handle_xml(path),
            Some(other) => Err(DmarcError::UnsupportedFile(format!(
                "Unsupported file extension: {}",
                other
            ))),
            None => Err(DmarcError::UnsupportedFile("No file extension".into())),
        }
    }

    fn handle_zip(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::with_capacity(BUFFER_SIZE, file))?;
        if archive.len() > self.config.max_files_in_zip {
            return Err(DmarcError::Format(format!(
                "Too many files in archive: {}",
                archive.len()
            )));
        }
        let mut reports = Vec::new();
        for i in 0..archive.len() {
            let file_in_zip = archive.by_index(i)?;
            if file_in_zip.is_dir() {
                continue;
            }
            let inner_name = file_in_zip.name().to_string();
            // Prevent path traversal
            if inner_name.contains("..") || inner_name.starts_with('/') || inner_name.starts_with('\\') {
                return Err(DmarcError::Format(format!(
                    "Path traversal attempt detected: {}",
                    inner_name
                )));
            }
            if inner_name.len() > self.config.max_filename_length {
                return Err(DmarcError::Format("Filename too long".to_string()));
            }
            let compressed_size = file_in_zip.compressed_size();
            let uncompressed_size = file_in_zip.size();
            if compressed_size > 0 {
                let compression_ratio = uncompressed_size as f64 / compressed_size as f64;
                if compression_ratio > self.config.max_compression_ratio {
                    return Err(DmarcError::Format(format!(
                        "Suspicious compression ratio: {:.2}",
                        compression_ratio
                    )));
                }
            }
            if uncompressed_size > self.config.max_decompressed_size as u64 {
                return Err(DmarcError::FileTooLarge(format!(
                    "Decompressed size of {} too large",
                    inner_name
                )));
            }
            // The declared size can lie, so the read itself is capped as well.
            let contents = read_limited(file_in_zip, self.config.max_decompressed_size, &inner_name)?;
            reports.push(non_empty(contents, &inner_name)?);
        }
        if reports.is_empty() {
            return Err(DmarcError::Format("No report files found in ZIP".into()));
        }
        Ok(reports)
    }

    fn handle_gzip(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        let file = File::open(path)?;
        let gz = GzDecoder::new(BufReader::with_capacity(BUFFER_SIZE, file));
        let name = path.display().to_string();
        let contents = read_limited(gz, self.config.max_decompressed_size, &name)?;
        Ok(vec![non_empty(contents, &name)?])
    }

    fn handle_xml(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        let contents = std::fs::read(path)?;
        Ok(vec![non_empty(contents, &path.display().to_string())?])
    }
}

/// Reads at most `limit` bytes, failing if the source holds more.
fn read_limited<R: Read>(reader: R, limit: usize, name: &str) -> Result<Vec<u8>> {
    let mut contents = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut contents)?;
    if contents.len() > limit {
        return Err(DmarcError::FileTooLarge(format!(
            "Decompressed size of {} exceeds limit of {} bytes",
            name, limit
        )));
    }
    Ok(contents)
}

fn non_empty(contents: Vec<u8>, name: &str) -> Result<Vec<u8>> {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Err(DmarcError::Format(format!("Empty file: {}", name)));
    }
    Ok(contents)
}
