//! Zip container access.
//!
//! Thin wrapper around [`zip::ZipArchive`]: enumerate entries, read one
//! into memory, or materialize one at a path. Entry names are used as-is;
//! destination sanitization is the media resolver's job.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use zip::ZipArchive;

use super::PackageError;

/// One container entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
}

/// An opened package container.
pub struct PackageArchive {
    archive: ZipArchive<File>,
}

impl PackageArchive {
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { archive })
    }

    /// Every entry in the container. The list is finite and can be taken
    /// again; ordering follows the central directory.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.archive
            .file_names()
            .map(|name| ArchiveEntry {
                is_dir: name.ends_with('/'),
                name: name.to_string(),
            })
            .collect()
    }

    /// Read one entry fully into memory. `None` when the entry does not
    /// exist or cannot be read.
    pub fn read(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut entry = self.archive.by_name(name).ok()?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).ok()?;
        Some(bytes)
    }

    /// Materialize one entry at `dest`, creating parent directories.
    pub fn extract_to(&mut self, name: &str, dest: &Path) -> Result<(), PackageError> {
        let extract = |archive: &mut ZipArchive<File>| -> Result<(), String> {
            let mut entry = archive.by_name(name).map_err(|e| e.to_string())?;
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            let mut out = File::create(dest).map_err(|e| e.to_string())?;
            io::copy(&mut entry, &mut out).map_err(|e| e.to_string())?;
            Ok(())
        };
        extract(&mut self.archive).map_err(|reason| PackageError::Extract {
            name: name.to_string(),
            reason,
        })
    }
}
