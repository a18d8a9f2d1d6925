//! Package handling: the zip container, entry location, and media.

pub mod archive;
pub mod locator;
pub mod media;

pub use archive::{ArchiveEntry, PackageArchive};
pub use locator::{locate, PackageLayout};

use thiserror::Error;

/// Errors while opening or reading a package container.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("could not open package: {0}")]
    Open(#[from] zip::result::ZipError),

    #[error("could not read package file: {0}")]
    Io(#[from] std::io::Error),

    #[error("package does not contain a collection database")]
    MissingCollection,

    #[error("could not extract '{name}' from package: {reason}")]
    Extract { name: String, reason: String },
}
