//! Locating the collection database and media index inside a package.

use super::{ArchiveEntry, PackageError};

/// Collection filename used by current exporters.
pub const COLLECTION_CURRENT: &str = "collection.anki21";

/// Collection filename used by legacy exporters.
pub const COLLECTION_LEGACY: &str = "collection.anki2";

/// Where the interesting entries live inside a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub collection: String,
    pub media: Option<String>,
}

/// Scan the entry list once. A current-format collection entry wins over
/// a legacy one; a package with neither is rejected. The media index is
/// the first entry named `media` (bare or at the end of a path).
pub fn locate(entries: &[ArchiveEntry]) -> Result<PackageLayout, PackageError> {
    let mut current = None;
    let mut legacy = None;
    let mut media = None;

    for entry in entries.iter().filter(|e| !e.is_dir) {
        if entry.name.ends_with(COLLECTION_CURRENT) {
            current.get_or_insert_with(|| entry.name.clone());
        } else if entry.name.ends_with(COLLECTION_LEGACY) {
            legacy.get_or_insert_with(|| entry.name.clone());
        }
        if media.is_none() && (entry.name == "media" || entry.name.ends_with("/media")) {
            media = Some(entry.name.clone());
        }
    }

    let collection = current.or(legacy).ok_or(PackageError::MissingCollection)?;
    Ok(PackageLayout { collection, media })
}
