//! Media extraction.
//!
//! A package may carry a `media` index: a JSON object mapping archive
//! entry names (usually bare numbers) to real filenames. Mapped entries
//! are copied into the deck's media directory. Nothing here is fatal:
//! a missing or malformed index means no media, and a file that fails to
//! extract is skipped.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use super::PackageArchive;

/// Decode the media index. Absent or undecodable content yields an empty
/// map.
pub fn decode_media_map(bytes: Option<&[u8]>) -> HashMap<String, String> {
    let Some(bytes) = bytes else {
        return HashMap::new();
    };
    match serde_json::from_slice(bytes) {
        Ok(map) => map,
        Err(err) => {
            warn!(error = %err, "media index is not a JSON object, skipping media");
            HashMap::new()
        }
    }
}

/// Replace path separators so a mapped filename cannot escape the media
/// directory.
pub fn sanitize_media_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Extract every mapped entry into `media_dir`. Returns how many files
/// were written; failures are logged and skipped.
pub fn extract_media(
    archive: &mut PackageArchive,
    media_map: &HashMap<String, String>,
    media_dir: &Path,
) -> usize {
    if media_map.is_empty() {
        return 0;
    }

    let mut written = 0;
    for entry in archive.entries() {
        if entry.is_dir {
            continue;
        }
        let Some(filename) = media_map.get(&entry.name) else {
            continue;
        };
        let dest = media_dir.join(sanitize_media_name(filename));
        match archive.extract_to(&entry.name, &dest) {
            Ok(()) => written += 1,
            Err(err) => {
                warn!(entry = %entry.name, error = %err, "skipping media file");
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_a_media_index() {
        let map = decode_media_map(Some(br#"{"0": "bonjour.mp3", "1": "paris.jpg"}"#));
        assert_eq!(map.len(), 2);
        assert_eq!(map["0"], "bonjour.mp3");
    }

    #[test]
    fn garbage_index_is_empty_not_fatal() {
        assert!(decode_media_map(Some(b"[not, an, object")).is_empty());
        assert!(decode_media_map(None).is_empty());
    }

    #[test]
    fn sanitizes_path_separators() {
        assert_eq!(sanitize_media_name("a/b\\c.jpg"), "a_b_c.jpg");
        assert_eq!(sanitize_media_name("../../etc/passwd"), ".._.._etc_passwd");
    }
}
