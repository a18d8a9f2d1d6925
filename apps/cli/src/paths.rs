//! On-disk layout of the application's data directory.

use std::path::{Path, PathBuf};

/// Resolves every path the application writes under one root.
#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/packdrill`.
    pub fn default_root() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("packdrill")
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("cards.db")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Per-deck media directory.
    pub fn media_dir(&self, short_name: &str) -> PathBuf {
        self.root.join("media").join(short_name)
    }

    /// Scratch location for the collection database pulled out of a
    /// package. Removed again after each import.
    pub fn staging_path(&self) -> PathBuf {
        self.root.join("tmp").join("collection.sqlite3")
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
