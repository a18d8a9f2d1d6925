//! Reading the collection database extracted from a package.

pub mod extract;
pub mod inspect;

use thiserror::Error;

/// Errors opening or querying a collection database. Only failure to open
/// is fatal to an import; individual queries degrade to empty row sets.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
