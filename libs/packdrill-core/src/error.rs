//! Error types for packdrill-core.

use thiserror::Error;

/// Errors from the card extraction strategy chain.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Every strategy ran and none produced a single card. The counts
    /// describe what was examined so the caller can tell an empty package
    /// from a mapping that matched nothing.
    #[error(
        "no cards could be extracted ({notes} notes and {cards} card rows examined); \
         adjust the field mapping and re-import"
    )]
    NoCardsProduced { notes: usize, cards: usize },
}

/// Errors from decoding the collection's `models` JSON column. A failure
/// at the document level degrades to an empty model set; a failure at the
/// entry level skips that entry. Neither aborts an import.
#[derive(Debug, Error)]
pub enum ModelDecodeError {
    #[error("model metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model metadata is not a JSON object")]
    NotAnObject,

    #[error("model entry {id} is malformed: {source}")]
    BadEntry {
        id: String,
        source: serde_json::Error,
    },

    #[error("model entry {id} declares no fields")]
    NoFields { id: String },
}
