//! The import pipeline.
//!
//! Opens the package container, locates and stages the collection
//! database, reads its rows, runs the extraction chain, and lands the
//! result in the card store together with the raw source notes and any
//! mapped media. Also the rebuild path, which replays stored source
//! notes through the extractor under the deck's current mapping without
//! touching the original package.

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use packdrill_core::{
    extract_cards, ExtractError, ExtractionInput, InspectionSnapshot, ModelSet, NoteRecord,
    SourceNote, Strategy,
};

use crate::collection::extract::load_rows;
use crate::collection::inspect::{inspect_collection, open_read_only};
use crate::collection::CollectionError;
use crate::db::{CardStore, DbError};
use crate::package::media::{decode_media_map, extract_media};
use crate::package::{locate, PackageArchive, PackageError};
use crate::paths::{ensure_parent, AppPaths};
use crate::settings::{SettingsError, SettingsStore};

/// Failures of the import pipeline, in the order the stages can hit
/// them. Store failures are distinct from extraction failures: when one
/// surfaces, cards were produced but not saved.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("could not open collection database: {0}")]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("cards were extracted but could not be saved: {0}")]
    Store(#[from] DbError),

    #[error("could not update settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("could not stage collection database: {0}")]
    Stage(#[source] std::io::Error),

    #[error("deck '{0}' does not exist")]
    UnknownDeck(String),

    #[error("deck '{0}' has no stored field mapping; set one with `packdrill map`")]
    MissingMapping(String),
}

/// What an import did, including the diagnostics a caller needs to see
/// when extraction fell back down the strategy chain.
#[derive(Debug)]
pub struct ImportSummary {
    pub deck_id: i64,
    pub deck_name: String,
    pub short_name: String,
    pub inserted: usize,
    pub strategy: Strategy,
    pub source_notes: usize,
    pub source_cards: usize,
    pub media_files: usize,
}

#[derive(Debug, Default)]
pub struct ImportOptions {
    /// Deck name override; the package short name otherwise.
    pub deck_name: Option<String>,
    /// Delete the deck's existing cards before inserting.
    pub overwrite: bool,
}

/// The package's base filename without extension: the deck's stable key
/// across re-imports and mapping lookups.
pub fn short_name(package: &Path) -> String {
    package
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("deck")
        .to_string()
}

/// Import a package into the store.
pub fn import_package(
    store: &mut CardStore,
    settings: &SettingsStore,
    paths: &AppPaths,
    package: &Path,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    let short = short_name(package);
    let deck_name = options.deck_name.clone().unwrap_or_else(|| short.clone());

    let mut archive = PackageArchive::open(package)?;
    let layout = locate(&archive.entries())?;
    debug!(collection = %layout.collection, media = ?layout.media, "located package entries");

    let staged = paths.staging_path();
    ensure_parent(&staged).map_err(ImportError::Stage)?;
    archive.extract_to(&layout.collection, &staged)?;

    let input = {
        let conn = open_read_only(&staged)?;
        load_rows(&conn)
    };

    let mapping = settings.mapping_for(&short).filter(|m| !m.is_empty());
    let extraction = extract_cards(&input, mapping.as_ref())?;
    info!(
        deck = %deck_name,
        strategy = extraction.strategy.as_str(),
        cards = extraction.cards.len(),
        source_notes = extraction.source_notes,
        source_cards = extraction.source_cards,
        "extracted cards"
    );

    let now = Utc::now();
    let (deck_id, inserted) = store.import_or_merge(&deck_name, &extraction.cards, options.overwrite, now)?;

    let source_notes: Vec<SourceNote> = input.notes.iter().map(SourceNote::from).collect();
    store.replace_source_notes(deck_id, &source_notes)?;

    let media_bytes = layout.media.as_deref().and_then(|name| archive.read(name));
    let media_map = decode_media_map(media_bytes.as_deref());
    let media_files = extract_media(&mut archive, &media_map, &paths.media_dir(&short));

    let _ = std::fs::remove_file(&staged);

    Ok(ImportSummary {
        deck_id,
        deck_name,
        short_name: short,
        inserted,
        strategy: extraction.strategy,
        source_notes: extraction.source_notes,
        source_cards: extraction.source_cards,
        media_files,
    })
}

/// Inspect a package and cache the snapshot for the mapping step.
pub fn inspect_package(
    settings: &mut SettingsStore,
    paths: &AppPaths,
    package: &Path,
) -> Result<InspectionSnapshot, ImportError> {
    let short = short_name(package);

    let mut archive = PackageArchive::open(package)?;
    let layout = locate(&archive.entries())?;

    let staged = paths.staging_path();
    ensure_parent(&staged).map_err(ImportError::Stage)?;
    archive.extract_to(&layout.collection, &staged)?;

    let snapshot = {
        let conn = open_read_only(&staged)?;
        inspect_collection(&conn, &short)
    };
    let _ = std::fs::remove_file(&staged);

    settings.set_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Rebuild a deck's cards from its archived source notes under the
/// currently stored mapping. The source notes themselves are untouched.
pub fn rebuild_deck(
    store: &mut CardStore,
    settings: &SettingsStore,
    deck_name: &str,
    now: DateTime<Utc>,
) -> Result<ImportSummary, ImportError> {
    let deck_id = store
        .find_deck(deck_name)?
        .ok_or_else(|| ImportError::UnknownDeck(deck_name.to_string()))?;
    let mapping = settings
        .mapping_for(deck_name)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ImportError::MissingMapping(deck_name.to_string()))?;

    let notes: Vec<NoteRecord> = store
        .load_source_notes(deck_id)?
        .iter()
        .map(NoteRecord::from)
        .collect();
    let input = ExtractionInput {
        models: ModelSet::empty(),
        notes,
        cards: Vec::new(),
    };

    let extraction = extract_cards(&input, Some(&mapping))?;
    let (deck_id, inserted) = store.import_or_merge(deck_name, &extraction.cards, true, now)?;

    Ok(ImportSummary {
        deck_id,
        deck_name: deck_name.to_string(),
        short_name: deck_name.to_string(),
        inserted,
        strategy: extraction.strategy,
        source_notes: extraction.source_notes,
        source_cards: extraction.source_cards,
        media_files: 0,
    })
}
