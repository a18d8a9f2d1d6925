//! SQLite schema for the local card store.

/// Current schema version. The store is a local study cache, not a
/// system of record: a version bump drops and recreates everything.
pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA: &str = r#"
-- Decks, identified by unique name
CREATE TABLE IF NOT EXISTS decks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Study cards with their scheduling state
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    deck_id INTEGER NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    ease REAL NOT NULL DEFAULT 2.5,
    interval REAL NOT NULL DEFAULT 0,
    due TEXT NOT NULL,
    reps INTEGER NOT NULL DEFAULT 0,
    lapses INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Raw note data kept so a deck can be rebuilt under a new mapping
CREATE TABLE IF NOT EXISTS source_notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    deck_id INTEGER NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
    mid TEXT,
    flds TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_id);
CREATE INDEX IF NOT EXISTS idx_cards_due ON cards(deck_id, due);
CREATE INDEX IF NOT EXISTS idx_source_notes_deck ON source_notes(deck_id);
"#;

/// Destructive reset used when the stored version does not match.
pub const TEARDOWN: &str = r#"
DROP TABLE IF EXISTS cards;
DROP TABLE IF EXISTS source_notes;
DROP TABLE IF EXISTS decks;
DROP TABLE IF EXISTS schema_version;
"#;
