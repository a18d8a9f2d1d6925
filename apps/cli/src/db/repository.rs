//! Repository for decks, cards and source notes.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use packdrill_core::{CardContent, CardState, SourceNote};

use super::error::DbError;
use super::schema;

type Result<T> = std::result::Result<T, DbError>;

/// A persisted card.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCard {
    pub id: i64,
    pub deck_id: i64,
    pub content: CardContent,
    pub state: CardState,
}

/// A deck with its live card count.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeckSummary {
    pub id: i64,
    pub name: String,
    pub card_count: usize,
}

/// SQLite-backed card store.
pub struct CardStore {
    conn: Connection,
}

impl CardStore {
    /// Open the store at `path`, creating or destructively migrating the
    /// schema as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store, for testing.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: Option<i32> = self
            .conn
            .query_row(
                "SELECT version FROM schema_version LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or(None);

        if version != Some(schema::SCHEMA_VERSION) {
            if let Some(found) = version {
                warn!(
                    found,
                    expected = schema::SCHEMA_VERSION,
                    "schema version changed, recreating card store"
                );
            }
            self.conn.execute_batch(schema::TEARDOWN)?;
            self.conn.execute_batch(schema::SCHEMA)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [schema::SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }

    /// Find or create the deck named `name` and insert `cards` with
    /// default scheduling state. With `overwrite`, existing cards of the
    /// deck are deleted first. Returns the deck id and how many cards
    /// were inserted. The whole operation is one transaction.
    pub fn import_or_merge(
        &mut self,
        name: &str,
        cards: &[CardContent],
        overwrite: bool,
        now: DateTime<Utc>,
    ) -> Result<(i64, usize)> {
        let timestamp = now.to_rfc3339();
        let tx = self.conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row("SELECT id FROM decks WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        let deck_id = match existing {
            Some(id) => {
                if overwrite {
                    tx.execute("DELETE FROM cards WHERE deck_id = ?1", [id])?;
                }
                tx.execute(
                    "UPDATE decks SET updated_at = ?1 WHERE id = ?2",
                    params![timestamp, id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO decks (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
                    params![name, timestamp],
                )?;
                tx.last_insert_rowid()
            }
        };

        let mut inserted = 0;
        for card in cards {
            // Belt and braces: extraction never emits fully empty cards,
            // but the invariant is enforced at the persistence boundary
            // too.
            if card.front.is_empty() && card.back.is_empty() {
                continue;
            }
            tx.execute(
                "INSERT INTO cards (deck_id, front, back, ease, interval, due, reps, lapses, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, 0, 0, ?5, ?5)",
                params![
                    deck_id,
                    card.front,
                    card.back,
                    packdrill_core::INITIAL_EASE,
                    timestamp
                ],
            )?;
            inserted += 1;
        }

        tx.commit()?;
        Ok((deck_id, inserted))
    }

    /// All decks with live card counts, ordered case-insensitively.
    pub fn list_decks(&self) -> Result<Vec<DeckSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.name, COUNT(c.id)
             FROM decks d LEFT JOIN cards c ON c.deck_id = d.id
             GROUP BY d.id, d.name
             ORDER BY d.name COLLATE NOCASE",
        )?;
        let decks = stmt
            .query_map([], |row| {
                Ok(DeckSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    card_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(decks)
    }

    pub fn find_deck(&self, name: &str) -> Result<Option<i64>> {
        self.conn
            .query_row("SELECT id FROM decks WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Delete a deck; cards and source notes cascade.
    pub fn delete_deck(&self, deck_id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM decks WHERE id = ?1", [deck_id])?;
        if changed == 0 {
            return Err(DbError::DeckNotFound(deck_id.to_string()));
        }
        Ok(())
    }

    /// The single most overdue card of a deck: smallest `due` not after
    /// `now`. Ties on `due` break randomly when `randomize` is set,
    /// otherwise by insertion order.
    pub fn fetch_next_due(
        &self,
        deck_id: i64,
        now: DateTime<Utc>,
        randomize: bool,
    ) -> Result<Option<StoredCard>> {
        let sql = if randomize {
            "SELECT id, deck_id, front, back, ease, interval, due, reps, lapses
             FROM cards WHERE deck_id = ?1 AND due <= ?2
             ORDER BY due ASC, RANDOM() LIMIT 1"
        } else {
            "SELECT id, deck_id, front, back, ease, interval, due, reps, lapses
             FROM cards WHERE deck_id = ?1 AND due <= ?2
             ORDER BY due ASC, id ASC LIMIT 1"
        };
        self.conn
            .query_row(sql, params![deck_id, now.to_rfc3339()], row_to_card)
            .optional()
            .map_err(Into::into)
    }

    pub fn get_card(&self, card_id: i64) -> Result<Option<StoredCard>> {
        self.conn
            .query_row(
                "SELECT id, deck_id, front, back, ease, interval, due, reps, lapses
                 FROM cards WHERE id = ?1",
                [card_id],
                row_to_card,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Persist the scheduling state computed by a commit.
    pub fn save_card_state(&self, card_id: i64, state: &CardState) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE cards SET ease = ?1, interval = ?2, due = ?3, reps = ?4, lapses = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                state.ease,
                state.interval_days,
                state.due.to_rfc3339(),
                state.reps,
                state.lapses,
                Utc::now().to_rfc3339(),
                card_id
            ],
        )?;
        if changed == 0 {
            return Err(DbError::CardNotFound(card_id));
        }
        Ok(())
    }

    /// Replace a deck's source notes wholesale, preserving order.
    pub fn replace_source_notes(&mut self, deck_id: i64, notes: &[SourceNote]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM source_notes WHERE deck_id = ?1", [deck_id])?;
        for note in notes {
            tx.execute(
                "INSERT INTO source_notes (deck_id, mid, flds) VALUES (?1, ?2, ?3)",
                params![deck_id, note.model_id, note.fields],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// A deck's source notes in insertion order, for rebuilds.
    pub fn load_source_notes(&self, deck_id: i64) -> Result<Vec<SourceNote>> {
        let mut stmt = self
            .conn
            .prepare("SELECT mid, flds FROM source_notes WHERE deck_id = ?1 ORDER BY id")?;
        let notes = stmt
            .query_map([deck_id], |row| {
                Ok(SourceNote {
                    model_id: row.get(0)?,
                    fields: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}

fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<StoredCard> {
    let due_text: String = row.get(6)?;
    let due = DateTime::parse_from_rfc3339(&due_text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(err))
        })?;
    Ok(StoredCard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        content: CardContent {
            front: row.get(2)?,
            back: row.get(3)?,
        },
        state: CardState {
            ease: row.get(4)?,
            interval_days: row.get(5)?,
            due,
            reps: row.get(7)?,
            lapses: row.get(8)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    fn card(front: &str, back: &str) -> CardContent {
        CardContent {
            front: front.to_string(),
            back: back.to_string(),
        }
    }

    #[test]
    fn import_creates_deck_with_default_state() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, inserted) = store
            .import_or_merge("French", &[card("bonjour", "hello")], false, now)
            .unwrap();
        assert_eq!(inserted, 1);

        let due = store.fetch_next_due(deck_id, now, false).unwrap().unwrap();
        assert_eq!(due.content.front, "bonjour");
        assert!(due.state.is_new());
        assert_eq!(due.state.ease, packdrill_core::INITIAL_EASE);
    }

    #[test]
    fn overwrite_replaces_cards_merge_appends() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("a", "1"), card("b", "2")], false, now)
            .unwrap();

        let (same_id, _) = store
            .import_or_merge("Deck", &[card("c", "3")], false, now)
            .unwrap();
        assert_eq!(same_id, deck_id);
        assert_eq!(store.list_decks().unwrap()[0].card_count, 3);

        store
            .import_or_merge("Deck", &[card("d", "4")], true, now)
            .unwrap();
        assert_eq!(store.list_decks().unwrap()[0].card_count, 1);
    }

    #[test]
    fn fully_empty_cards_are_never_persisted() {
        let mut store = CardStore::open_in_memory().unwrap();
        let (_, inserted) = store
            .import_or_merge("Deck", &[card("", ""), card("x", "")], false, Utc::now())
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[test]
    fn decks_list_case_insensitively_ordered() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        store.import_or_merge("banana", &[card("q", "a")], false, now).unwrap();
        store.import_or_merge("Apple", &[card("q", "a")], false, now).unwrap();
        store.import_or_merge("cherry", &[card("q", "a")], false, now).unwrap();
        let names: Vec<_> = store
            .list_decks()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn delete_deck_cascades() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("q", "a")], false, now)
            .unwrap();
        store
            .replace_source_notes(
                deck_id,
                &[SourceNote {
                    model_id: Some("1".into()),
                    fields: "q\u{1f}a".into(),
                }],
            )
            .unwrap();

        store.delete_deck(deck_id).unwrap();
        assert!(store.list_decks().unwrap().is_empty());
        assert!(store.load_source_notes(deck_id).unwrap().is_empty());
        assert!(matches!(
            store.delete_deck(deck_id),
            Err(DbError::DeckNotFound(_))
        ));
    }

    #[test]
    fn next_due_skips_future_cards() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("due", "now")], false, now)
            .unwrap();

        let fetched = store.fetch_next_due(deck_id, now, false).unwrap().unwrap();
        let mut state = fetched.state.clone();
        state.due = now + ChronoDuration::days(3);
        store.save_card_state(fetched.id, &state).unwrap();

        assert!(store.fetch_next_due(deck_id, now, false).unwrap().is_none());
        let later = now + ChronoDuration::days(4);
        assert!(store.fetch_next_due(deck_id, later, false).unwrap().is_some());
    }

    #[test]
    fn next_due_prefers_most_overdue() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("late", "1"), card("later", "2")], false, now)
            .unwrap();

        // Push the first card further into the past.
        let first = store.fetch_next_due(deck_id, now, false).unwrap().unwrap();
        let mut state = first.state.clone();
        state.due = now - ChronoDuration::days(2);
        store.save_card_state(first.id, &state).unwrap();

        let fetched = store.fetch_next_due(deck_id, now, false).unwrap().unwrap();
        assert_eq!(fetched.id, first.id);
    }

    #[test]
    fn save_card_state_round_trips() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("q", "a")], false, now)
            .unwrap();
        let fetched = store.fetch_next_due(deck_id, now, false).unwrap().unwrap();

        let state = CardState {
            ease: 2.65,
            interval_days: 4.0,
            due: now + ChronoDuration::days(4),
            reps: 1,
            lapses: 0,
        };
        store.save_card_state(fetched.id, &state).unwrap();

        let reloaded = store.get_card(fetched.id).unwrap().unwrap();
        assert_eq!(reloaded.state.ease, 2.65);
        assert_eq!(reloaded.state.interval_days, 4.0);
        assert_eq!(reloaded.state.reps, 1);
        assert_eq!(reloaded.state.due, state.due);

        assert!(matches!(
            store.save_card_state(99_999, &state),
            Err(DbError::CardNotFound(_))
        ));
    }

    #[test]
    fn source_notes_replace_and_reload_in_order() {
        let mut store = CardStore::open_in_memory().unwrap();
        let now = Utc::now();
        let (deck_id, _) = store
            .import_or_merge("Deck", &[card("q", "a")], false, now)
            .unwrap();

        let first = vec![
            SourceNote { model_id: Some("1".into()), fields: "a\u{1f}b".into() },
            SourceNote { model_id: None, fields: "c\u{1f}d".into() },
        ];
        store.replace_source_notes(deck_id, &first).unwrap();
        assert_eq!(store.load_source_notes(deck_id).unwrap(), first);

        let second = vec![SourceNote { model_id: Some("2".into()), fields: "e".into() }];
        store.replace_source_notes(deck_id, &second).unwrap();
        assert_eq!(store.load_source_notes(deck_id).unwrap(), second);
    }
}
