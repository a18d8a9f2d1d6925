//! Loading extraction input from a collection database.
//!
//! The strategy chain itself is pure (`packdrill_core::extract`); this
//! module only reads the rows it needs. Query failures are not fatal;
//! a collection without a `cards` table still imports through the naive
//! strategy over its notes.

use rusqlite::Connection;
use tracing::warn;

use packdrill_core::{CardRecord, ExtractionInput, NoteRecord};

use super::inspect::{load_note_rows, read_models};

/// Read models, notes and card rows out of an open collection.
pub fn load_rows(conn: &Connection) -> ExtractionInput {
    ExtractionInput {
        models: read_models(conn),
        notes: load_note_rows(conn),
        cards: load_card_rows(conn),
    }
}

/// `cards JOIN notes`, reduced to one row per note. The source format
/// can generate several cards per note via template ordinals; this
/// pipeline derives at most one front/back pair per note, so only the
/// lowest ordinal survives.
fn load_card_rows(conn: &Connection) -> Vec<CardRecord> {
    let result = (|| -> rusqlite::Result<Vec<CardRecord>> {
        let mut stmt = conn.prepare(
            "SELECT n.id, c.ord, n.mid, n.flds
             FROM cards c JOIN notes n ON n.id = c.nid
             ORDER BY n.id, c.ord",
        )?;
        let rows = stmt.query_map([], |row| {
            let note_id: i64 = row.get(0)?;
            let ord: i64 = row.get(1)?;
            let mid: Option<i64> = row.get(2)?;
            let flds: String = row.get(3)?;
            Ok((
                note_id,
                CardRecord {
                    ord,
                    note: NoteRecord::new(mid.map(|m| m.to_string()), flds),
                },
            ))
        })?;

        let mut cards = Vec::new();
        let mut last_note = None;
        for row in rows {
            let (note_id, card) = row?;
            if last_note == Some(note_id) {
                continue;
            }
            last_note = Some(note_id);
            cards.push(card);
        }
        Ok(cards)
    })();

    match result {
        Ok(cards) => cards,
        Err(err) => {
            warn!(error = %err, "could not read card rows from collection");
            Vec::new()
        }
    }
}
