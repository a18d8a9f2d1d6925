//! Collection inspection: model metadata plus sample field values.
//!
//! The snapshot produced here feeds the field-mapping step, so a user can
//! pick front/back fields without the archive being re-read every time.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::warn;

use packdrill_core::{
    FieldInspection, InspectionSnapshot, ModelInspection, ModelSet, NoteRecord,
    MAX_FIELD_SAMPLES,
};

use super::CollectionError;

/// Open a collection database read-only with a bounded busy wait.
pub fn open_read_only(path: &Path) -> Result<Connection, CollectionError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

/// Decode the single metadata row's `models` column. Any failure along
/// the way yields an empty model set.
pub fn read_models(conn: &Connection) -> ModelSet {
    let json: Option<String> = match conn
        .query_row("SELECT models FROM col LIMIT 1", [], |row| row.get(0))
        .optional()
    {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "could not read model metadata from collection");
            None
        }
    };
    match json {
        Some(json) => ModelSet::decode(&json),
        None => ModelSet::empty(),
    }
}

/// All note rows, in id order. Query failures degrade to an empty list.
pub fn load_note_rows(conn: &Connection) -> Vec<NoteRecord> {
    let result = (|| -> rusqlite::Result<Vec<NoteRecord>> {
        let mut stmt = conn.prepare("SELECT mid, flds FROM notes ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let mid: Option<i64> = row.get(0)?;
            let flds: String = row.get(1)?;
            Ok(NoteRecord::new(mid.map(|m| m.to_string()), flds))
        })?;
        rows.collect()
    })();
    match result {
        Ok(notes) => notes,
        Err(err) => {
            warn!(error = %err, "could not read notes from collection");
            Vec::new()
        }
    }
}

/// Build an inspection snapshot: every decoded model with its fields and
/// up to [`MAX_FIELD_SAMPLES`] non-empty sample values per field.
///
/// Notes are attributed through [`ModelSet::model_for`], so a collection
/// whose note model ids drifted from its metadata still samples correctly
/// as long as it has a single model. Notes matching no model are skipped
/// here; the import diagnostics account for them.
pub fn inspect_collection(conn: &Connection, short_name: &str) -> InspectionSnapshot {
    let models = read_models(conn);
    let notes = load_note_rows(conn);

    let mut inspections: BTreeMap<String, ModelInspection> = models
        .iter()
        .map(|model| {
            (
                model.id.clone(),
                ModelInspection {
                    id: model.id.clone(),
                    name: model.name.clone(),
                    note_count: 0,
                    fields: model
                        .fields
                        .iter()
                        .enumerate()
                        .map(|(position, field)| FieldInspection {
                            index: position as u32 + 1,
                            name: field.name.clone(),
                            samples: Vec::new(),
                        })
                        .collect(),
                },
            )
        })
        .collect();

    for note in &notes {
        let Some(model) = models.model_for(note.model_id.as_deref()) else {
            continue;
        };
        let Some(inspection) = inspections.get_mut(&model.id) else {
            continue;
        };
        inspection.note_count += 1;
        for (position, value) in note.values().into_iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let Some(field) = inspection.fields.get_mut(position) else {
                continue;
            };
            if field.samples.len() < MAX_FIELD_SAMPLES {
                field.samples.push(value);
            }
        }
    }

    InspectionSnapshot {
        short_name: short_name.to_string(),
        models: inspections,
    }
}
