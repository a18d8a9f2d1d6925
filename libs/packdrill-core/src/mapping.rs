//! Field-mapping card extraction.
//!
//! A [`FieldMapping`] records, per model, which 1-based field positions
//! make up the front and back of a card. Mappings are chosen by the user
//! against an inspection snapshot and persisted per deck short name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{CardContent, NoteRecord};

/// Divider inserted between parts when several fields compose one side.
pub const PART_DIVIDER: &str = "──────── ";

/// Field positions assigned to each side of a card. Indices are 1-based;
/// anything out of range is ignored when the mapping is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRoles {
    #[serde(default)]
    pub front_indexes: Vec<u32>,
    #[serde(default)]
    pub back_indexes: Vec<u32>,
}

/// Per-model field roles for one deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub models: BTreeMap<String, FieldRoles>,
}

impl FieldMapping {
    pub fn single(model_id: impl Into<String>, roles: FieldRoles) -> Self {
        let mut models = BTreeMap::new();
        models.insert(model_id.into(), roles);
        Self { models }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Roles for a note. A mapping with exactly one model entry applies
    /// to every note, whatever the note claims its model is; packages
    /// where note model ids drift from the metadata are common enough
    /// that a strict match would produce empty decks.
    pub fn roles_for(&self, model_id: Option<&str>) -> Option<&FieldRoles> {
        if self.models.len() == 1 {
            return self.models.values().next();
        }
        model_id.and_then(|id| self.models.get(id))
    }
}

fn gather(values: &[String], indexes: &[u32]) -> String {
    let parts: Vec<&str> = indexes
        .iter()
        .filter_map(|&index| {
            let position = (index as usize).checked_sub(1)?;
            values.get(position).map(String::as_str)
        })
        .filter(|value| !value.is_empty())
        .collect();
    parts.join(&format!("\n{PART_DIVIDER}\n"))
}

/// Compose one card from a note's normalized field values.
pub fn card_from_note(roles: &FieldRoles, values: &[String]) -> Option<CardContent> {
    CardContent::from_sides(
        gather(values, &roles.front_indexes),
        gather(values, &roles.back_indexes),
    )
}

/// Apply a mapping to every note, dropping notes with no matching model
/// entry and notes that compose to nothing.
pub fn cards_from_mapping(mapping: &FieldMapping, notes: &[NoteRecord]) -> Vec<CardContent> {
    notes
        .iter()
        .filter_map(|note| {
            let roles = mapping.roles_for(note.model_id.as_deref())?;
            card_from_note(roles, &note.values())
        })
        .collect()
}
