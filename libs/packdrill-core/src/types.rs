//! Core types for the package import pipeline and scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::html::normalize;

/// The control character separating field values inside a note's raw
/// field blob.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Ease factor assigned to freshly imported cards.
pub const INITIAL_EASE: f64 = 2.5;

/// Hard floor for the ease factor; no rating may push ease below this.
pub const MINIMUM_EASE: f64 = 1.3;

/// Review rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// All ratings in ascending order, as presented to the user.
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    /// Parse from the user-facing name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "again" => Some(Self::Again),
            "hard" => Some(Self::Hard),
            "good" => Some(Self::Good),
            "easy" => Some(Self::Easy),
            _ => None,
        }
    }
}

/// The text of a study card. Never both sides empty: extraction drops
/// such notes before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub front: String,
    pub back: String,
}

impl CardContent {
    /// Apply the front-promotion rule: a card must always have a front,
    /// so an empty front with a non-empty back swaps the two. Returns
    /// `None` when both sides are empty.
    pub fn from_sides(front: String, back: String) -> Option<Self> {
        match (front.is_empty(), back.is_empty()) {
            (true, true) => None,
            (true, false) => Some(Self {
                front: back,
                back: String::new(),
            }),
            _ => Some(Self { front, back }),
        }
    }
}

/// Scheduling state of a card. Mutated only by the scheduler's commit
/// or by a full deck re-import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub ease: f64,
    pub interval_days: f64,
    pub due: DateTime<Utc>,
    pub reps: u32,
    pub lapses: u32,
}

impl CardState {
    /// State assigned to a card on import: due immediately, never seen.
    pub fn new_card(now: DateTime<Utc>) -> Self {
        Self {
            ease: INITIAL_EASE,
            interval_days: 0.0,
            due: now,
            reps: 0,
            lapses: 0,
        }
    }

    /// A card is in the new/learning regime until it has both a
    /// nonzero interval and at least one successful repetition.
    pub fn is_new(&self) -> bool {
        self.interval_days == 0.0 && self.reps == 0
    }
}

/// One row of the source `notes` table: the model reference and the raw
/// separator-joined field blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub model_id: Option<String>,
    pub fields: String,
}

impl NoteRecord {
    pub fn new(model_id: Option<String>, fields: impl Into<String>) -> Self {
        Self {
            model_id,
            fields: fields.into(),
        }
    }

    /// Split the raw blob on the field separator and normalize each value.
    pub fn values(&self) -> Vec<String> {
        self.fields
            .split(FIELD_SEPARATOR)
            .map(normalize)
            .collect()
    }
}

/// One row of `cards JOIN notes`: the template ordinal plus the joined
/// note. The pipeline keeps at most one card row per note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub ord: i64,
    pub note: NoteRecord,
}

/// Raw per-note data persisted so a deck can be rebuilt later under a
/// different mapping without re-reading the original package. Never
/// parsed except during rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNote {
    pub model_id: Option<String>,
    pub fields: String,
}

impl From<&NoteRecord> for SourceNote {
    fn from(note: &NoteRecord) -> Self {
        Self {
            model_id: note.model_id.clone(),
            fields: note.fields.clone(),
        }
    }
}

impl From<&SourceNote> for NoteRecord {
    fn from(note: &SourceNote) -> Self {
        Self {
            model_id: note.model_id.clone(),
            fields: note.fields.clone(),
        }
    }
}

/// Cached result of inspecting a package's collection database: model
/// metadata plus a few sample values per field, enough to drive field
/// mapping without re-reading the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionSnapshot {
    pub short_name: String,
    pub models: BTreeMap<String, ModelInspection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInspection {
    pub id: String,
    pub name: String,
    pub note_count: usize,
    pub fields: Vec<FieldInspection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInspection {
    /// 1-based field position, matching the indices used in mappings.
    pub index: u32,
    pub name: String,
    /// Up to [`MAX_FIELD_SAMPLES`] non-empty normalized values.
    pub samples: Vec<String>,
}

/// Sample values retained per field during inspection.
pub const MAX_FIELD_SAMPLES: usize = 3;
