//! Core library for packdrill: turning exported flashcard packages into
//! normalized study cards and scheduling their review.
//!
//! Provides:
//! - Markup normalization for field values
//! - Model metadata decoding (the collection's `models` JSON)
//! - Card extraction: explicit field mapping, template rendering, and a
//!   naive fallback, tried in that order
//! - A two-regime SM-2 derived scheduler with grading previews
//! - Shared types (CardContent, CardState, Rating, FieldMapping, ...)
//!
//! All I/O (archives, SQLite, settings files) lives in the application
//! crate; everything here is pure.

pub mod algorithm;
pub mod error;
pub mod extract;
pub mod html;
pub mod mapping;
pub mod model;
pub mod template;
pub mod types;

pub use algorithm::{due_label, PreviewOutcome, Sm2};
pub use error::{ExtractError, ModelDecodeError};
pub use extract::{extract_cards, Extraction, ExtractionInput, Strategy};
pub use html::normalize;
pub use mapping::{cards_from_mapping, FieldMapping, FieldRoles, PART_DIVIDER};
pub use model::{FieldDef, Model, ModelSet, TemplateDef};
pub use types::{
    CardContent, CardRecord, CardState, FieldInspection, InspectionSnapshot, ModelInspection,
    NoteRecord, Rating, SourceNote, FIELD_SEPARATOR, INITIAL_EASE, MAX_FIELD_SAMPLES,
    MINIMUM_EASE,
};
