//! The card extraction strategy chain.
//!
//! Three progressively weaker strategies turn collection rows into cards.
//! The order is a contract, not an accident:
//!
//! 1. an explicit field mapping, when one is supplied, and then only
//!    that: a mapping that matches nothing is a user error to surface,
//!    not something to paper over;
//! 2. the models' own templates, when they render at least one card;
//! 3. a naive split: first non-empty field in front, the rest behind.
//!
//! Producing zero cards after all applicable strategies is a hard
//! failure carrying diagnostic counts, never a silent empty deck.

use serde::Serialize;

use crate::error::ExtractError;
use crate::mapping::{cards_from_mapping, FieldMapping};
use crate::model::ModelSet;
use crate::template::cards_from_templates;
use crate::types::{CardContent, CardRecord, NoteRecord};

/// Which strategy produced the cards of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Mapping,
    Template,
    Naive,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Template => "template",
            Self::Naive => "naive",
        }
    }
}

/// Everything the chain needs, already read out of the collection:
/// decoded models, the note rows, and at most one card row per note.
#[derive(Debug, Default)]
pub struct ExtractionInput {
    pub models: ModelSet,
    pub notes: Vec<NoteRecord>,
    pub cards: Vec<CardRecord>,
}

/// A successful extraction with its diagnostics.
#[derive(Debug)]
pub struct Extraction {
    pub cards: Vec<CardContent>,
    pub strategy: Strategy,
    pub source_notes: usize,
    pub source_cards: usize,
}

/// Run the strategy chain.
pub fn extract_cards(
    input: &ExtractionInput,
    mapping: Option<&FieldMapping>,
) -> Result<Extraction, ExtractError> {
    let source_notes = input.notes.len();
    let source_cards = input.cards.len();
    let done = |cards: Vec<CardContent>, strategy: Strategy| Extraction {
        cards,
        strategy,
        source_notes,
        source_cards,
    };
    let no_cards = ExtractError::NoCardsProduced {
        notes: source_notes,
        cards: source_cards,
    };

    if let Some(mapping) = mapping {
        let cards = cards_from_mapping(mapping, &input.notes);
        return if cards.is_empty() {
            Err(no_cards)
        } else {
            Ok(done(cards, Strategy::Mapping))
        };
    }

    let cards = cards_from_templates(&input.models, &input.cards);
    if !cards.is_empty() {
        return Ok(done(cards, Strategy::Template));
    }

    let cards = naive_cards(input);
    if cards.is_empty() {
        Err(no_cards)
    } else {
        Ok(done(cards, Strategy::Naive))
    }
}

fn naive_card(values: &[String]) -> Option<CardContent> {
    let mut non_empty = values.iter().filter(|value| !value.is_empty());
    let front = non_empty.next()?.clone();
    let back = non_empty.cloned().collect::<Vec<_>>().join("\n");
    CardContent::from_sides(front, back)
}

fn naive_cards(input: &ExtractionInput) -> Vec<CardContent> {
    if !input.cards.is_empty() {
        input
            .cards
            .iter()
            .filter_map(|row| naive_card(&row.note.values()))
            .collect()
    } else {
        input
            .notes
            .iter()
            .filter_map(|note| naive_card(&note.values()))
            .collect()
    }
}
