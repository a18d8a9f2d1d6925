//! Model metadata decoding.
//!
//! The collection database stores note models as one JSON document keyed
//! by model id. Package versions disagree about which keys are present,
//! so every entry is validated independently into an explicit struct;
//! a malformed entry is skipped with a warning instead of failing the
//! whole import.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::ModelDecodeError;

/// A named field position within a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub ord: u32,
    pub name: String,
}

/// A render template. `ord` is the declared card ordinal, when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDef {
    pub ord: Option<u32>,
    pub qfmt: String,
    pub afmt: String,
}

/// One decoded note model: its ordered field definitions and whatever
/// templates the package declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub templates: Vec<TemplateDef>,
}

impl Model {
    /// Pick the template for a card ordinal: a template declaring that
    /// ordinal wins, else the template at that position, else the first.
    pub fn template_for(&self, ord: i64) -> Option<&TemplateDef> {
        self.templates
            .iter()
            .find(|t| t.ord.is_some_and(|o| i64::from(o) == ord))
            .or_else(|| usize::try_from(ord).ok().and_then(|i| self.templates.get(i)))
            .or_else(|| self.templates.first())
    }
}

#[derive(Deserialize)]
struct RawModel {
    name: String,
    flds: Vec<RawField>,
    #[serde(default)]
    tmpls: Vec<RawTemplate>,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    ord: Option<u32>,
}

#[derive(Deserialize)]
struct RawTemplate {
    #[serde(default)]
    ord: Option<u32>,
    #[serde(default)]
    qfmt: String,
    #[serde(default)]
    afmt: String,
}

/// The set of models decoded from one collection.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    models: BTreeMap<String, Model>,
}

impl ModelSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode the `models` column. A malformed document degrades to an
    /// empty set and later extraction falls through the strategy chain.
    pub fn decode(json: &str) -> Self {
        match Self::try_decode(json) {
            Ok(set) => set,
            Err(err) => {
                warn!(error = %err, "could not decode model metadata, continuing without models");
                Self::default()
            }
        }
    }

    fn try_decode(json: &str) -> Result<Self, ModelDecodeError> {
        let document: Value = serde_json::from_str(json)?;
        let entries = document.as_object().ok_or(ModelDecodeError::NotAnObject)?;

        let mut models = BTreeMap::new();
        for (id, entry) in entries {
            match model_from_value(id, entry.clone()) {
                Ok(model) => {
                    models.insert(id.clone(), model);
                }
                Err(err) => {
                    warn!(model = %id, error = %err, "skipping malformed model entry");
                }
            }
        }
        Ok(Self { models })
    }

    pub fn from_models(models: impl IntoIterator<Item = Model>) -> Self {
        Self {
            models: models.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Resolve the model for a note. Packages are known to drift: note
    /// rows sometimes carry a model id that no longer matches the
    /// metadata. With exactly one decoded model, every note is attributed
    /// to it; with several, only an exact id match counts.
    pub fn model_for(&self, model_id: Option<&str>) -> Option<&Model> {
        if self.models.len() == 1 {
            return self.models.values().next();
        }
        model_id.and_then(|id| self.models.get(id))
    }
}

fn model_from_value(id: &str, entry: Value) -> Result<Model, ModelDecodeError> {
    let raw: RawModel =
        serde_json::from_value(entry).map_err(|source| ModelDecodeError::BadEntry {
            id: id.to_string(),
            source,
        })?;
    if raw.flds.is_empty() {
        return Err(ModelDecodeError::NoFields { id: id.to_string() });
    }

    let mut fields: Vec<FieldDef> = raw
        .flds
        .into_iter()
        .enumerate()
        .map(|(position, f)| FieldDef {
            ord: f.ord.unwrap_or(position as u32),
            name: f.name,
        })
        .collect();
    fields.sort_by_key(|f| f.ord);

    let templates = raw
        .tmpls
        .into_iter()
        .map(|t| TemplateDef {
            ord: t.ord,
            qfmt: t.qfmt,
            afmt: t.afmt,
        })
        .collect();

    Ok(Model {
        id: id.to_string(),
        name: raw.name,
        fields,
        templates,
    })
}
