//! Template-based card rendering.
//!
//! Used when no explicit field mapping exists: the model's own question
//! and answer formats are rendered by substituting `{{Field}}`
//! placeholders. Conditional sections, nested references and styling from
//! the source ecosystem are not reproduced; unknown placeholders render
//! as empty text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::html::normalize;
use crate::model::{Model, ModelSet};
use crate::types::{CardContent, CardRecord};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").unwrap());

/// Token in an answer format standing for the rendered question side.
pub const FRONT_SIDE: &str = "{{FrontSide}}";

fn substitute(format: &str, values: &HashMap<&str, &str>) -> String {
    PLACEHOLDER
        .replace_all(format, |caps: &Captures| {
            let name = caps[1].trim();
            values.get(name).copied().unwrap_or("").to_string()
        })
        .into_owned()
}

/// Render one card from a model template and the note's normalized field
/// values (in the model's field order). `ord` selects the template.
pub fn render_card(model: &Model, ord: i64, values: &[String]) -> Option<CardContent> {
    let template = model.template_for(ord)?;
    let by_name: HashMap<&str, &str> = model
        .fields
        .iter()
        .zip(values.iter())
        .map(|(field, value)| (field.name.as_str(), value.as_str()))
        .collect();

    let question = substitute(&template.qfmt, &by_name);
    // The FrontSide token carries the rendered question into the answer,
    // set off by a blank line.
    let answer_format = template.afmt.replace(FRONT_SIDE, &format!("{question}\n\n"));
    let answer = substitute(&answer_format, &by_name);

    CardContent::from_sides(normalize(&question), normalize(&answer))
}

/// Render every card row through its model's templates. Rows whose model
/// cannot be resolved render nothing.
pub fn cards_from_templates(models: &ModelSet, rows: &[CardRecord]) -> Vec<CardContent> {
    rows.iter()
        .filter_map(|row| {
            let model = models.model_for(row.note.model_id.as_deref())?;
            render_card(model, row.ord, &row.note.values())
        })
        .collect()
}
