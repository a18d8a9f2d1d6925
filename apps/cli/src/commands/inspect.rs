//! `inspect` and `map` commands.

use std::path::Path;

use packdrill_core::{FieldMapping, FieldRoles};

use crate::import::inspect_package;

use super::AppContext;

pub fn inspect(ctx: &mut AppContext, package: &Path) -> anyhow::Result<()> {
    let snapshot = inspect_package(&mut ctx.settings, &ctx.paths, package)?;
    if snapshot.models.is_empty() {
        println!("no decodable models in '{}'", snapshot.short_name);
        return Ok(());
    }

    println!("package '{}':", snapshot.short_name);
    for model in snapshot.models.values() {
        println!("  model {} '{}' ({} notes)", model.id, model.name, model.note_count);
        for field in &model.fields {
            let samples = field.samples.join(" | ");
            println!("    {}. {}  [{}]", field.index, field.name, samples);
        }
    }
    println!(
        "assign fields with `packdrill map {} <model-id> --front 1 --back 2,3`",
        snapshot.short_name
    );
    Ok(())
}

pub fn map(
    ctx: &mut AppContext,
    deck: &str,
    model: &str,
    front: Vec<u32>,
    back: Vec<u32>,
) -> anyhow::Result<()> {
    let mut mapping = ctx.settings.mapping_for(deck).unwrap_or_else(FieldMapping::default);
    mapping.models.insert(
        model.to_string(),
        FieldRoles {
            front_indexes: front,
            back_indexes: back,
        },
    );
    ctx.settings.set_mapping(deck, &mapping)?;
    println!("stored mapping for deck '{deck}', model {model}");
    println!("apply it with `packdrill rebuild {deck}` or the next import");
    Ok(())
}
