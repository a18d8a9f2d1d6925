//! `import` and `rebuild` commands.

use std::path::Path;

use chrono::Utc;
use packdrill_core::Strategy;

use crate::import::{import_package, rebuild_deck, ImportOptions, ImportSummary};

use super::AppContext;

pub fn import(
    ctx: &mut AppContext,
    package: &Path,
    name: Option<String>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let options = ImportOptions {
        deck_name: name,
        overwrite,
    };
    let summary = import_package(
        &mut ctx.store,
        &ctx.settings,
        &ctx.paths,
        package,
        &options,
    )?;
    print_summary(&summary);
    Ok(())
}

pub fn rebuild(ctx: &mut AppContext, deck: &str) -> anyhow::Result<()> {
    let summary = rebuild_deck(&mut ctx.store, &ctx.settings, deck, Utc::now())?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!(
        "deck '{}': {} cards via {} strategy ({} notes, {} card rows in source)",
        summary.deck_name,
        summary.inserted,
        summary.strategy.as_str(),
        summary.source_notes,
        summary.source_cards,
    );
    if summary.media_files > 0 {
        println!("extracted {} media files", summary.media_files);
    }
    if summary.strategy == Strategy::Naive {
        println!(
            "note: no usable mapping or templates; fields were split naively. \
             Run `packdrill inspect` and `packdrill map` to control the layout."
        );
    }
}
