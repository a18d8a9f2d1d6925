//! `decks` and `delete` commands.

use anyhow::bail;

use super::AppContext;

pub fn list(ctx: &AppContext) -> anyhow::Result<()> {
    let decks = ctx.store.list_decks()?;
    if decks.is_empty() {
        println!("no decks; import a package with `packdrill import <file>`");
        return Ok(());
    }
    for deck in decks {
        println!("{:>6}  {}  ({} cards)", deck.id, deck.name, deck.card_count);
    }
    Ok(())
}

pub fn delete(ctx: &AppContext, name: &str) -> anyhow::Result<()> {
    let Some(deck_id) = ctx.store.find_deck(name)? else {
        bail!("deck '{name}' does not exist");
    };
    ctx.store.delete_deck(deck_id)?;
    println!("deleted deck '{name}'");
    Ok(())
}
