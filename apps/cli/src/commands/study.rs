//! `next`, `preview` and `rate` commands.

use anyhow::bail;
use chrono::Utc;

use packdrill_core::{Rating, Sm2};

use super::AppContext;

pub fn next(ctx: &AppContext, deck: &str, random: bool) -> anyhow::Result<()> {
    let Some(deck_id) = ctx.store.find_deck(deck)? else {
        bail!("deck '{deck}' does not exist");
    };
    let now = Utc::now();
    let Some(card) = ctx.store.fetch_next_due(deck_id, now, random)? else {
        println!("nothing due in '{deck}'");
        return Ok(());
    };

    println!("card #{}", card.id);
    println!("{}", card.content.front);
    if !card.content.back.is_empty() {
        println!("--------");
        println!("{}", card.content.back);
    }

    let scheduler = Sm2::default();
    let labels: Vec<String> = scheduler
        .preview(&card.state, now)
        .into_iter()
        .map(|outcome| format!("{}={}", outcome.rating.as_str(), outcome.label))
        .collect();
    println!("rate with `packdrill rate {} <rating>`: {}", card.id, labels.join("  "));
    Ok(())
}

/// Show what each rating would do to a card, without committing.
pub fn preview(ctx: &AppContext, card_id: i64) -> anyhow::Result<()> {
    let Some(card) = ctx.store.get_card(card_id)? else {
        bail!("card {card_id} does not exist");
    };

    let now = Utc::now();
    for outcome in Sm2::default().preview(&card.state, now) {
        println!(
            "{:>5}: due {:>5}  ease {:.2}  interval {:.1}d  reps {}  lapses {}",
            outcome.rating.as_str(),
            outcome.label,
            outcome.state.ease,
            outcome.state.interval_days,
            outcome.state.reps,
            outcome.state.lapses,
        );
    }
    Ok(())
}

pub fn rate(ctx: &AppContext, card_id: i64, rating: &str) -> anyhow::Result<()> {
    let Some(rating) = Rating::parse(rating) else {
        bail!("unknown rating '{rating}' (expected again, hard, good or easy)");
    };
    let Some(card) = ctx.store.get_card(card_id)? else {
        bail!("card {card_id} does not exist");
    };

    let now = Utc::now();
    let next = Sm2::default().schedule(&card.state, rating, now);
    ctx.store.save_card_state(card_id, &next)?;
    println!(
        "card #{card_id} rated {}; due {}",
        rating.as_str(),
        packdrill_core::due_label(now, next.due)
    );
    Ok(())
}
