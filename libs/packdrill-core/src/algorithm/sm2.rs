//! Two-regime scheduler derived from SM-2.
//!
//! A card is either new (never successfully repeated, zero interval) or
//! in review. New cards move through minute-scale learning steps; review
//! cards move through day-scale intervals multiplied by the ease factor.
//! The arithmetic is deliberately simple and exactly reproducible: the
//! same state, rating and clock always produce the same next state, both
//! for grading and for the non-committing preview.

use chrono::{DateTime, Duration, Utc};

use super::{due_label, PreviewOutcome};
use crate::types::{CardState, Rating, MINIMUM_EASE};

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub minimum_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub easy_bonus: f64,
    pub hard_multiplier: f64,
    pub easy_multiplier: f64,
    /// Interval granted when a new card is rated easy.
    pub new_easy_interval: f64,
    /// Interval granted when a zero-interval review card is rated good.
    pub graduating_interval: f64,
    /// Interval granted when a zero-interval review card is rated easy.
    pub easy_graduating_interval: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            minimum_ease: MINIMUM_EASE,
            again_penalty: 0.2,
            hard_penalty: 0.15,
            easy_bonus: 0.15,
            hard_multiplier: 1.2,
            easy_multiplier: 1.3,
            new_easy_interval: 4.0,
            graduating_interval: 1.0,
            easy_graduating_interval: 3.0,
        }
    }
}

impl Sm2 {
    /// Compute the state a card moves to when rated at `now`. Pure; the
    /// caller persists the result (or doesn't, for previews).
    pub fn schedule(&self, state: &CardState, rating: Rating, now: DateTime<Utc>) -> CardState {
        if state.is_new() {
            self.schedule_new(state, rating, now)
        } else {
            self.schedule_review(state, rating, now)
        }
    }

    /// All four outcomes of rating the card, labeled, without committing
    /// anything.
    pub fn preview(&self, state: &CardState, now: DateTime<Utc>) -> Vec<PreviewOutcome> {
        Rating::ALL
            .iter()
            .map(|&rating| {
                let next = self.schedule(state, rating, now);
                PreviewOutcome {
                    rating,
                    label: due_label(now, next.due),
                    state: next,
                }
            })
            .collect()
    }

    fn schedule_new(&self, state: &CardState, rating: Rating, now: DateTime<Utc>) -> CardState {
        let mut next = state.clone();
        match rating {
            Rating::Again => {
                next.lapses += 1;
                next.ease = self.floor_ease(state.ease - self.again_penalty);
                next.due = now + Duration::minutes(1);
            }
            Rating::Hard => {
                next.reps += 1;
                next.ease = self.floor_ease(state.ease - self.hard_penalty);
                next.due = now + Duration::minutes(6);
            }
            Rating::Good => {
                next.reps += 1;
                next.due = now + Duration::minutes(10);
            }
            Rating::Easy => {
                next.reps += 1;
                next.ease = state.ease + self.easy_bonus;
                next.interval_days = self.new_easy_interval;
                next.due = now + days(next.interval_days);
            }
        }
        next
    }

    fn schedule_review(&self, state: &CardState, rating: Rating, now: DateTime<Utc>) -> CardState {
        let mut next = state.clone();
        match rating {
            Rating::Again => {
                next.reps = 0;
                next.lapses += 1;
                next.interval_days = 0.0;
                next.ease = self.floor_ease(state.ease - self.again_penalty);
                next.due = now + Duration::minutes(10);
            }
            Rating::Hard => {
                next.reps += 1;
                next.ease = self.floor_ease(state.ease - self.hard_penalty);
                next.interval_days = state.interval_days.max(1.0) * self.hard_multiplier;
                next.due = now + days(next.interval_days);
            }
            Rating::Good => {
                next.reps += 1;
                next.interval_days = if state.interval_days == 0.0 {
                    self.graduating_interval
                } else {
                    state.interval_days * state.ease
                };
                next.due = now + days(next.interval_days);
            }
            Rating::Easy => {
                next.reps += 1;
                next.ease = state.ease + self.easy_bonus;
                next.interval_days = if state.interval_days == 0.0 {
                    self.easy_graduating_interval
                } else {
                    state.interval_days * next.ease * self.easy_multiplier
                };
                next.due = now + days(next.interval_days);
            }
        }
        next
    }

    fn floor_ease(&self, ease: f64) -> f64 {
        ease.max(self.minimum_ease)
    }
}

fn days(interval: f64) -> Duration {
    Duration::seconds((interval * 86_400.0).round() as i64)
}
