// ABOUTME: Timing rule module: meal windows, evening pace, late/night eating
// ABOUTME: Declarative table; every condition reads only the context
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meal-timing rules. These lean on the per-id time windows in the catalog
//! for hard cutoffs, but each condition is also self-sufficient so a
//! candidate never depends on the filter cascade for correctness.

use super::DeclarativeRule;
use crate::context::AdviceContext;
use crate::types::{Advice, AdviceCategory, AdviceKind};

use AdviceCategory::Timing;

fn last_meal_hour(ctx: &AdviceContext) -> Option<u32> {
    ctx.day.meals.iter().filter_map(|m| m.hour).max()
}

fn no_breakfast_yet(ctx: &AdviceContext) -> bool {
    ctx.meal_count == 0 && (9..12).contains(&ctx.hour)
}

fn breakfast_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "morning_breakfast",
        "No breakfast yet. Even something light gets the metabolism going",
        Timing,
        AdviceKind::Tip,
        20,
    )
    .with_icon("\u{1f373}")
}

fn lunch_skipped(ctx: &AdviceContext) -> bool {
    (11..15).contains(&ctx.hour)
        && ctx.meal_count >= 1
        && !ctx
            .day
            .meals
            .iter()
            .any(|m| m.hour.is_some_and(|h| (11..15).contains(&h)))
}

fn lunch_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "lunch_time",
        "Lunch window is open. A solid midday meal prevents evening overeating",
        Timing,
        AdviceKind::Tip,
        30,
    )
    .with_icon("\u{1f372}")
}

fn evening_behind(ctx: &AdviceContext) -> bool {
    ctx.hour >= 18 && ctx.kcal_pct < 0.7 && !ctx.is_day_empty
}

fn evening_behind_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "evening_undereating",
        "The day is almost over and you're well under budget. Have a real dinner",
        Timing,
        AdviceKind::Warning,
        10,
    )
    .with_icon("\u{1f319}")
}

fn evening_on_target(ctx: &AdviceContext) -> bool {
    ctx.hour >= 20 && ctx.meal_count >= 2 && ctx.goal.in_target_range(ctx.kcal_pct)
}

fn evening_on_target_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "evening_perfect",
        "Landing the day right on target, ${firstName}. Textbook",
        Timing,
        AdviceKind::Success,
        25,
    )
    .with_icon("\u{1f3af}")
}

fn late_dinner(ctx: &AdviceContext) -> bool {
    ctx.hour >= 21 && last_meal_hour(ctx).is_some_and(|h| h >= 21)
}

fn late_dinner_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "late_dinner_warning",
        "Eating this late can disturb sleep. Keep it light",
        Timing,
        AdviceKind::Warning,
        20,
    )
    .with_icon("\u{1f315}")
}

fn night_eating(ctx: &AdviceContext) -> bool {
    (1..5).contains(&ctx.hour) && ctx.meal_count >= 1
}

fn night_eating_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "night_owl_warning",
        "Night eating throws off both sleep and hunger hormones. Water, then bed",
        Timing,
        AdviceKind::Warning,
        18,
    )
    .with_icon("\u{1f989}")
}

fn snack_window_open(ctx: &AdviceContext) -> bool {
    ctx.hour == 16 && ctx.kcal_pct < 0.6 && !ctx.is_day_empty
}

fn snack_window_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "snack_window",
        "Four o'clock and well under budget. A snack now keeps dinner sane",
        Timing,
        AdviceKind::Tip,
        51,
    )
    .with_icon("\u{1f96a}")
}

fn bedtime_protein_short(ctx: &AdviceContext) -> bool {
    (20..23).contains(&ctx.hour) && ctx.protein_pct < 0.8 && !ctx.is_day_empty
}

fn bedtime_protein_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "bedtime_protein",
        "A few hours to bedtime and protein is short. Cottage cheese or yogurt digests slowly overnight",
        Timing,
        AdviceKind::Tip,
        35,
    )
    .with_icon("\u{1f95b}")
}

fn long_meal_gap(ctx: &AdviceContext) -> bool {
    ctx.hour < 21
        && ctx.meal_count >= 1
        && last_meal_hour(ctx).is_some_and(|h| h + 5 <= ctx.hour)
}

fn long_meal_gap_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "meal_gap_long",
        "Over five hours since the last meal. A snack now beats ravenous later",
        Timing,
        AdviceKind::Tip,
        28,
    )
    .with_icon("\u{23f3}")
}

pub(super) const RULES: &[DeclarativeRule] = &[
    DeclarativeRule { condition: no_breakfast_yet, build: breakfast_advice },
    DeclarativeRule { condition: lunch_skipped, build: lunch_advice },
    DeclarativeRule { condition: evening_behind, build: evening_behind_advice },
    DeclarativeRule { condition: evening_on_target, build: evening_on_target_advice },
    DeclarativeRule { condition: snack_window_open, build: snack_window_advice },
    DeclarativeRule { condition: bedtime_protein_short, build: bedtime_protein_advice },
    DeclarativeRule { condition: late_dinner, build: late_dinner_advice },
    DeclarativeRule { condition: night_eating, build: night_eating_advice },
    DeclarativeRule { condition: long_meal_gap, build: long_meal_gap_advice },
];
