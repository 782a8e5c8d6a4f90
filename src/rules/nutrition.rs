// ABOUTME: Nutrition rule module: calorie budget, macros, per-meal balance
// ABOUTME: Functional module; consults Helpers for meal totals and category coverage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calorie and macro rules. Everything here is keyed off the precomputed
//! context ratios; only the per-meal protein check and the product-category
//! nudge need the resolver, which is why this module is functional rather
//! than declarative.

use crate::context::{AdviceContext, EmotionalState};
use crate::helpers::Helpers;
use crate::insights::missing_categories;
use crate::types::{Advice, AdviceCategory, AdviceKind};
use chrono::Duration;

use AdviceCategory::Nutrition;

pub(super) fn generate(ctx: &AdviceContext, helpers: &Helpers) -> Vec<Advice> {
    let mut out = Vec::new();
    if ctx.is_day_empty {
        return out;
    }

    if ctx.is_critically_over() && ctx.meal_count >= 1 {
        out.push(
            Advice::new(
                "kcal_excess_critical",
                "Seriously over the calorie budget today. A walk now beats regret later",
                Nutrition,
                AdviceKind::Critical,
                1,
            )
            .with_icon("\u{1f6a8}")
            .with_excludes(&["evening_perfect", "kcal_excess_mild"])
            .skip_cooldown(),
        );
    } else if ctx.kcal_pct > ctx.goal.target_range.1 && !ctx.is_refeed_excess_ok && ctx.meal_count >= 1 {
        out.push(
            Advice::new(
                "kcal_excess_mild",
                "Slightly over budget. A lighter dinner evens the day out",
                Nutrition,
                AdviceKind::Warning,
                10,
            )
            .with_icon("\u{1f37d}"),
        );
    }

    if ctx.emotional_state == EmotionalState::Crashed && ctx.kcal_pct < 0.7 && ctx.hour >= 18 {
        out.push(
            Advice::new(
                "undereating_warning",
                "Well short of the calorie budget and the day is ending. Eat something real, even this late",
                Nutrition,
                AdviceKind::Warning,
                1,
            )
            .with_icon("\u{26a0}")
            .with_triggers(&["tab_open", "product_added"])
            .with_excludes(&["crash_support"])
            .skip_cooldown(),
        );
    }

    if ctx.is_critically_under() && ctx.hour >= 16 && ctx.meal_count >= 1 {
        out.push(
            Advice::new(
                "kcal_under_critical",
                "Well under your calorie budget. Your body needs fuel, add a proper meal",
                Nutrition,
                AdviceKind::Warning,
                8,
            )
            .with_icon("\u{26a1}"),
        );
    }

    if ctx.protein_pct < 0.5 && ctx.meal_count >= 1 && ctx.hour >= 11 {
        out.push(
            Advice::new(
                "protein_low",
                "Protein is lagging today. Chicken, fish, eggs or cottage cheese",
                Nutrition,
                AdviceKind::Warning,
                15,
            )
            .with_icon("\u{1f969}")
            .with_triggers(&["tab_open", "product_added"]),
        );
    }
    if ctx.protein_pct >= 1.2 {
        out.push(
            Advice::new(
                "protein_champion",
                "Protein norm crushed. Your muscles say thanks",
                Nutrition,
                AdviceKind::Achievement,
                35,
            )
            .with_icon("\u{1f4aa}"),
        );
    }

    if ctx.fiber_pct < 0.3 && ctx.meal_count >= 2 {
        out.push(
            Advice::new(
                "fiber_low",
                "Fiber is running low. Vegetables, greens or whole grains",
                Nutrition,
                AdviceKind::Warning,
                15,
            )
            .with_icon("\u{1f966}")
            .with_triggers(&["tab_open", "product_added"]),
        );
    }
    if ctx.fiber_pct >= 1.0 {
        out.push(
            Advice::new(
                "fiber_good",
                "Fiber goal reached. Your gut is happy",
                Nutrition,
                AdviceKind::Success,
                40,
            )
            .with_icon("\u{2705}"),
        );
    }

    if ctx.simple_pct > 1.3 {
        out.push(
            Advice::new(
                "simple_carbs_warning",
                "A lot of fast sugar today. Swap the next sweet thing for fruit",
                Nutrition,
                AdviceKind::Warning,
                12,
            )
            .with_icon("\u{1f36c}")
            .with_triggers(&["tab_open", "product_added"]),
        );
    }

    let carbs = ctx.day.totals.carbs;
    if carbs > 50.0 && ctx.day.totals.simple / carbs > 0.5 {
        out.push(
            Advice::new(
                "simple_complex_ratio",
                "Over half of today's carbs are fast sugar. Porridge or whole-grain bread would rebalance it",
                Nutrition,
                AdviceKind::Tip,
                34,
            )
            .with_icon("\u{2696}")
            .with_triggers(&["product_added"]),
        );
    }

    if ctx.trans_pct > 1.0 {
        out.push(
            Advice::new(
                "trans_fat_warning",
                "Trans fats are over the ceiling. Check labels for margarine and frying oils",
                Nutrition,
                AdviceKind::Critical,
                5,
            )
            .with_icon("\u{26a0}")
            .skip_cooldown(),
        );
    }
    if ctx.fat_pct > 0.3 && ctx.good_fat_ratio < 0.4 {
        out.push(
            Advice::new(
                "fat_quality_low",
                "Mostly saturated fat so far. Nuts, avocado or olive oil would balance it",
                Nutrition,
                AdviceKind::Warning,
                20,
            )
            .with_icon("\u{1f951}"),
        );
    } else if ctx.fat_pct > 0.4 && ctx.good_fat_ratio >= 0.6 {
        out.push(
            Advice::new(
                "fat_quality_great",
                "Great fat quality today, mostly unsaturated",
                Nutrition,
                AdviceKind::Success,
                38,
            )
            .with_icon("\u{1f31f}"),
        );
    }

    if let Some(advice) = protein_per_meal(ctx, helpers) {
        out.push(advice);
    }
    if let Some(advice) = evening_carbs(ctx, helpers) {
        out.push(advice);
    }
    if let Some(advice) = chronic_undereating(ctx, helpers) {
        out.push(advice);
    }
    if let Some(advice) = vegetables_missing(ctx) {
        out.push(advice);
    }
    out
}

/// A carb-heavy last meal late in the evening.
fn evening_carbs(ctx: &AdviceContext, helpers: &Helpers) -> Option<Advice> {
    if ctx.hour < 20 {
        return None;
    }
    let last = ctx
        .day
        .meals
        .iter()
        .filter(|m| !m.items.is_empty())
        .max_by_key(|m| m.hour.unwrap_or(0))?;
    let totals = helpers.meal_totals(last);
    (totals.carbs > 50.0).then(|| {
        Advice::new(
            "evening_carbs_high",
            "A carb-heavy meal this late can mean a hungry morning. Protein and vegetables sit better at night",
            Nutrition,
            AdviceKind::Tip,
            74,
        )
        .with_icon("\u{1f319}")
        .with_triggers(&["product_added"])
    })
}

/// Three recorded days running well under the calorie norm.
fn chronic_undereating(ctx: &AdviceContext, helpers: &Helpers) -> Option<Advice> {
    let chronic = (1..=3).all(|offset| {
        helpers
            .history
            .day(ctx.day.date - Duration::days(offset))
            .is_some_and(|d| !d.meals.is_empty() && d.totals.kcal / ctx.norms.kcal.max(1.0) < 0.75)
    });
    chronic.then(|| {
        Advice::new(
            "chronic_undereating_pattern",
            "Three days running well under the norm. Chronic deficits slow metabolism and cost muscle",
            Nutrition,
            AdviceKind::Warning,
            3,
        )
        .with_icon("\u{1f6a8}")
        .skip_cooldown()
    })
}

/// A substantial meal with almost no protein in it.
fn protein_per_meal(ctx: &AdviceContext, helpers: &Helpers) -> Option<Advice> {
    let skewed = ctx.day.meals.iter().any(|meal| {
        let totals = helpers.meal_totals(meal);
        totals.kcal > 300.0 && totals.protein < 20.0
    });
    skewed.then(|| {
        Advice::new(
            "protein_per_meal_low",
            "One of today's meals was big but nearly protein-free. Aim for protein in every meal",
            Nutrition,
            AdviceKind::Tip,
            22,
        )
        .with_icon("\u{1f37d}")
    })
}

/// No vegetables logged by early afternoon despite named items being present.
fn vegetables_missing(ctx: &AdviceContext) -> Option<Advice> {
    if ctx.hour < 13 || ctx.meal_count < 2 {
        return None;
    }
    if !ctx.day.meals.iter().any(|m| !m.items.is_empty()) {
        return None;
    }
    let missing = missing_categories(&ctx.day.meals);
    let veg = missing.iter().find(|c| c.key == "vegetables")?;
    Some(
        Advice::new("missing_vegetables", veg.advice, Nutrition, AdviceKind::Tip, 40)
            .with_icon(veg.icon),
    )
}
