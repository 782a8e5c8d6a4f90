// ABOUTME: Multi-factor smart score blending priority with learned engagement signals
// ABOUTME: Dismiss penalty divides priority ahead of scoring; sort is stable descending
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Scorer / Ranker
//!
//! `smart_score` starts from the inverted static priority and adds weighted
//! terms for click-through rate, user ratings, recency, contextual relevance
//! and crash risk. The CTR weight is shared between the CTR and rating terms;
//! the formula is preserved exactly as tuned. Ties keep the original
//! module-concatenation order (the sort is stable).

use crate::catalog::{CRASH_PREVENTION_CATEGORIES, CRASH_PREVENTION_IDS};
use crate::config::ScoringConfig;
use crate::context::AdviceContext;
use crate::feedback::{Rating, TrackingStat};
use crate::types::{Advice, AdviceCategory, RiskLevel};
use std::collections::HashMap;

/// Divide priority by the quick-dismiss penalty factor, raising its effective
/// value (and thereby lowering the score) for advice the user swats away.
#[must_use]
pub fn apply_dismiss_penalty(priority: i32, penalty_factor: f64) -> i32 {
    if penalty_factor >= 1.0 {
        return priority;
    }
    (f64::from(priority) / penalty_factor).round() as i32
}

/// Nutrient ratio relevant to an advice id, if the id names one.
fn tracked_ratio(advice_id: &str, ctx: &AdviceContext) -> Option<f64> {
    const NUTRIENTS: &[(&str, fn(&AdviceContext) -> f64)] = &[
        ("protein", |c| c.protein_pct),
        ("fiber", |c| c.fiber_pct),
        ("carbs", |c| c.carbs_pct),
        ("fat", |c| c.fat_pct),
        ("kcal", |c| c.kcal_pct),
    ];
    NUTRIENTS
        .iter()
        .find(|(name, _)| advice_id.contains(name))
        .map(|(_, ratio)| ratio(ctx))
}

fn is_crash_prevention(advice: &Advice) -> bool {
    CRASH_PREVENTION_CATEGORIES.contains(&advice.category)
        || CRASH_PREVENTION_IDS.contains(&advice.id.as_str())
}

fn is_stress_related(advice: &Advice) -> bool {
    advice.category == AdviceCategory::Emotional || advice.id.contains("stress")
}

/// Compute the smart score for one advice. `advice.priority` must already
/// carry the dismiss penalty.
#[must_use]
pub fn smart_score(
    advice: &Advice,
    ctx: &AdviceContext,
    tracking: &HashMap<String, TrackingStat>,
    ratings: &HashMap<String, Rating>,
    config: &ScoringConfig,
) -> f64 {
    let mut score = 100.0 - f64::from(advice.priority);

    if let Some(stat) = tracking.get(&advice.id) {
        if stat.shown >= config.min_shown_for_ctr {
            score += config.ctr_weight * 50.0 * stat.ctr();
        }
    }

    if let Some(rating) = ratings.get(&advice.id) {
        if rating.votes() >= config.min_votes_for_rating {
            // Shared weight with the CTR term, as tuned.
            score += config.ctr_weight * 30.0 * rating.score();
        }
    }

    match tracking.get(&advice.id).and_then(|s| s.last_shown) {
        Some(last_shown) => {
            let hours_since = (ctx.now - last_shown).num_minutes() as f64 / 60.0;
            if hours_since > 24.0 {
                score += config.recency_weight * 10.0 * (hours_since / 24.0).min(5.0);
            }
        }
        None => {
            // Never shown before gets a modest novelty bump.
            score += config.recency_weight * 10.0;
        }
    }

    if advice.category == AdviceCategory::Nutrition {
        if let Some(ratio) = tracked_ratio(&advice.id, ctx) {
            if ratio < 0.5 {
                score += config.relevance_weight * 20.0;
            }
        }
    }

    if let Some(risk) = &ctx.crash_risk {
        match risk.level {
            RiskLevel::High if is_crash_prevention(advice) => score += config.crash_high_boost,
            RiskLevel::Medium if is_stress_related(advice) => score += config.crash_medium_boost,
            _ => {}
        }
    }

    score
}

/// Sort descending by smart score; stable, so ties keep module order.
pub fn sort_by_smart_score(
    advices: &mut [Advice],
    ctx: &AdviceContext,
    tracking: &HashMap<String, TrackingStat>,
    ratings: &HashMap<String, Rating>,
    config: &ScoringConfig,
) {
    let scores: HashMap<String, f64> = advices
        .iter()
        .map(|a| (a.id.clone(), smart_score(a, ctx, tracking, ratings, config)))
        .collect();
    advices.sort_by(|a, b| {
        let sa = scores.get(&a.id).copied().unwrap_or(0.0);
        let sb = scores.get(&b.id).copied().unwrap_or(0.0);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });
}
