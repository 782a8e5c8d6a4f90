// ABOUTME: Rule-module registry: category-partitioned candidate generators
// ABOUTME: Tagged union of declarative rule tables and functional generators
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Rule Modules
//!
//! Candidate generation is partitioned into a fixed, ordered list of category
//! modules: nutrition, timing, training, emotional, hydration, other. The
//! order is load-bearing — candidates are concatenated module by module and
//! the scorer's stable sort uses that concatenation order as the tie-break.
//!
//! A module is either **declarative** (a table of `condition` → `build` pairs
//! evaluated independently) or **functional** (a generator free to consult
//! the [`Helpers`] bundle, e.g. for meal resolution or history reads). Both
//! dispatch through [`RuleModule::generate`].

mod emotional;
mod hydration;
mod nutrition;
mod other;
mod timing;
mod training;

use crate::context::AdviceContext;
use crate::helpers::Helpers;
use crate::types::Advice;

/// One declarative rule: a candidacy predicate and a candidate builder.
pub struct DeclarativeRule {
    /// Should this rule produce a candidate for the context?
    pub condition: fn(&AdviceContext) -> bool,
    /// Build the candidate (only called when `condition` held).
    pub build: fn(&AdviceContext) -> Advice,
}

/// A category's candidate generator.
pub enum RuleModule {
    /// Table of independent condition/build pairs
    Declarative(&'static [DeclarativeRule]),
    /// Free-form generator with collaborator access
    Functional(fn(&AdviceContext, &Helpers) -> Vec<Advice>),
}

impl RuleModule {
    /// Produce this module's candidates for the context.
    #[must_use]
    pub fn generate(&self, ctx: &AdviceContext, helpers: &Helpers) -> Vec<Advice> {
        match self {
            Self::Declarative(rules) => rules
                .iter()
                .filter(|rule| (rule.condition)(ctx))
                .map(|rule| (rule.build)(ctx))
                .collect(),
            Self::Functional(run) => run(ctx, helpers),
        }
    }
}

/// The fixed module order. Nutrition first: it carries the highest-stakes
/// advice and wins score ties against later categories.
#[must_use]
pub fn modules() -> [(&'static str, RuleModule); 6] {
    [
        ("nutrition", RuleModule::Functional(nutrition::generate)),
        ("timing", RuleModule::Declarative(timing::RULES)),
        ("training", RuleModule::Declarative(training::RULES)),
        ("emotional", RuleModule::Declarative(emotional::RULES)),
        ("hydration", RuleModule::Declarative(hydration::RULES)),
        ("other", RuleModule::Functional(other::generate)),
    ]
}

/// Run every module in order and concatenate the candidates.
#[must_use]
pub fn collect_candidates(ctx: &AdviceContext, helpers: &Helpers) -> Vec<Advice> {
    let mut candidates = Vec::new();
    for (_, module) in modules() {
        candidates.extend(module.generate(ctx, helpers));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DayRecord, DayTotals, Meal, NutrientNorms, UserProfile};
    use chrono::{NaiveDate, TimeZone, Utc};

    pub(crate) fn norms() -> NutrientNorms {
        NutrientNorms {
            kcal: 2000.0,
            protein: 120.0,
            carbs: 220.0,
            simple: 50.0,
            fiber: 30.0,
            fat: 70.0,
            trans: 2.0,
            harm: 10.0,
            water_ml: 2000.0,
        }
    }

    pub(crate) fn ctx_at(hour: u32, day: DayRecord) -> AdviceContext {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, hour.min(23), 0, 0).unwrap();
        AdviceContext::build(day, norms(), &UserProfile::default(), now, hour, None, false)
    }

    pub(crate) fn day() -> DayRecord {
        DayRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            meals: vec![
                Meal { hour: Some(9), ..Meal::default() },
                Meal { hour: Some(13), ..Meal::default() },
            ],
            totals: DayTotals {
                kcal: 1200.0,
                protein: 70.0,
                carbs: 120.0,
                simple: 25.0,
                fiber: 18.0,
                fat: 40.0,
                good_fat: 22.0,
                ..DayTotals::default()
            },
            water_ml: 1200.0,
            deficit_pct: -15.0,
            ..DayRecord::default()
        }
    }

    #[test]
    fn module_order_is_fixed() {
        let order: Vec<&str> = modules().iter().map(|(name, _)| *name).collect();
        assert_eq!(order, vec!["nutrition", "timing", "training", "emotional", "hydration", "other"]);
    }

    #[test]
    fn candidates_have_unique_ids() {
        let ctx = ctx_at(14, day());
        let candidates = collect_candidates(&ctx, &Helpers::null());
        let mut seen = std::collections::HashSet::new();
        for advice in &candidates {
            assert!(seen.insert(advice.id.clone()), "duplicate candidate id {}", advice.id);
        }
    }

    #[test]
    fn balanced_day_is_not_scolded() {
        let ctx = ctx_at(14, day());
        let candidates = collect_candidates(&ctx, &Helpers::null());
        assert!(!candidates.iter().any(|a| a.id == "kcal_excess_critical"));
        assert!(!candidates.iter().any(|a| a.id == "trans_fat_warning"));
    }
}
