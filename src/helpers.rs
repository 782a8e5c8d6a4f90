// ABOUTME: Injected collaborator contracts: product resolver, day history, crash risk
// ABOUTME: Replaces ambient global lookups with an explicit dependency bundle
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Collaborator Bundle
//!
//! Everything the engine needs from the host application arrives through
//! [`Helpers`] at construction time. Each collaborator is optional in spirit:
//! a resolver that knows nothing and an empty history are valid, and the
//! engine degrades instead of failing when a collaborator misbehaves.

use crate::context::{DayRecord, MealItem, ProductInfo};
use crate::types::CrashRisk;
use chrono::NaiveDate;

/// Resolves a logged meal item to nutrient facts: by normalized name first,
/// then by legacy numeric id. The engine itself falls back to the item's
/// inline nutrient fields when the resolver returns `None`.
pub trait ProductResolver: Send {
    /// Look up by normalized (trimmed, lowercased) product name.
    fn by_name(&self, normalized_name: &str) -> Option<ProductInfo>;
    /// Look up by legacy numeric id.
    fn by_legacy_id(&self, id: i64) -> Option<ProductInfo>;
}

/// Read-only access to previously tracked days.
pub trait DayHistory: Send {
    /// The day record for a date, `None` when nothing was tracked.
    fn day(&self, date: NaiveDate) -> Option<DayRecord>;
}

/// Optional external crash-risk signal.
pub trait CrashRiskSource: Send {
    /// Current risk assessment, `None` when the signal cannot be computed.
    fn crash_risk(&self) -> Option<CrashRisk>;
}

/// A resolver that knows nothing; inline nutrient fields still work.
pub struct NullResolver;

impl ProductResolver for NullResolver {
    fn by_name(&self, _normalized_name: &str) -> Option<ProductInfo> {
        None
    }
    fn by_legacy_id(&self, _id: i64) -> Option<ProductInfo> {
        None
    }
}

/// An empty history.
pub struct NullHistory;

impl DayHistory for NullHistory {
    fn day(&self, _date: NaiveDate) -> Option<DayRecord> {
        None
    }
}

/// Dependency bundle handed to the engine.
pub struct Helpers {
    /// Product/ingredient resolver
    pub products: Box<dyn ProductResolver>,
    /// Historical day reader
    pub history: Box<dyn DayHistory>,
    /// Crash-risk signal, when the host provides one
    pub crash_risk: Option<Box<dyn CrashRiskSource>>,
}

impl Helpers {
    /// A bundle with inert collaborators, useful for tests and minimal hosts.
    #[must_use]
    pub fn null() -> Self {
        Self {
            products: Box::new(NullResolver),
            history: Box::new(NullHistory),
            crash_risk: None,
        }
    }

    /// Resolve a meal item: normalized name, then legacy id, then the item's
    /// own inline nutrient fields.
    #[must_use]
    pub fn resolve_item(&self, item: &MealItem) -> Option<ProductInfo> {
        let normalized = item.name.trim().to_lowercase();
        if !normalized.is_empty() {
            if let Some(info) = self.products.by_name(&normalized) {
                return Some(info);
            }
        }
        if let Some(id) = item.product_id {
            if let Some(info) = self.products.by_legacy_id(id) {
                return Some(info);
            }
        }
        item.inline
    }

    /// Fetch the crash-risk signal, treating a missing source as no signal.
    #[must_use]
    pub fn current_crash_risk(&self) -> Option<CrashRisk> {
        self.crash_risk.as_ref().and_then(|source| source.crash_risk())
    }

    /// Nutrient totals for one meal, resolving each item and scaling by
    /// portion weight. Unresolvable items contribute nothing.
    #[must_use]
    pub fn meal_totals(&self, meal: &crate::context::Meal) -> MealTotals {
        let mut totals = MealTotals::default();
        for item in &meal.items {
            if let Some(info) = self.resolve_item(item) {
                let factor = item.grams / 100.0;
                totals.kcal += info.kcal100 * factor;
                totals.protein += info.protein100 * factor;
                totals.carbs += info.carbs100 * factor;
                totals.fat += info.fat100 * factor;
                totals.fiber += info.fiber100 * factor;
                totals.simple += info.simple100 * factor;
            }
        }
        totals
    }
}

/// Nutrient totals for a single meal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MealTotals {
    /// Calories
    pub kcal: f64,
    /// Protein grams
    pub protein: f64,
    /// Carbohydrate grams
    pub carbs: f64,
    /// Fat grams
    pub fat: f64,
    /// Fiber grams
    pub fiber: f64,
    /// Simple-sugar grams
    pub simple: f64,
}
