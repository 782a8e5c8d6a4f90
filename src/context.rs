// ABOUTME: Raw day/profile inputs and the derived advice context
// ABOUTME: Pure derivation of ratios, goal mode, refeed flags and emotional state
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Context Builder
//!
//! [`AdviceContext::build`] is a pure function from the raw day record,
//! nutrient norms, user profile and optional crash-risk signal to the
//! immutable per-invocation context the whole pipeline reads. Every ratio
//! guards against zero norms with a denominator floor of 1 so an incomplete
//! profile produces conservative ratios instead of infinities.

use crate::types::CrashRisk;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inline nutrient facts per 100 g, used when an item cannot be resolved
/// through the product catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Calories per 100 g
    pub kcal100: f64,
    /// Protein grams per 100 g
    pub protein100: f64,
    /// Carbohydrate grams per 100 g
    pub carbs100: f64,
    /// Fat grams per 100 g
    pub fat100: f64,
    /// Fiber grams per 100 g
    pub fiber100: f64,
    /// Simple-sugar grams per 100 g
    pub simple100: f64,
}

/// One logged meal item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Product name as logged
    pub name: String,
    /// Legacy numeric product id, if the entry predates name lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    /// Portion weight in grams
    pub grams: f64,
    /// Inline nutrient fallback when the resolver knows nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<ProductInfo>,
}

/// One logged meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Hour of day the meal was logged at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    /// Items in the meal
    #[serde(default)]
    pub items: Vec<MealItem>,
    /// Mood rating 1-5 logged with the meal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<f64>,
    /// Stress rating 1-5 logged with the meal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
}

/// One logged training session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Training {
    /// Duration in minutes
    pub minutes: f64,
    /// Session included a high-intensity block
    #[serde(default)]
    pub high_intensity: bool,
}

/// Aggregated day totals, precomputed by the tracking layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    /// Calories
    pub kcal: f64,
    /// Protein grams
    pub protein: f64,
    /// Carbohydrate grams
    pub carbs: f64,
    /// Simple-sugar grams
    pub simple: f64,
    /// Fiber grams
    pub fiber: f64,
    /// Fat grams
    pub fat: f64,
    /// Trans-fat grams
    pub trans: f64,
    /// Healthy (mono/poly-unsaturated) fat grams
    pub good_fat: f64,
    /// "Harm" score (junk-food index)
    pub harm: f64,
}

/// Absolute daily nutrient norms for the user. Their absence makes the
/// pipeline fail fast with an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientNorms {
    /// Calorie budget
    pub kcal: f64,
    /// Protein grams
    pub protein: f64,
    /// Carbohydrate grams
    pub carbs: f64,
    /// Simple-sugar ceiling, grams
    pub simple: f64,
    /// Fiber grams
    pub fiber: f64,
    /// Fat grams
    pub fat: f64,
    /// Trans-fat ceiling, grams
    pub trans: f64,
    /// Harm-score ceiling
    pub harm: f64,
    /// Water goal in milliliters
    pub water_ml: f64,
}

/// One tracked day as stored by the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Calendar date
    pub date: NaiveDate,
    /// Logged meals in order
    #[serde(default)]
    pub meals: Vec<Meal>,
    /// Aggregated totals
    #[serde(default)]
    pub totals: DayTotals,
    /// Water logged, milliliters
    #[serde(default)]
    pub water_ml: f64,
    /// Configured caloric deficit/surplus percent (negative = deficit)
    #[serde(default)]
    pub deficit_pct: f64,
    /// Planned refeed day
    #[serde(default)]
    pub is_refeed: bool,
    /// Sleep duration the preceding night, hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Subjective sleep quality rating 1-5 for the preceding night
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<f64>,
    /// Training sessions logged today
    #[serde(default)]
    pub trainings: Vec<Training>,
}

/// User profile facts the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// First name for text personalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Current consecutive-day streak
    #[serde(default)]
    pub streak_days: u32,
    /// Last time the user opened the tracker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<DateTime<Utc>>,
    /// Norm for sleep, hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_norm_hours: Option<f64>,
}

/// Caloric target strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    /// Losing weight
    Deficit,
    /// Holding steady
    Maintenance,
    /// Gaining mass
    Bulk,
}

impl GoalKind {
    /// Lowercase key used for the goal-prefix priority boost.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deficit => "deficit",
            Self::Maintenance => "maintenance",
            Self::Bulk => "bulk",
        }
    }
}

/// Goal mode with its acceptable and critical kcal-ratio thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalMode {
    /// Strategy kind
    pub kind: GoalKind,
    /// Acceptable kcal ratio range (inclusive)
    pub target_range: (f64, f64),
    /// Ratio above which the day counts as critically over
    pub critical_over: f64,
    /// Ratio below which the day counts as critically under
    pub critical_under: f64,
}

impl GoalMode {
    /// Classify a configured deficit percent into a goal mode. Steeper
    /// deficits/surpluses get tighter target ranges.
    #[must_use]
    pub fn from_deficit_pct(deficit_pct: f64) -> Self {
        if deficit_pct <= -10.0 {
            Self { kind: GoalKind::Deficit, target_range: (0.90, 1.05), critical_over: 1.15, critical_under: 0.80 }
        } else if deficit_pct <= -5.0 {
            Self { kind: GoalKind::Deficit, target_range: (0.92, 1.08), critical_over: 1.20, critical_under: 0.75 }
        } else if deficit_pct >= 10.0 {
            Self { kind: GoalKind::Bulk, target_range: (0.95, 1.10), critical_over: 1.25, critical_under: 0.85 }
        } else if deficit_pct >= 5.0 {
            Self { kind: GoalKind::Bulk, target_range: (0.93, 1.12), critical_over: 1.20, critical_under: 0.80 }
        } else {
            Self { kind: GoalKind::Maintenance, target_range: (0.90, 1.10), critical_over: 1.25, critical_under: 0.70 }
        }
    }

    /// Is the kcal ratio inside the acceptable range?
    #[must_use]
    pub fn in_target_range(&self, kcal_pct: f64) -> bool {
        kcal_pct >= self.target_range.0 && kcal_pct <= self.target_range.1
    }
}

/// Coarse emotional state derived from recent behavior, goal-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    /// Back after more than three days away
    Returning,
    /// Critically over or under the calorie target
    Crashed,
    /// Low average mood today
    Stressed,
    /// On a streak or inside the target range
    Success,
    /// Nothing notable
    Normal,
}

/// Immutable per-invocation context consumed by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceContext {
    /// The raw day record (rule modules read meals/trainings directly)
    pub day: DayRecord,
    /// Nutrient norms
    pub norms: NutrientNorms,
    /// Timestamp of the invocation
    pub now: DateTime<Utc>,
    /// Local hour of day at the invocation
    pub hour: u32,
    /// Number of logged meals
    pub meal_count: usize,
    /// Protein ratio to norm
    pub protein_pct: f64,
    /// Fat ratio to norm
    pub fat_pct: f64,
    /// Carbohydrate ratio to norm
    pub carbs_pct: f64,
    /// Fiber ratio to norm
    pub fiber_pct: f64,
    /// Simple-sugar ratio to ceiling
    pub simple_pct: f64,
    /// Trans-fat ratio to ceiling
    pub trans_pct: f64,
    /// Harm-score ratio to ceiling
    pub harm_pct: f64,
    /// Share of healthy fat within total fat
    pub good_fat_ratio: f64,
    /// Calorie ratio to budget
    pub kcal_pct: f64,
    /// Water ratio to goal
    pub water_pct: f64,
    /// Planned refeed day
    pub is_refeed_day: bool,
    /// Refeed day with an acceptable surplus (100% < kcal <= 135%)
    pub is_refeed_excess_ok: bool,
    /// Nothing logged yet today
    pub is_day_empty: bool,
    /// Goal mode derived from the configured deficit percent
    pub goal: GoalMode,
    /// Emotional state
    pub emotional_state: EmotionalState,
    /// Average of logged meal moods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_mood: Option<f64>,
    /// External crash-risk signal, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_risk: Option<CrashRisk>,
    /// Rendering layer is mid-interaction; suppress noisy advice
    #[serde(default)]
    pub ui_busy: bool,
    /// Current consecutive-day streak
    pub streak_days: u32,
    /// First name for personalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Sleep norm from the profile, hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_norm_hours: Option<f64>,
    /// Hour of the first logged meal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_meal_hour: Option<u32>,
}

/// Ratio with a denominator floor of 1 so zero/absent norms cannot blow up.
fn ratio(value: f64, norm: f64) -> f64 {
    value / norm.max(1.0)
}

impl AdviceContext {
    /// Derive the full context. Pure: no clock reads, no storage access.
    #[must_use]
    pub fn build(
        day: DayRecord,
        norms: NutrientNorms,
        profile: &UserProfile,
        now: DateTime<Utc>,
        hour: u32,
        crash_risk: Option<CrashRisk>,
        ui_busy: bool,
    ) -> Self {
        let totals = day.totals;
        let kcal_pct = ratio(totals.kcal, norms.kcal);
        let meal_count = day.meals.len();
        let is_refeed_day = day.is_refeed;
        let is_refeed_excess_ok = is_refeed_day && kcal_pct > 1.0 && kcal_pct <= 1.35;
        let is_day_empty = totals.kcal < 10.0 && meal_count == 0;
        let goal = GoalMode::from_deficit_pct(day.deficit_pct);

        let moods: Vec<f64> = day.meals.iter().filter_map(|m| m.mood).collect();
        let avg_mood = if moods.is_empty() {
            None
        } else {
            Some(moods.iter().sum::<f64>() / moods.len() as f64)
        };

        let first_meal_hour = day.meals.iter().filter_map(|m| m.hour).min();

        let mut ctx = Self {
            protein_pct: ratio(totals.protein, norms.protein),
            fat_pct: ratio(totals.fat, norms.fat),
            carbs_pct: ratio(totals.carbs, norms.carbs),
            fiber_pct: ratio(totals.fiber, norms.fiber),
            simple_pct: ratio(totals.simple, norms.simple),
            trans_pct: ratio(totals.trans, norms.trans),
            harm_pct: ratio(totals.harm, norms.harm),
            good_fat_ratio: ratio(totals.good_fat, totals.fat),
            water_pct: ratio(day.water_ml, norms.water_ml),
            kcal_pct,
            is_refeed_day,
            is_refeed_excess_ok,
            is_day_empty,
            goal,
            emotional_state: EmotionalState::Normal,
            avg_mood,
            crash_risk,
            ui_busy,
            streak_days: profile.streak_days,
            first_name: profile.first_name.clone(),
            sleep_norm_hours: profile.sleep_norm_hours,
            first_meal_hour,
            meal_count,
            day,
            norms,
            now,
            hour,
        };
        ctx.emotional_state = detect_emotional_state(&ctx, profile);
        ctx
    }

    /// Critically over the calorie target (refeed surplus excused).
    #[must_use]
    pub fn is_critically_over(&self) -> bool {
        self.kcal_pct >= self.goal.critical_over && !self.is_refeed_excess_ok
    }

    /// Critically under the calorie target.
    #[must_use]
    pub fn is_critically_under(&self) -> bool {
        self.kcal_pct > 0.0 && self.kcal_pct <= self.goal.critical_under
    }

    /// Total training minutes logged today.
    #[must_use]
    pub fn training_minutes(&self) -> f64 {
        self.day.trainings.iter().map(|t| t.minutes).sum()
    }
}

/// Goal-aware emotional state detection. Over-target crashes only register
/// from mid-morning with at least one meal; under-target only from the
/// evening, so a slow start is not misread as a crash.
fn detect_emotional_state(ctx: &AdviceContext, profile: &UserProfile) -> EmotionalState {
    if let Some(last_visit) = profile.last_visit {
        if (ctx.now - last_visit).num_days() > 3 {
            return EmotionalState::Returning;
        }
    }
    let has_meals = ctx.meal_count >= 1;
    if ctx.is_critically_over() && ctx.hour >= 10 && has_meals {
        return EmotionalState::Crashed;
    }
    if ctx.is_critically_under() && ctx.hour >= 18 && has_meals {
        return EmotionalState::Crashed;
    }
    if let Some(mood) = ctx.avg_mood {
        if mood > 0.0 && mood < 3.0 {
            return EmotionalState::Stressed;
        }
    }
    if ctx.streak_days >= 3 || ctx.goal.in_target_range(ctx.kcal_pct) {
        return EmotionalState::Success;
    }
    EmotionalState::Normal
}
