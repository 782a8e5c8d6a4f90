// ABOUTME: Read-only insight helpers over the day history and meal log
// ABOUTME: Day pace forecast, week-over-week comparison, product-category coverage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Insights
//!
//! Small derived views the rule modules (and the host UI) consume: how the
//! day's calorie intake tracks against the expected pace for the hour,
//! week-over-week averages, and which product categories today's meals
//! covered.

use crate::catalog::{ProductCategory, EXPECTED_KCAL_BY_HOUR, PRODUCT_CATEGORIES};
use crate::context::Meal;
use crate::helpers::DayHistory;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

/// Expected share of the daily calorie budget consumed by `hour`.
#[must_use]
pub fn expected_kcal_share(hour: u32) -> f64 {
    for (limit, share) in EXPECTED_KCAL_BY_HOUR {
        if hour <= *limit {
            return *share;
        }
    }
    1.0
}

/// How the day is pacing against the calorie budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayForecast {
    /// Expected share for the current hour
    pub expected_pct: f64,
    /// Actual kcal ratio so far
    pub actual_pct: f64,
    /// Signed gap (actual − expected)
    pub delta: f64,
    /// Within ±15 points of the expected pace
    pub on_track: bool,
}

/// Compare the actual kcal ratio against the expected pace for the hour.
#[must_use]
pub fn day_forecast(kcal_pct: f64, hour: u32) -> DayForecast {
    let expected_pct = expected_kcal_share(hour);
    let delta = kcal_pct - expected_pct;
    DayForecast {
        expected_pct,
        actual_pct: kcal_pct,
        delta,
        on_track: delta.abs() <= 0.15,
    }
}

/// Week-over-week averages, computed over recorded days only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyComparison {
    /// Average kcal over the last 7 recorded days
    pub current_avg_kcal: f64,
    /// Average kcal over the 7 days before those
    pub previous_avg_kcal: f64,
    /// Average protein over the last 7 recorded days
    pub current_avg_protein: f64,
    /// Average protein over the prior window
    pub previous_avg_protein: f64,
    /// Relative kcal change, current vs previous
    pub kcal_change_pct: f64,
}

fn window_avg(history: &dyn DayHistory, today: NaiveDate, offsets: std::ops::RangeInclusive<i64>) -> Option<(f64, f64)> {
    let mut kcal_sum = 0.0;
    let mut protein_sum = 0.0;
    let mut count = 0u32;
    for offset in offsets {
        if let Some(day) = history.day(today - Duration::days(offset)) {
            kcal_sum += day.totals.kcal;
            protein_sum += day.totals.protein;
            count += 1;
        }
    }
    (count > 0).then(|| (kcal_sum / f64::from(count), protein_sum / f64::from(count)))
}

/// Compare the last seven days against the seven before them. `None` when
/// either window has no recorded days.
#[must_use]
pub fn weekly_comparison(history: &dyn DayHistory, today: NaiveDate) -> Option<WeeklyComparison> {
    let (current_avg_kcal, current_avg_protein) = window_avg(history, today, 1..=7)?;
    let (previous_avg_kcal, previous_avg_protein) = window_avg(history, today, 8..=14)?;
    let kcal_change_pct = if previous_avg_kcal > 0.0 {
        (current_avg_kcal - previous_avg_kcal) / previous_avg_kcal
    } else {
        0.0
    };
    Some(WeeklyComparison {
        current_avg_kcal,
        previous_avg_kcal,
        current_avg_protein,
        previous_avg_protein,
        kcal_change_pct,
    })
}

/// Which product categories today's meal items cover, by keyword match on
/// the logged (lowercased) item names.
#[must_use]
pub fn category_coverage(meals: &[Meal]) -> HashSet<&'static str> {
    let names: Vec<String> = meals
        .iter()
        .flat_map(|m| m.items.iter())
        .map(|item| item.name.to_lowercase())
        .collect();
    PRODUCT_CATEGORIES
        .iter()
        .filter(|category| {
            names
                .iter()
                .any(|name| category.keywords.iter().any(|kw| name.contains(kw)))
        })
        .map(|category| category.key)
        .collect()
}

/// Product categories missing from today's log, in catalog order.
#[must_use]
pub fn missing_categories(meals: &[Meal]) -> Vec<&'static ProductCategory> {
    let covered = category_coverage(meals);
    PRODUCT_CATEGORIES
        .iter()
        .filter(|category| !covered.contains(category.key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DayRecord, DayTotals, MealItem};
    use std::collections::HashMap;

    #[test]
    fn expected_share_steps() {
        assert!((expected_kcal_share(8) - 0.25).abs() < f64::EPSILON);
        assert!((expected_kcal_share(12) - 0.45).abs() < f64::EPSILON);
        assert!((expected_kcal_share(16) - 0.75).abs() < f64::EPSILON);
        assert!((expected_kcal_share(23) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn forecast_on_track_window() {
        let forecast = day_forecast(0.50, 12); // expected 0.45
        assert!(forecast.on_track);
        let behind = day_forecast(0.10, 12);
        assert!(!behind.on_track);
        assert!(behind.delta < 0.0);
    }

    struct MapHistory(HashMap<NaiveDate, DayRecord>);

    impl DayHistory for MapHistory {
        fn day(&self, date: NaiveDate) -> Option<DayRecord> {
            self.0.get(&date).cloned()
        }
    }

    #[test]
    fn weekly_comparison_needs_both_windows() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let mut days = HashMap::new();
        for offset in 1..=7 {
            days.insert(
                today - Duration::days(offset),
                DayRecord {
                    totals: DayTotals { kcal: 1800.0, protein: 100.0, ..DayTotals::default() },
                    ..DayRecord::default()
                },
            );
        }
        let partial = MapHistory(days.clone());
        assert!(weekly_comparison(&partial, today).is_none());

        for offset in 8..=14 {
            days.insert(
                today - Duration::days(offset),
                DayRecord {
                    totals: DayTotals { kcal: 2000.0, protein: 90.0, ..DayTotals::default() },
                    ..DayRecord::default()
                },
            );
        }
        let full = MapHistory(days);
        let comparison = weekly_comparison(&full, today).unwrap();
        assert!((comparison.current_avg_kcal - 1800.0).abs() < f64::EPSILON);
        assert!((comparison.previous_avg_kcal - 2000.0).abs() < f64::EPSILON);
        assert!((comparison.kcal_change_pct + 0.1).abs() < 1e-9);
    }

    #[test]
    fn coverage_by_keyword() {
        let meals = vec![Meal {
            items: vec![
                MealItem { name: "Grilled Chicken breast".to_owned(), ..MealItem::default() },
                MealItem { name: "cucumber salad".to_owned(), ..MealItem::default() },
            ],
            ..Meal::default()
        }];
        let covered = category_coverage(&meals);
        assert!(covered.contains("meat"));
        assert!(covered.contains("vegetables"));
        assert!(!covered.contains("fish"));
        let missing = missing_categories(&meals);
        assert!(missing.iter().any(|c| c.key == "fish"));
    }
}
