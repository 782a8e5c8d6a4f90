// ABOUTME: Personal bests, multi-day combo achievements and streak milestones
// ABOUTME: Direction-aware record keeping; combos scan history with a per-combo cooldown
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Achievements
//!
//! Three gamification mechanisms feed celebratory candidates into the
//! pipeline: per-metric personal bests (direction-aware, never updated by a
//! non-improving or zero value), combo achievements requiring several
//! qualifying days within a short window, and the streak milestone ladder.

use crate::catalog::{
    trackable_metric, ComboAchievement, ComboConditions, StreakMilestone, COMBO_ACHIEVEMENTS,
    STREAK_MILESTONES,
};
use crate::context::{DayRecord, NutrientNorms};
use crate::helpers::DayHistory;
use crate::storage::{keys, Store};
use crate::types::{Advice, AdviceCategory, AdviceKind};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Stored best for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    /// Best value so far
    pub value: f64,
    /// Date the best was set
    pub date: NaiveDate,
    /// The best it replaced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
}

/// Outcome of a personal-best check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BestCheck {
    /// The value beats the stored best (or is the first recorded value)
    NewRecord {
        /// Best that was replaced, if any
        previous_value: Option<f64>,
        /// Absolute improvement over the previous best
        improvement: f64,
    },
    /// The value does not improve on the stored best
    NotImproved {
        /// Current stored best, if any
        current_best: Option<f64>,
    },
}

impl BestCheck {
    /// Is this a new record?
    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        matches!(self, Self::NewRecord { .. })
    }
}

/// Personal-best ledger over the persistent store.
pub struct PersonalBests<'a> {
    store: &'a Store,
}

impl<'a> PersonalBests<'a> {
    /// Bind to the persistent store.
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    fn bests(&self) -> HashMap<String, PersonalBest> {
        self.store.read(keys::PERSONAL_BESTS)
    }

    /// Current best for a metric.
    #[must_use]
    pub fn best(&self, metric: &str) -> Option<PersonalBest> {
        self.bests().get(metric).copied()
    }

    /// Compare `value` against the stored best for `metric` and persist it
    /// when it improves. Equal values, zero and negative values never update.
    /// Unknown metrics are ignored.
    pub fn check_and_update(&self, metric: &str, value: f64, date: NaiveDate) -> Option<BestCheck> {
        let definition = trackable_metric(metric)?;
        if value <= 0.0 {
            return Some(BestCheck::NotImproved {
                current_best: self.best(metric).map(|b| b.value),
            });
        }
        let mut bests = self.bests();
        let current = bests.get(metric).copied();
        let improves = match current {
            None => true,
            Some(best) => {
                if definition.higher_is_better {
                    value > best.value
                } else {
                    value < best.value
                }
            }
        };
        if !improves {
            return Some(BestCheck::NotImproved {
                current_best: current.map(|b| b.value),
            });
        }
        let previous = current.map(|b| b.value);
        bests.insert(metric.to_owned(), PersonalBest { value, date, previous });
        self.store.write(keys::PERSONAL_BESTS, &bests);
        debug!(metric, value, "new personal best");
        Some(BestCheck::NewRecord {
            previous_value: previous,
            improvement: previous.map_or(value, |p| (value - p).abs()),
        })
    }
}

/// Build the celebratory advice for a freshly set personal best.
#[must_use]
pub fn personal_best_advice(metric: &str, value: f64, previous: Option<f64>) -> Option<Advice> {
    let definition = trackable_metric(metric)?;
    let text = match previous {
        Some(prev) => format!(
            "New record! {} {value:.0}{} (was {prev:.0}{})",
            definition.name, definition.unit, definition.unit
        ),
        None => format!("First record set: {} {value:.0}{}", definition.name, definition.unit),
    };
    Some(
        Advice::new(
            format!("personal_best_{metric}"),
            text,
            AdviceCategory::Achievement,
            AdviceKind::Achievement,
            3,
        )
        .with_icon(definition.icon)
        .skip_cooldown(),
    )
}

/// Does `day` satisfy every set condition of a combo?
fn day_qualifies(day: &DayRecord, norms: &NutrientNorms, cond: &ComboConditions) -> bool {
    let ratio = |value: f64, norm: f64| value / norm.max(1.0);
    let protein = ratio(day.totals.protein, norms.protein);
    let carbs = ratio(day.totals.carbs, norms.carbs);
    let fat = ratio(day.totals.fat, norms.fat);

    if cond.protein_pct_min.is_some_and(|min| protein < min) {
        return false;
    }
    if cond.fiber_pct_min.is_some_and(|min| ratio(day.totals.fiber, norms.fiber) < min) {
        return false;
    }
    if cond.carbs_pct_min.is_some_and(|min| carbs < min) {
        return false;
    }
    if cond.fat_pct_min.is_some_and(|min| fat < min) {
        return false;
    }
    if cond.all_under.is_some_and(|max| protein > max || carbs > max || fat > max) {
        return false;
    }
    if cond.water_pct_min.is_some_and(|min| ratio(day.water_ml, norms.water_ml) < min) {
        return false;
    }
    if cond.harm_pct_max.is_some_and(|max| ratio(day.totals.harm, norms.harm) > max) {
        return false;
    }
    if cond.trans_pct_max.is_some_and(|max| ratio(day.totals.trans, norms.trans) > max) {
        return false;
    }
    if let Some(before) = cond.breakfast_before_hour {
        let first_meal = day.meals.iter().filter_map(|m| m.hour).min();
        if !first_meal.is_some_and(|h| h < before) {
            return false;
        }
    }
    true
}

/// Combo checker over the persistent store and day history.
pub struct ComboChecker<'a> {
    store: &'a Store,
    history: &'a dyn DayHistory,
    cooldown_days: i64,
}

impl<'a> ComboChecker<'a> {
    /// Bind to the persistent store and history reader.
    pub fn new(store: &'a Store, history: &'a dyn DayHistory, cooldown_days: i64) -> Self {
        Self { store, history, cooldown_days }
    }

    fn awards(&self) -> HashMap<String, NaiveDate> {
        self.store.read(keys::COMBO_AWARDS)
    }

    /// Scan history backward from `today` and return the first combo whose
    /// qualifying-day count reaches its requirement, recording the award so
    /// it is not repeated within the cooldown.
    pub fn check(&self, today: NaiveDate, norms: &NutrientNorms) -> Option<&'static ComboAchievement> {
        let mut awards = self.awards();
        for combo in COMBO_ACHIEVEMENTS {
            if let Some(awarded) = awards.get(combo.id) {
                if today - *awarded < Duration::days(self.cooldown_days) {
                    continue;
                }
            }
            let window = i64::from(combo.days_required) + 2;
            let qualifying = (0..window)
                .filter_map(|offset| self.history.day(today - Duration::days(offset)))
                .filter(|day| day_qualifies(day, norms, &combo.conditions))
                .count();
            if qualifying >= combo.days_required as usize {
                awards.insert(combo.id.to_owned(), today);
                self.store.write(keys::COMBO_AWARDS, &awards);
                debug!(combo = combo.id, "combo achievement earned");
                return Some(combo);
            }
        }
        None
    }
}

/// Build the celebratory advice for an earned combo.
#[must_use]
pub fn combo_advice(combo: &ComboAchievement) -> Advice {
    Advice::new(combo.id, combo.text, AdviceCategory::Achievement, AdviceKind::Achievement, 5)
        .with_icon(combo.icon)
        .skip_cooldown()
}

/// The next milestone above the current streak, with days remaining.
#[must_use]
pub fn next_streak_milestone(streak_days: u32) -> Option<(StreakMilestone, u32)> {
    STREAK_MILESTONES
        .iter()
        .find(|m| m.days > streak_days)
        .map(|m| (*m, m.days - streak_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DayTotals, Meal};
    use crate::storage::MemoryStore;

    fn store() -> Store {
        Store::new(Box::new(MemoryStore::new()))
    }

    fn norms() -> NutrientNorms {
        NutrientNorms {
            kcal: 2000.0,
            protein: 100.0,
            carbs: 200.0,
            simple: 50.0,
            fiber: 30.0,
            fat: 70.0,
            trans: 2.0,
            harm: 10.0,
            water_ml: 2000.0,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn first_positive_value_is_a_record() {
        let store = store();
        let bests = PersonalBests::new(&store);
        let check = bests.check_and_update("streak", 5.0, d(1)).unwrap();
        assert!(matches!(check, BestCheck::NewRecord { previous_value: None, .. }));
    }

    #[test]
    fn equal_value_is_not_a_record() {
        let store = store();
        let bests = PersonalBests::new(&store);
        bests.check_and_update("streak", 5.0, d(1));
        let check = bests.check_and_update("streak", 5.0, d(2)).unwrap();
        assert!(matches!(check, BestCheck::NotImproved { current_best: Some(v) } if (v - 5.0).abs() < f64::EPSILON));
    }

    #[test]
    fn zero_never_updates() {
        let store = store();
        let bests = PersonalBests::new(&store);
        assert!(!bests.check_and_update("streak", 0.0, d(1)).unwrap().is_new_record());
        assert!(bests.best("streak").is_none());
    }

    #[test]
    fn lower_is_better_metrics_invert() {
        let store = store();
        let bests = PersonalBests::new(&store);
        bests.check_and_update("lowHarmDay", 40.0, d(1));
        assert!(bests.check_and_update("lowHarmDay", 30.0, d(2)).unwrap().is_new_record());
        assert!(!bests.check_and_update("lowHarmDay", 35.0, d(3)).unwrap().is_new_record());
    }

    #[test]
    fn improvement_is_reported() {
        let store = store();
        let bests = PersonalBests::new(&store);
        bests.check_and_update("proteinPct", 90.0, d(1));
        let check = bests.check_and_update("proteinPct", 110.0, d(2)).unwrap();
        match check {
            BestCheck::NewRecord { previous_value, improvement } => {
                assert_eq!(previous_value, Some(90.0));
                assert!((improvement - 20.0).abs() < f64::EPSILON);
            }
            BestCheck::NotImproved { .. } => panic!("expected a record"),
        }
    }

    struct FixedHistory(HashMap<NaiveDate, DayRecord>);

    impl DayHistory for FixedHistory {
        fn day(&self, date: NaiveDate) -> Option<DayRecord> {
            self.0.get(&date).cloned()
        }
    }

    fn good_day(date: NaiveDate) -> DayRecord {
        DayRecord {
            date,
            totals: DayTotals { protein: 95.0, fiber: 26.0, harm: 8.0, ..DayTotals::default() },
            meals: vec![Meal { hour: Some(8), ..Meal::default() }],
            ..DayRecord::default()
        }
    }

    #[test]
    fn combo_awarded_after_enough_qualifying_days() {
        let store = store();
        let history = FixedHistory(
            (8..=10).map(|day| (d(day), good_day(d(day)))).collect(),
        );
        let checker = ComboChecker::new(&store, &history, 7);
        // protein >= 0.9 and fiber >= 0.8 for 3 days
        let combo = checker.check(d(10), &norms()).unwrap();
        assert_eq!(combo.id, "protein_fiber_combo");
        // cooldown: not re-awarded the next day
        assert!(checker.check(d(11), &norms()).is_none());
    }

    #[test]
    fn combo_needs_the_full_count() {
        let store = store();
        let history = FixedHistory(
            (9..=10).map(|day| (d(day), good_day(d(day)))).collect(),
        );
        let checker = ComboChecker::new(&store, &history, 7);
        assert!(checker.check(d(10), &norms()).is_none());
    }

    #[test]
    fn milestone_ladder() {
        let (milestone, remaining) = next_streak_milestone(5).unwrap();
        assert_eq!(milestone.days, 7);
        assert_eq!(remaining, 2);
        assert!(next_streak_milestone(30).is_none());
        assert_eq!(next_streak_milestone(0).unwrap().0.days, 3);
    }
}
