// ABOUTME: Engagement feedback persistence: impressions, clicks, ratings, dismissals
// ABOUTME: Retention pruning keeps the maps bounded; quick dismissals feed the score penalty
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Feedback Store
//!
//! Persists the learned signals the ranker blends into the smart score:
//! per-advice impression/click counters (CTR), thumbs up/down ratings, and
//! dismissal counters with a "quick dismiss" classification for advices the
//! user swats away within the threshold. Maps are pruned on write: tracking
//! stats disappear after 30 days without an impression, ratings after 60 days
//! without a vote.

use crate::config::FeedbackConfig;
use crate::storage::{keys, Store};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Impression/click counters for one advice id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingStat {
    /// Times displayed
    pub shown: u32,
    /// Times expanded/clicked
    pub clicked: u32,
    /// Last impression timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown: Option<DateTime<Utc>>,
}

impl TrackingStat {
    /// Click-through rate; zero until anything was shown.
    #[must_use]
    pub fn ctr(&self) -> f64 {
        if self.shown == 0 {
            0.0
        } else {
            f64::from(self.clicked) / f64::from(self.shown)
        }
    }
}

/// Up/down votes for one advice id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Thumbs up
    pub positive: u32,
    /// Thumbs down
    pub negative: u32,
    /// Last vote timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rated: Option<DateTime<Utc>>,
}

impl Rating {
    /// Total votes cast.
    #[must_use]
    pub const fn votes(&self) -> u32 {
        self.positive + self.negative
    }

    /// Normalized score in [-1, 1]; zero with no votes.
    #[must_use]
    pub fn score(&self) -> f64 {
        let votes = self.votes();
        if votes == 0 {
            0.0
        } else {
            (f64::from(self.positive) - f64::from(self.negative)) / f64::from(votes)
        }
    }
}

/// Dismissal counters for one advice id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DismissStat {
    /// All dismissals
    pub total: u32,
    /// Dismissals faster than the quick threshold
    pub quick: u32,
    /// Last dismissal timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dismissed: Option<DateTime<Utc>>,
}

impl DismissStat {
    /// Priority divisor applied before scoring. Repeated quick dismissals
    /// push the advice down hard: ≥3 ⇒ 0.3, ≥2 ⇒ 0.5, ≥1 ⇒ 0.7.
    #[must_use]
    pub const fn penalty_factor(&self) -> f64 {
        match self.quick {
            0 => 1.0,
            1 => 0.7,
            2 => 0.5,
            _ => 0.3,
        }
    }
}

/// View over the persistent store for all feedback concerns.
pub struct FeedbackStore<'a> {
    store: &'a Store,
    config: &'a FeedbackConfig,
}

impl<'a> FeedbackStore<'a> {
    /// Bind to the persistent store.
    pub fn new(store: &'a Store, config: &'a FeedbackConfig) -> Self {
        Self { store, config }
    }

    /// All tracking stats keyed by advice id.
    #[must_use]
    pub fn tracking(&self) -> HashMap<String, TrackingStat> {
        self.store.read(keys::TRACKING)
    }

    /// All ratings keyed by advice id.
    #[must_use]
    pub fn ratings(&self) -> HashMap<String, Rating> {
        self.store.read(keys::RATINGS)
    }

    /// All dismissal stats keyed by advice id.
    #[must_use]
    pub fn dismissals(&self) -> HashMap<String, DismissStat> {
        self.store.read(keys::DISMISSALS)
    }

    /// Record an impression.
    pub fn track_shown(&self, advice_id: &str, now: DateTime<Utc>) {
        let mut stats = self.tracking();
        let entry = stats.entry(advice_id.to_owned()).or_default();
        entry.shown += 1;
        entry.last_shown = Some(now);
        prune_by(&mut stats, now, self.config.tracking_retention_days, |s| s.last_shown);
        self.store.write(keys::TRACKING, &stats);
    }

    /// Record a click/expansion.
    pub fn track_click(&self, advice_id: &str, now: DateTime<Utc>) {
        let mut stats = self.tracking();
        let entry = stats.entry(advice_id.to_owned()).or_default();
        entry.clicked += 1;
        if entry.last_shown.is_none() {
            entry.last_shown = Some(now);
        }
        self.store.write(keys::TRACKING, &stats);
    }

    /// Record a vote.
    pub fn rate(&self, advice_id: &str, positive: bool, now: DateTime<Utc>) {
        let mut ratings = self.ratings();
        let entry = ratings.entry(advice_id.to_owned()).or_default();
        if positive {
            entry.positive += 1;
        } else {
            entry.negative += 1;
        }
        entry.last_rated = Some(now);
        prune_by(&mut ratings, now, self.config.rating_retention_days, |r| r.last_rated);
        self.store.write(keys::RATINGS, &ratings);
    }

    /// Record a dismissal; `visible_ms` is how long the advice was on screen.
    pub fn track_dismiss(&self, advice_id: &str, visible_ms: u64, now: DateTime<Utc>) {
        let mut dismissals = self.dismissals();
        let entry = dismissals.entry(advice_id.to_owned()).or_default();
        entry.total += 1;
        if visible_ms < self.config.quick_dismiss_threshold_ms {
            entry.quick += 1;
        }
        entry.last_dismissed = Some(now);
        self.store.write(keys::DISMISSALS, &dismissals);
    }
}

/// Drop entries whose last-activity timestamp is older than `retention_days`.
/// Entries with no timestamp at all are kept (they were never surfaced).
fn prune_by<T>(
    map: &mut HashMap<String, T>,
    now: DateTime<Utc>,
    retention_days: i64,
    last_activity: impl Fn(&T) -> Option<DateTime<Utc>>,
) {
    let cutoff = now - Duration::days(retention_days);
    map.retain(|_, entry| last_activity(entry).is_none_or(|ts| ts >= cutoff));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn setup() -> (Store, FeedbackConfig) {
        (Store::new(Box::new(MemoryStore::new())), FeedbackConfig::default())
    }

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn impressions_and_ctr() {
        let (store, config) = setup();
        let feedback = FeedbackStore::new(&store, &config);
        for _ in 0..4 {
            feedback.track_shown("water_reminder", t(1));
        }
        feedback.track_click("water_reminder", t(1));
        let stats = feedback.tracking();
        let stat = &stats["water_reminder"];
        assert_eq!(stat.shown, 4);
        assert_eq!(stat.clicked, 1);
        assert!((stat.ctr() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_tracking_is_pruned() {
        let (store, config) = setup();
        let feedback = FeedbackStore::new(&store, &config);
        feedback.track_shown("old_advice", t(1));
        // 40 days later a fresh impression on another id triggers the prune
        let later = t(1) + Duration::days(40);
        feedback.track_shown("new_advice", later);
        let stats = feedback.tracking();
        assert!(!stats.contains_key("old_advice"));
        assert!(stats.contains_key("new_advice"));
    }

    #[test]
    fn rating_score_range() {
        let (store, config) = setup();
        let feedback = FeedbackStore::new(&store, &config);
        feedback.rate("fiber_low", true, t(1));
        feedback.rate("fiber_low", true, t(1));
        feedback.rate("fiber_low", false, t(2));
        let ratings = feedback.ratings();
        let rating = &ratings["fiber_low"];
        assert_eq!(rating.votes(), 3);
        assert!((rating.score() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn quick_dismiss_classification_and_penalty() {
        let (store, config) = setup();
        let feedback = FeedbackStore::new(&store, &config);
        feedback.track_dismiss("nag", 500, t(1));
        feedback.track_dismiss("nag", 3000, t(1));
        feedback.track_dismiss("nag", 900, t(2));
        let dismissals = feedback.dismissals();
        let stat = &dismissals["nag"];
        assert_eq!(stat.total, 3);
        assert_eq!(stat.quick, 2);
        assert!((stat.penalty_factor() - 0.5).abs() < f64::EPSILON);
        assert!((DismissStat { quick: 3, ..DismissStat::default() }.penalty_factor() - 0.3).abs() < f64::EPSILON);
        assert!((DismissStat::default().penalty_factor() - 1.0).abs() < f64::EPSILON);
    }
}
