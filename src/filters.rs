// ABOUTME: Filter cascade applied to the score-sorted candidate list
// ABOUTME: Settings, emotional and trigger pre-filters, then time, dedup, excludes, category cap
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Filter Cascade
//!
//! The candidate list is whittled down in a fixed order. Ahead of the strict
//! cascade come the contextual pre-filters (category settings, emotional
//! state, trigger match) and the goal-prefix priority boost; after scoring,
//! the cascade proper runs: time restriction → dedup-by-group → mutual
//! exclusion → per-category cap. Order matters: an advice dropped by an
//! earlier stage never consumes a dedup slot or poisons the exclude set.

use crate::catalog::{time_window_for, DEDUP_GROUPS};
use crate::context::{EmotionalState, GoalMode};
use crate::personalize::tone_for_mood;
use crate::settings::AdviceSettings;
use crate::types::Advice;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Drop advices whose category the user disabled. Reminder categories always
/// pass.
pub fn filter_by_settings(advices: &mut Vec<Advice>, settings: &AdviceSettings) {
    advices.retain(|a| settings.category_enabled(a.category));
}

/// Drop warning-kind advices for users who are stressed or crashed; piling
/// criticism on a bad day costs trust. Low mood triggers the same softening.
pub fn filter_by_emotional_state(
    advices: &mut Vec<Advice>,
    state: EmotionalState,
    avg_mood: Option<f64>,
) {
    let soften = matches!(state, EmotionalState::Stressed | EmotionalState::Crashed)
        || tone_for_mood(avg_mood).is_some_and(|t| t.avoid_warnings);
    if soften {
        advices.retain(|a| !a.kind.is_warning() || a.can_skip_cooldown);
    }
}

/// Keep only advices that fire on the current trigger. An empty trigger list
/// means "fire on anything".
pub fn filter_by_trigger(advices: &mut Vec<Advice>, trigger: &str) {
    advices.retain(|a| a.triggers.is_empty() || a.fires_on(trigger));
}

/// Boost advices that target the active goal mode: ids carrying the mode
/// prefix gain ten priority points (lower number = more important).
pub fn apply_goal_boost(advices: &mut [Advice], goal: &GoalMode) {
    let prefix = format!("{}_", goal.kind.as_str());
    for advice in advices.iter_mut() {
        if advice.id.starts_with(&prefix) {
            advice.priority = (advice.priority - 10).max(1);
        }
    }
}

/// Stage 1: drop advices whose configured time window rejects the hour.
pub fn apply_time_restrictions(advices: &mut Vec<Advice>, hour: u32) {
    advices.retain(|a| {
        let allowed = time_window_for(&a.id).is_none_or(|w| w.allows(hour));
        if !allowed {
            trace!(id = %a.id, hour, "dropped by time restriction");
        }
        allowed
    });
}

/// Stage 2: at most one survivor per named dedup group. The list arrives
/// score-sorted, so the first member seen is the highest-scored one. An
/// advice belonging to several groups claims all of them.
pub fn dedup_by_group(advices: &mut Vec<Advice>) {
    let membership: HashMap<&str, Vec<&str>> = {
        let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
        for (group, members) in DEDUP_GROUPS {
            for id in *members {
                map.entry(id).or_default().push(group);
            }
        }
        map
    };
    let mut taken: HashSet<&str> = HashSet::new();
    advices.retain(|a| {
        let Some(groups) = membership.get(a.id.as_str()) else {
            return true;
        };
        if groups.iter().any(|g| taken.contains(g)) {
            trace!(id = %a.id, "dropped by dedup group");
            return false;
        }
        taken.extend(groups.iter().copied());
        true
    });
}

/// Stage 3: mutual exclusion. Iterating in scored order, an advice is dropped
/// when its id is already in the accumulated exclude set; a kept advice adds
/// its own `excludes` list. The earlier (higher-scored) advice always wins.
pub fn apply_excludes(advices: &mut Vec<Advice>) {
    let mut excluded: HashSet<String> = HashSet::new();
    advices.retain(|a| {
        if excluded.contains(&a.id) {
            trace!(id = %a.id, "dropped by exclusion");
            return false;
        }
        excluded.extend(a.excludes.iter().cloned());
        true
    });
}

/// Stage 4: keep at most `max` advices per category, in scored order.
pub fn cap_per_category(advices: &mut Vec<Advice>, max: usize) {
    let mut counts: HashMap<crate::types::AdviceCategory, usize> = HashMap::new();
    advices.retain(|a| {
        let count = counts.entry(a.category).or_insert(0);
        if *count >= max {
            trace!(id = %a.id, "dropped by category cap");
            return false;
        }
        *count += 1;
        true
    });
}
