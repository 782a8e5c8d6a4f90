// ABOUTME: Chain follow-up state machine and the snoozed-advice queue
// ABOUTME: Pull-based: readiness is computed on each call, never by an internal timer
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Chain & Scheduler State Machines
//!
//! **Chains** link a head advice to a follow-up that becomes eligible once a
//! configured delay has passed since the head was shown (protein_low →
//! protein_sources after 30 minutes). The state per chain is a single start
//! timestamp; consuming the continuation removes it, so the follow-up fires
//! exactly once.
//!
//! **The scheduler** holds advice the user snoozed. Each call partitions the
//! queue into ready and remaining entries; the queue is only rewritten when
//! something is actually ready, so redundant render-loop calls cost nothing.

use crate::catalog::{chain_link_for, CHAIN_LINKS};
use crate::storage::{keys, Store};
use crate::types::Advice;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Priority assigned to a delivered snoozed advice; the user explicitly asked
/// for it, so it ranks near the top.
pub const SCHEDULED_PRIORITY: i32 = 5;

/// Triggers forced onto delivered snoozed advice so it fires on any event.
const SCHEDULED_TRIGGERS: &[&str] = &["scheduled", "tab_open", "product_added"];

/// One snoozed advice awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// The advice to re-deliver
    pub advice: Advice,
    /// Earliest delivery time
    pub show_at: DateTime<Utc>,
}

/// Chain follow-up tracker over the persistent store.
pub struct ChainTracker<'a> {
    store: &'a Store,
}

impl<'a> ChainTracker<'a> {
    /// Bind to the persistent store.
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    fn starts(&self) -> HashMap<String, DateTime<Utc>> {
        self.store.read(keys::CHAINS)
    }

    /// Record that a chain head advice was shown. No-op for advices without
    /// a configured follow-up.
    pub fn mark_chain_start(&self, advice_id: &str, now: DateTime<Utc>) {
        if chain_link_for(advice_id).is_none() {
            return;
        }
        let mut starts = self.starts();
        starts.insert(advice_id.to_owned(), now);
        self.store.write(keys::CHAINS, &starts);
    }

    /// Check one chain: `None` while idle or not yet ready; the follow-up id
    /// exactly once when the delay has elapsed (the start mark is consumed).
    pub fn check_chain_continuation(
        &self,
        advice_id: &str,
        now: DateTime<Utc>,
    ) -> Option<&'static str> {
        let link = chain_link_for(advice_id)?;
        let mut starts = self.starts();
        let started_at = *starts.get(advice_id)?;
        if now - started_at < Duration::minutes(link.delay_minutes) {
            return None;
        }
        starts.remove(advice_id);
        self.store.write(keys::CHAINS, &starts);
        debug!(head = advice_id, next = link.next, "chain continuation ready");
        Some(link.next)
    }

    /// All follow-up ids ready right now, consuming their start marks.
    #[must_use]
    pub fn ready_continuations(&self, now: DateTime<Utc>) -> Vec<&'static str> {
        CHAIN_LINKS
            .iter()
            .filter_map(|(head, _)| self.check_chain_continuation(head, now))
            .collect()
    }
}

/// Snooze queue over the persistent store.
pub struct Scheduler<'a> {
    store: &'a Store,
}

impl<'a> Scheduler<'a> {
    /// Bind to the persistent store.
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    fn queue(&self) -> Vec<ScheduledEntry> {
        self.store.read(keys::SCHEDULED)
    }

    /// Defer an advice by `minutes`.
    pub fn schedule(&self, advice: Advice, minutes: i64, now: DateTime<Utc>) {
        let mut queue = self.queue();
        queue.push(ScheduledEntry {
            advice,
            show_at: now + Duration::minutes(minutes),
        });
        self.store.write(keys::SCHEDULED, &queue);
    }

    /// Number of entries still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Deliver everything due: ready entries are removed from the queue and
    /// rewritten for delivery (suffixed id, top priority, fire-on-anything
    /// triggers, clock icon on the text). The queue is not touched when
    /// nothing is due.
    #[must_use]
    pub fn take_ready(&self, now: DateTime<Utc>) -> Vec<Advice> {
        let queue = self.queue();
        if !queue.iter().any(|e| e.show_at <= now) {
            return Vec::new();
        }
        let (ready, remaining): (Vec<_>, Vec<_>) =
            queue.into_iter().partition(|e| e.show_at <= now);
        self.store.write(keys::SCHEDULED, &remaining);
        debug!(count = ready.len(), "delivering snoozed advices");
        ready.into_iter().map(|e| deliver(e.advice)).collect()
    }
}

fn deliver(mut advice: Advice) -> Advice {
    advice.id = format!("{}_scheduled", advice.id);
    advice.priority = SCHEDULED_PRIORITY;
    advice.triggers = SCHEDULED_TRIGGERS.iter().map(|t| (*t).to_owned()).collect();
    advice.scheduled = true;
    advice.text = match advice.text {
        crate::types::AdviceText::Single(s) => {
            crate::types::AdviceText::Single(format!("\u{23f0} {s}"))
        }
        crate::types::AdviceText::Variants(v) => crate::types::AdviceText::Variants(
            v.into_iter().map(|s| format!("\u{23f0} {s}")).collect(),
        ),
    };
    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{AdviceCategory, AdviceKind, AdviceText};
    use chrono::TimeZone;

    fn store() -> Store {
        Store::new(Box::new(MemoryStore::new()))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn chain_fires_exactly_once_after_delay() {
        let store = store();
        let chains = ChainTracker::new(&store);
        chains.mark_chain_start("protein_low", t0());

        // 29 minutes: still waiting (configured delay is 30)
        assert_eq!(chains.check_chain_continuation("protein_low", t0() + Duration::minutes(29)), None);
        // 31 minutes: ready, delivered once
        assert_eq!(
            chains.check_chain_continuation("protein_low", t0() + Duration::minutes(31)),
            Some("protein_sources")
        );
        // immediately again: consumed
        assert_eq!(chains.check_chain_continuation("protein_low", t0() + Duration::minutes(31)), None);
    }

    #[test]
    fn idle_chain_returns_none() {
        let store = store();
        let chains = ChainTracker::new(&store);
        assert_eq!(chains.check_chain_continuation("protein_low", t0()), None);
    }

    #[test]
    fn unconfigured_head_is_ignored() {
        let store = store();
        let chains = ChainTracker::new(&store);
        chains.mark_chain_start("not_a_chain_head", t0());
        assert!(chains.ready_continuations(t0() + Duration::hours(5)).is_empty());
    }

    #[test]
    fn ready_continuations_collects_due_chains() {
        let store = store();
        let chains = ChainTracker::new(&store);
        chains.mark_chain_start("protein_low", t0());
        chains.mark_chain_start("sleep_low", t0());
        // 40 minutes: protein chain (30m) due, sleep chain (120m) not
        let ready = chains.ready_continuations(t0() + Duration::minutes(40));
        assert_eq!(ready, vec!["protein_sources"]);
    }

    fn sample_advice() -> Advice {
        Advice::new("water_reminder", "Drink some water", AdviceCategory::Hydration, AdviceKind::Tip, 30)
    }

    #[test]
    fn scheduler_delivers_after_delay() {
        let store = store();
        let scheduler = Scheduler::new(&store);
        scheduler.schedule(sample_advice(), 10, t0());

        assert!(scheduler.take_ready(t0() + Duration::minutes(5)).is_empty());
        assert_eq!(scheduler.pending(), 1, "queue untouched while nothing is due");

        let delivered = scheduler.take_ready(t0() + Duration::minutes(11));
        assert_eq!(delivered.len(), 1);
        let advice = &delivered[0];
        assert_eq!(advice.id, "water_reminder_scheduled");
        assert_eq!(advice.priority, SCHEDULED_PRIORITY);
        assert!(advice.scheduled);
        assert!(advice.fires_on("product_added"));
        match &advice.text {
            AdviceText::Single(s) => assert!(s.starts_with('\u{23f0}')),
            AdviceText::Variants(_) => panic!("expected single text"),
        }
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn only_due_entries_are_delivered() {
        let store = store();
        let scheduler = Scheduler::new(&store);
        scheduler.schedule(sample_advice(), 10, t0());
        let mut other = sample_advice();
        other.id = "fiber_low".to_owned();
        scheduler.schedule(other, 120, t0());

        let delivered = scheduler.take_ready(t0() + Duration::minutes(30));
        assert_eq!(delivered.len(), 1);
        assert_eq!(scheduler.pending(), 1);
    }
}
