// ABOUTME: Fingerprinted result cache for one generation pass
// ABOUTME: Returns the same Arc while the context fingerprint and TTL hold
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Result Cache
//!
//! A generation pass is pure given its context, so two calls with an
//! identical context fingerprint inside the TTL window must yield the *same*
//! allocation, not just an equal list. The engine hands out
//! `Arc<Vec<Advice>>` precisely so callers can use pointer identity to skip
//! re-rendering. Any write path (feedback, settings, scheduling) invalidates
//! explicitly.

use crate::context::AdviceContext;
use crate::types::Advice;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Everything the result depends on, flattened into a `|`-joined string.
/// Ratios are rendered with fixed precision so float noise below a permille
/// does not bust the cache.
#[must_use]
pub fn fingerprint(ctx: &AdviceContext) -> String {
    let t = ctx.day.totals;
    let n = ctx.norms;
    format!(
        "{}|{}|{}|{:.3}|{}|{}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}|{:.1}",
        ctx.day.date.format("%Y-%m-%d"),
        ctx.hour,
        ctx.meal_count,
        ctx.kcal_pct,
        ctx.goal.kind.as_str(),
        ctx.is_refeed_day,
        t.kcal,
        t.protein,
        t.carbs,
        t.fat,
        t.simple,
        t.fiber,
        t.harm,
        n.kcal,
        n.protein,
        n.carbs,
        n.fat,
        n.simple,
        n.fiber,
        n.harm,
    )
}

struct CacheEntry {
    fingerprint: String,
    result: Arc<Vec<Advice>>,
    stored_at: DateTime<Utc>,
}

/// Single-slot cache of the last generation result.
#[derive(Default)]
pub struct ResultCache {
    entry: Option<CacheEntry>,
}

impl ResultCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached result, if the fingerprint matches and the entry is still
    /// inside the TTL window.
    #[must_use]
    pub fn get(&self, fingerprint: &str, now: DateTime<Utc>, ttl_ms: u64) -> Option<Arc<Vec<Advice>>> {
        let entry = self.entry.as_ref()?;
        if entry.fingerprint != fingerprint {
            return None;
        }
        let age = now - entry.stored_at;
        if age.num_milliseconds() < 0 || age.num_milliseconds() as u64 >= ttl_ms {
            debug!("result cache entry expired");
            return None;
        }
        Some(Arc::clone(&entry.result))
    }

    /// Store a result, replacing whatever was cached.
    pub fn put(&mut self, fingerprint: String, result: Arc<Vec<Advice>>, now: DateTime<Utc>) {
        self.entry = Some(CacheEntry { fingerprint, result, stored_at: now });
    }

    /// Drop the cached entry. Called on every state write that can change
    /// the next result (feedback, settings, scheduling, session resets).
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("result cache invalidated");
        }
    }
}
