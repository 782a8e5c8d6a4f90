// ABOUTME: Per-session display cap and inter-advice cooldown gate
// ABOUTME: State lives in the session-scoped store and resets on explicit call
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Session / Cooldown Gate
//!
//! The last stage before display: a per-session cap on the number of advices,
//! a cooldown between consecutive advices (skippable by urgent advice), and a
//! no-repeat rule per id. State lives in the session-scoped store so closing
//! the app clears it; the UI additionally calls [`SessionGate::reset`] on day
//! rollover.

use crate::config::SessionConfig;
use crate::storage::{keys, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display state for the current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Ids already displayed this session
    #[serde(default)]
    pub shown: Vec<String>,
    /// Number of advices displayed this session
    #[serde(default)]
    pub count: u32,
    /// Timestamp of the most recent display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown: Option<DateTime<Utc>>,
}

/// Gate over the session-scoped store.
pub struct SessionGate<'a> {
    store: &'a Store,
    config: &'a SessionConfig,
}

impl<'a> SessionGate<'a> {
    /// Bind to the session store.
    pub fn new(store: &'a Store, config: &'a SessionConfig) -> Self {
        Self { store, config }
    }

    /// Current session state (default when nothing stored yet).
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.store.read(keys::SESSION)
    }

    /// May `advice_id` be displayed now?
    #[must_use]
    pub fn can_show(&self, advice_id: &str, can_skip_cooldown: bool, now: DateTime<Utc>) -> bool {
        let state = self.state();
        if state.count >= self.config.max_per_session {
            return false;
        }
        if !can_skip_cooldown {
            if let Some(last_shown) = state.last_shown {
                let elapsed_ms = (now - last_shown).num_milliseconds();
                if elapsed_ms >= 0 && (elapsed_ms as u64) < self.config.cooldown_ms {
                    return false;
                }
            }
        }
        !state.shown.iter().any(|id| id == advice_id)
    }

    /// Record a display. The count saturates at the session cap.
    pub fn mark_shown(&self, advice_id: &str, now: DateTime<Utc>) {
        let mut state = self.state();
        if !state.shown.iter().any(|id| id == advice_id) {
            state.shown.push(advice_id.to_owned());
        }
        state.count = (state.count + 1).min(self.config.max_per_session);
        state.last_shown = Some(now);
        self.store.write(keys::SESSION, &state);
    }

    /// Clear session state (day rollover, explicit reset).
    pub fn reset(&self) {
        self.store.delete(keys::SESSION);
    }
}
