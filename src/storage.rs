// ABOUTME: Injected key-value storage contract with persistent and session lifetimes
// ABOUTME: Typed helpers degrade malformed or failed reads to the type's default
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Storage Abstraction
//!
//! The engine never assumes a backing technology: it is handed two
//! [`KeyValueStore`] implementations — one persistent (survives restarts) and
//! one session-scoped (cleared at session boundary) — and speaks JSON strings
//! through them. All reads degrade: a missing key, a failing adapter, or
//! malformed JSON all produce the target type's default. Writes are
//! fire-and-forget; a failed write is logged and dropped, so the next read
//! simply returns the prior or default value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Well-known logical keys, namespacing each persisted concern.
pub mod keys {
    /// Per-advice impression/click stats
    pub const TRACKING: &str = "advice_stats";
    /// Per-advice up/down votes
    pub const RATINGS: &str = "advice_ratings";
    /// Per-advice dismissal counters
    pub const DISMISSALS: &str = "advice_dismissals";
    /// Chain start timestamps
    pub const CHAINS: &str = "advice_chains";
    /// Snoozed advice queue
    pub const SCHEDULED: &str = "scheduled_advices";
    /// Personal records per metric
    pub const PERSONAL_BESTS: &str = "personal_bests";
    /// Last award date per combo achievement
    pub const COMBO_AWARDS: &str = "advice_combo_awards";
    /// User-facing advice settings
    pub const SETTINGS: &str = "advice_settings";
    /// Session display state (session-scoped store)
    pub const SESSION: &str = "advice_session";
}

/// Minimal synchronous key-value contract an embedding application provides.
///
/// Values are opaque JSON strings; the engine owns the schema. Implementations
/// may fail — the engine catches every error at the call site.
pub trait KeyValueStore: Send {
    /// Read the raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Write the raw value for `key`.
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Delete `key` if present.
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Typed view over a [`KeyValueStore`] applying the degradation policy.
pub struct Store {
    inner: Box<dyn KeyValueStore>,
}

impl Store {
    /// Wrap an adapter.
    pub fn new(inner: Box<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Read and deserialize `key`; any failure yields `T::default()`.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read_opt(key).unwrap_or_default()
    }

    /// Read and deserialize `key`; `None` on absence or any failure.
    pub fn read_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.inner.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, "storage read failed: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "malformed persisted state, using default: {e}");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`. Fire-and-forget.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, "failed to serialize state: {e}");
                return;
            }
        };
        if let Err(e) = self.inner.set(key, &raw) {
            warn!(key, "storage write failed, dropping: {e}");
        }
    }

    /// Remove `key`. Fire-and-forget.
    pub fn delete(&self, key: &str) {
        if let Err(e) = self.inner.remove(key) {
            warn!(key, "storage remove failed: {e}");
        }
    }
}

/// In-memory [`KeyValueStore`] used as the session-store default and in tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock only means a panicking test; the data is still usable.
        self.map.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
