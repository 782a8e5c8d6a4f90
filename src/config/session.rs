// ABOUTME: Session gate and output-shaping limits
// ABOUTME: Per-session display cap, inter-advice cooldown, per-category cap
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session and output limits.

use serde::{Deserialize, Serialize};

/// Limits enforced by the session gate and the category cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum advices displayed within one session
    pub max_per_session: u32,
    /// Minimum milliseconds between two displayed advices
    pub cooldown_ms: u64,
    /// Maximum surviving advices per category in one generation pass
    pub max_per_category: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_per_session: 10,
            cooldown_ms: 45_000,
            max_per_category: 2,
        }
    }
}
