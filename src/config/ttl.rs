// ABOUTME: Dynamic TTL configuration for advice display duration
// ABOUTME: Reading-speed based clamp with a bonus for critical advice
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic display-duration (TTL) configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the dynamic TTL pass: `clamp(len * ms_per_char, min, max)`
/// plus `critical_bonus_ms` for critical or cooldown-skipping advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlConfig {
    /// Lower clamp bound in milliseconds
    pub min_ms: u32,
    /// Upper clamp bound in milliseconds
    pub max_ms: u32,
    /// Milliseconds per character (~20 chars/s reading speed at 50)
    pub ms_per_char: u32,
    /// Extra time for critical advice
    pub critical_bonus_ms: u32,
    /// Legacy fixed TTL; advices carrying exactly this value are treated as
    /// "unset" and still receive a dynamic TTL
    pub legacy_default_ms: u32,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            min_ms: 4_000,
            max_ms: 12_000,
            ms_per_char: 50,
            critical_bonus_ms: 2_000,
            legacy_default_ms: 5_000,
        }
    }
}
