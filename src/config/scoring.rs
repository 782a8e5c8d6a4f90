// ABOUTME: Scoring weight configuration for the smart-score ranker
// ABOUTME: Defaults carry the tuned production constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Smart-score weights and activation thresholds.

use serde::{Deserialize, Serialize};

/// Weights and thresholds for [`crate::scoring::smart_score`].
///
/// The CTR weight is applied to both the click-through term and the rating
/// term. The coupling is intentional-as-shipped: the ranking was tuned with
/// the shared constant, so the two terms move together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the CTR and rating terms
    pub ctr_weight: f64,
    /// Weight of the recency (time-since-last-shown) term
    pub recency_weight: f64,
    /// Weight of the contextual-relevance term
    pub relevance_weight: f64,
    /// Impressions required before CTR participates in the score
    pub min_shown_for_ctr: u32,
    /// Votes (positive + negative) required before ratings participate
    pub min_votes_for_rating: u32,
    /// Flat boost for crash-prevention advice under high crash risk
    pub crash_high_boost: f64,
    /// Flat boost for stress-related advice under medium crash risk
    pub crash_medium_boost: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ctr_weight: 0.4,
            recency_weight: 0.3,
            relevance_weight: 0.3,
            min_shown_for_ctr: 3,
            min_votes_for_rating: 2,
            crash_high_boost: 30.0,
            crash_medium_boost: 15.0,
        }
    }
}
