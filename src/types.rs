// ABOUTME: Core data model shared across the pipeline
// ABOUTME: Advice candidates, categories, kinds, animation hints, crash-risk signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Core Types
//!
//! An [`Advice`] is one candidate recommendation flowing through the pipeline:
//! generated by a rule module, personalized, scored, filtered, and finally
//! gated by the session limiter. Ids are unique per generation pass and act as
//! the key for every feedback store (tracking stats, ratings, dismissals).

use serde::{Deserialize, Serialize};

/// Advice text: either a single string or a set of variants resolved
/// deterministically by the personalizer (same variant all day, rotating
/// day to day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdviceText {
    /// Fixed text
    Single(String),
    /// Variant pool; one is picked per (date, advice id)
    Variants(Vec<String>),
}

impl AdviceText {
    /// Length in characters of the longest variant, used for dynamic TTL.
    #[must_use]
    pub fn max_len(&self) -> usize {
        match self {
            Self::Single(s) => s.chars().count(),
            Self::Variants(v) => v.iter().map(|s| s.chars().count()).max().unwrap_or(0),
        }
    }
}

impl From<&str> for AdviceText {
    fn from(s: &str) -> Self {
        Self::Single(s.to_owned())
    }
}

impl From<String> for AdviceText {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for AdviceText {
    fn from(v: Vec<String>) -> Self {
        Self::Variants(v)
    }
}

/// Advice category, used for settings toggles, dedup grouping and the
/// per-category output cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceCategory {
    /// Macros, calories, nutrient balance
    Nutrition,
    /// Water intake
    Hydration,
    /// Habits, routine, seasonal
    Lifestyle,
    /// Workouts and recovery
    Training,
    /// Sleep quantity and quality
    Sleep,
    /// Mood and stress
    Emotional,
    /// Streaks, records, combos
    Achievement,
    /// Meal timing windows
    Timing,
    /// Cross-signal correlations (sleep vs hunger etc.)
    Correlation,
    /// Health reminders (vitamins, medication); cannot be disabled
    Health,
    /// Anything else
    Other,
}

impl AdviceCategory {
    /// Reminder categories bypass the user's category toggles.
    #[must_use]
    pub const fn is_reminder(self) -> bool {
        matches!(self, Self::Health)
    }

    /// Stable lowercase key, matching the persisted settings map.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nutrition => "nutrition",
            Self::Hydration => "hydration",
            Self::Lifestyle => "lifestyle",
            Self::Training => "training",
            Self::Sleep => "sleep",
            Self::Emotional => "emotional",
            Self::Achievement => "achievement",
            Self::Timing => "timing",
            Self::Correlation => "correlation",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

/// Advice kind, driving tone, animation hints and the critical TTL bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    /// Neutral suggestion
    Tip,
    /// Something is off and worth attention
    Warning,
    /// Requires immediate attention; gets the TTL bonus
    Critical,
    /// Record or milestone reached
    Achievement,
    /// Positive reinforcement
    Success,
    /// Streak-related gamification
    Streak,
}

impl AdviceKind {
    /// Warning-flavored kinds are suppressed for stressed/crashed users.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }
}

/// Micro-animation hint for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Animation {
    /// Achievements
    Bounce,
    /// Warnings
    Shake,
    /// Plain tips
    FadeSlide,
    /// Successes
    Pulse,
    /// Streaks
    Glow,
}

impl Animation {
    /// Default animation for a kind.
    #[must_use]
    pub const fn for_kind(kind: AdviceKind) -> Self {
        match kind {
            AdviceKind::Achievement => Self::Bounce,
            AdviceKind::Warning | AdviceKind::Critical => Self::Shake,
            AdviceKind::Tip => Self::FadeSlide,
            AdviceKind::Success => Self::Pulse,
            AdviceKind::Streak => Self::Glow,
        }
    }
}

/// One candidate recommendation with its scheduling and ranking metadata.
///
/// `priority` is inverted: lower means more important (1 is critical, 90 is
/// background gamification). `ttl_ms` of `None` means "engine decides" and the
/// dynamic TTL pass fills it in from the text length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Unique id within one generation pass; feedback-store key
    pub id: String,
    /// Text or variant pool
    pub text: AdviceText,
    /// Optional emoji/icon hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Category for settings/dedup/cap purposes
    pub category: AdviceCategory,
    /// Kind for tone/animation/TTL purposes
    pub kind: AdviceKind,
    /// Display priority; lower is more important
    pub priority: i32,
    /// Display duration in milliseconds; `None` = dynamic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u32>,
    /// Event names on which this advice may fire
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Ids this advice suppresses when it survives the cascade first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Bypass the inter-advice cooldown (urgent advice)
    #[serde(default)]
    pub can_skip_cooldown: bool,
    /// Rendering animation hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Set on delivery of a snoozed advice
    #[serde(default)]
    pub scheduled: bool,
}

impl Advice {
    /// Build an advice with the usual defaults (tab-open trigger, animation
    /// derived from the kind).
    pub fn new(
        id: impl Into<String>,
        text: impl Into<AdviceText>,
        category: AdviceCategory,
        kind: AdviceKind,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            icon: None,
            category,
            kind,
            priority,
            ttl_ms: None,
            triggers: vec!["tab_open".to_owned()],
            excludes: Vec::new(),
            can_skip_cooldown: false,
            animation: Some(Animation::for_kind(kind)),
            scheduled: false,
        }
    }

    /// Set the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_owned());
        self
    }

    /// Replace the trigger list.
    #[must_use]
    pub fn with_triggers(mut self, triggers: &[&str]) -> Self {
        self.triggers = triggers.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    /// Declare ids this advice makes redundant.
    #[must_use]
    pub fn with_excludes(mut self, excludes: &[&str]) -> Self {
        self.excludes = excludes.iter().map(|e| (*e).to_owned()).collect();
        self
    }

    /// Mark as cooldown-skipping (urgent).
    #[must_use]
    pub const fn skip_cooldown(mut self) -> Self {
        self.can_skip_cooldown = true;
        self
    }

    /// Does this advice fire on the given trigger event?
    #[must_use]
    pub fn fires_on(&self, trigger: &str) -> bool {
        self.triggers.iter().any(|t| t == trigger)
    }
}

/// Crash-risk level reported by the external risk signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Business as usual
    Low,
    /// Elevated; stress-related advice is boosted
    Medium,
    /// Imminent; crash-prevention advice is boosted hard
    High,
}

/// Externally computed likelihood of a nutritional/behavioral lapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashRisk {
    /// Risk level
    pub level: RiskLevel,
    /// Human-readable contributing factors
    #[serde(default)]
    pub factors: Vec<String>,
}
