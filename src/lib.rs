// ABOUTME: Contextual advice engine for a personal nutrition and activity tracker
// ABOUTME: Crate root: module layout and the public re-export surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Advice Engine
//!
//! A contextual recommendation engine for a nutrition/activity tracker.
//! Rule modules turn the tracked day into candidate advices; a smart score
//! blends static priority with learned engagement signals; a filter cascade
//! and a session gate decide what actually reaches the screen. Feedback
//! (impressions, clicks, ratings, dismissals) loops back into the ranking.
//!
//! The engine is synchronous and storage-agnostic: the host injects two
//! [`storage::KeyValueStore`] implementations (persistent and
//! session-scoped) plus the [`helpers::Helpers`] collaborator bundle, and
//! drives everything through [`engine::AdviceEngine`].
//!
//! ```no_run
//! use advice_engine::config::AdviceConfig;
//! use advice_engine::engine::{AdviceEngine, GenerateRequest};
//! use advice_engine::helpers::Helpers;
//!
//! let engine = AdviceEngine::in_memory(Helpers::null(), AdviceConfig::default());
//! # let request: GenerateRequest = todo!();
//! let advices = engine.generate_advices(request);
//! for advice in advices.iter() {
//!     if engine.can_show(advice, chrono::Utc::now()) {
//!         // render, then: engine.mark_shown(advice, chrono::Utc::now());
//!     }
//! }
//! ```

#![deny(unsafe_code)]

pub mod achievements;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod feedback;
pub mod filters;
pub mod helpers;
pub mod insights;
pub mod personalize;
pub mod rules;
pub mod scheduling;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod storage;
pub mod types;

pub use config::AdviceConfig;
pub use context::{AdviceContext, DayRecord, NutrientNorms, UserProfile};
pub use engine::{AdviceEngine, GenerateRequest};
pub use errors::{AdviceError, Result};
pub use helpers::Helpers;
pub use settings::{AdviceSettings, SettingsPatch};
pub use types::{Advice, AdviceCategory, AdviceKind, AdviceText};
