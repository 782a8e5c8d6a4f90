// ABOUTME: The advice engine facade: candidate generation through final ranking
// ABOUTME: Owns the stores, collaborators, result cache and settings listeners
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Advice Engine
//!
//! [`AdviceEngine`] is the single entry point the host embeds. One
//! [`AdviceEngine::generate_advices`] call runs the full pipeline:
//!
//! 1. fail fast when nutrient norms are missing, and stay silent while the
//!    UI is mid-interaction;
//! 2. consult the fingerprinted result cache;
//! 3. collect candidates from the rule modules, due chain follow-ups, due
//!    snoozed advices, goal-mode bonuses and fresh achievements;
//! 4. pre-filter by settings, emotional state and trigger, boost goal-prefix
//!    ids, fold in the quick-dismiss penalty;
//! 5. personalize texts (time-of-day tables, deterministic variant pick,
//!    name substitution, mood tone);
//! 6. rank by smart score, then run the strict cascade: time restrictions,
//!    dedup groups, mutual exclusion, per-category cap;
//! 7. fill in dynamic TTLs and cache the result.
//!
//! The returned `Arc` is shared with the cache, so two calls under the same
//! fingerprint give pointer-identical results. Every feedback or settings
//! write invalidates the cache.

use crate::achievements::{
    combo_advice, personal_best_advice, BestCheck, ComboChecker, PersonalBests,
};
use crate::cache::{fingerprint, ResultCache};
use crate::catalog::{BULK_BONUSES, DEFICIT_BONUSES, MAINTENANCE_BONUSES};
use crate::config::AdviceConfig;
use crate::context::{AdviceContext, DayRecord, GoalKind, NutrientNorms, UserProfile};
use crate::feedback::FeedbackStore;
use crate::filters;
use crate::helpers::Helpers;
use crate::personalize::{
    adapt_text_to_mood, personalize_text, pick_variant, time_based_variants, variant_seed,
};
use crate::rules;
use crate::scheduling::{ChainTracker, Scheduler};
use crate::scoring::{apply_dismiss_penalty, sort_by_smart_score};
use crate::session::SessionGate;
use crate::settings::{self, AdviceSettings, SettingsPatch};
use crate::storage::{KeyValueStore, MemoryStore, Store};
use crate::types::{Advice, AdviceCategory, AdviceKind, AdviceText};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Notified with the merged settings after every successful update.
pub type SettingsListener = Box<dyn Fn(&AdviceSettings) + Send>;

/// One generation request, assembled by the host per render/event.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Today's day record
    pub day: DayRecord,
    /// Nutrient norms; `None` short-circuits to an empty result
    pub norms: Option<NutrientNorms>,
    /// User profile facts
    pub profile: UserProfile,
    /// Invocation timestamp
    pub now: DateTime<Utc>,
    /// Local hour of day
    pub hour: u32,
    /// Event that prompted the request ("tab_open", "product_added", ...)
    pub trigger: String,
    /// The rendering layer is mid-interaction
    pub ui_busy: bool,
}

/// The engine facade. Construct once, call per event.
pub struct AdviceEngine {
    helpers: Helpers,
    persistent: Store,
    session: Store,
    config: AdviceConfig,
    cache: Mutex<ResultCache>,
    listeners: Mutex<Vec<SettingsListener>>,
}

impl AdviceEngine {
    /// Build an engine over host-provided stores. `persistent` must survive
    /// restarts; `session` should be cleared when the app closes.
    #[must_use]
    pub fn new(
        helpers: Helpers,
        persistent: Box<dyn KeyValueStore>,
        session: Box<dyn KeyValueStore>,
        config: AdviceConfig,
    ) -> Self {
        Self {
            helpers,
            persistent: Store::new(persistent),
            session: Store::new(session),
            config,
            cache: Mutex::new(ResultCache::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Engine over throwaway in-memory stores, for tests and previews.
    #[must_use]
    pub fn in_memory(helpers: Helpers, config: AdviceConfig) -> Self {
        Self::new(
            helpers,
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            config,
        )
    }

    /// Run the full pipeline for one request.
    pub fn generate_advices(&self, request: GenerateRequest) -> Arc<Vec<Advice>> {
        let Some(norms) = request.norms else {
            warn!("nutrient norms unavailable, skipping advice generation");
            return Arc::new(Vec::new());
        };
        let ctx = AdviceContext::build(
            request.day,
            norms,
            &request.profile,
            request.now,
            request.hour,
            self.helpers.current_crash_risk(),
            request.ui_busy,
        );
        if ctx.ui_busy {
            debug!("ui busy, deferring advice generation");
            return Arc::new(Vec::new());
        }

        let cache_key = format!("{}|{}", request.trigger, fingerprint(&ctx));
        if let Some(hit) = self.with_cache(|c| c.get(&cache_key, ctx.now, self.config.cache.ttl_ms))
        {
            debug!("result cache hit");
            return hit;
        }

        let mut advices = rules::collect_candidates(&ctx, &self.helpers);

        let chains = ChainTracker::new(&self.persistent);
        for next in chains.ready_continuations(ctx.now) {
            if let Some(advice) = follow_up_advice(next) {
                advices.push(advice);
            }
        }
        advices.extend(Scheduler::new(&self.persistent).take_ready(ctx.now));
        self.push_goal_bonuses(&ctx, &mut advices);
        self.collect_achievements(&ctx, &mut advices);

        let settings = settings::load(&self.persistent);
        filters::filter_by_settings(&mut advices, &settings);
        filters::filter_by_emotional_state(&mut advices, ctx.emotional_state, ctx.avg_mood);
        filters::filter_by_trigger(&mut advices, &request.trigger);
        filters::apply_goal_boost(&mut advices, &ctx.goal);

        let feedback = FeedbackStore::new(&self.persistent, &self.config.feedback);
        let dismissals = feedback.dismissals();
        for advice in &mut advices {
            if let Some(stat) = dismissals.get(&advice.id) {
                advice.priority = apply_dismiss_penalty(advice.priority, stat.penalty_factor());
            }
        }

        for advice in &mut advices {
            self.personalize(advice, &ctx);
        }

        let tracking = feedback.tracking();
        let ratings = feedback.ratings();
        sort_by_smart_score(&mut advices, &ctx, &tracking, &ratings, &self.config.scoring);

        filters::apply_time_restrictions(&mut advices, ctx.hour);
        filters::dedup_by_group(&mut advices);
        filters::apply_excludes(&mut advices);
        filters::cap_per_category(&mut advices, self.config.session.max_per_category);

        for advice in &mut advices {
            self.apply_dynamic_ttl(advice);
        }

        debug!(count = advices.len(), trigger = %request.trigger, "advice generation complete");
        let result = Arc::new(advices);
        self.with_cache(|c| c.put(cache_key, Arc::clone(&result), ctx.now));
        result
    }

    /// May this advice be displayed right now, per the session gate?
    #[must_use]
    pub fn can_show(&self, advice: &Advice, now: DateTime<Utc>) -> bool {
        SessionGate::new(&self.session, &self.config.session)
            .can_show(&advice.id, advice.can_skip_cooldown, now)
    }

    /// Record a display: impression tracking, session accounting and the
    /// chain start mark all in one step.
    pub fn mark_shown(&self, advice: &Advice, now: DateTime<Utc>) {
        FeedbackStore::new(&self.persistent, &self.config.feedback).track_shown(&advice.id, now);
        SessionGate::new(&self.session, &self.config.session).mark_shown(&advice.id, now);
        ChainTracker::new(&self.persistent).mark_chain_start(&advice.id, now);
        self.with_cache(ResultCache::invalidate);
    }

    /// Record a click/expansion.
    pub fn track_click(&self, advice_id: &str, now: DateTime<Utc>) {
        FeedbackStore::new(&self.persistent, &self.config.feedback).track_click(advice_id, now);
        self.with_cache(ResultCache::invalidate);
    }

    /// Record a dismissal; `visible_ms` is how long the advice was on screen.
    pub fn track_dismiss(&self, advice_id: &str, visible_ms: u64, now: DateTime<Utc>) {
        FeedbackStore::new(&self.persistent, &self.config.feedback)
            .track_dismiss(advice_id, visible_ms, now);
        self.with_cache(ResultCache::invalidate);
    }

    /// Record a thumbs up/down vote.
    pub fn rate_advice(&self, advice_id: &str, positive: bool, now: DateTime<Utc>) {
        FeedbackStore::new(&self.persistent, &self.config.feedback).rate(advice_id, positive, now);
        self.with_cache(ResultCache::invalidate);
    }

    /// Snooze an advice for `minutes`; it comes back through generation with
    /// elevated priority once due.
    pub fn snooze(&self, advice: Advice, minutes: i64, now: DateTime<Utc>) {
        Scheduler::new(&self.persistent).schedule(advice, minutes, now);
        self.with_cache(ResultCache::invalidate);
    }

    /// Number of snoozed advices still waiting.
    #[must_use]
    pub fn pending_scheduled(&self) -> usize {
        Scheduler::new(&self.persistent).pending()
    }

    /// Clear the session gate (day rollover, logout).
    pub fn reset_session(&self) {
        SessionGate::new(&self.session, &self.config.session).reset();
        self.with_cache(ResultCache::invalidate);
    }

    /// Drop the cached result unconditionally.
    pub fn invalidate_cache(&self) {
        self.with_cache(ResultCache::invalidate);
    }

    /// Current advice settings.
    #[must_use]
    pub fn settings(&self) -> AdviceSettings {
        settings::load(&self.persistent)
    }

    /// Merge a settings patch, persist it and notify listeners.
    pub fn update_settings(&self, patch: SettingsPatch) -> AdviceSettings {
        let merged = settings::update(&self.persistent, patch);
        self.with_cache(ResultCache::invalidate);
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(&merged);
        }
        merged
    }

    /// Register a settings listener.
    pub fn on_settings_change(&self, listener: SettingsListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn with_cache<R>(&self, f: impl FnOnce(&mut ResultCache) -> R) -> R {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cache)
    }

    fn push_goal_bonuses(&self, ctx: &AdviceContext, advices: &mut Vec<Advice>) {
        let bonuses = match ctx.goal.kind {
            GoalKind::Deficit => DEFICIT_BONUSES,
            GoalKind::Bulk => BULK_BONUSES,
            GoalKind::Maintenance => MAINTENANCE_BONUSES,
        };
        for (id, text, priority) in bonuses {
            advices.push(Advice::new(
                *id,
                *text,
                AdviceCategory::Nutrition,
                AdviceKind::Tip,
                *priority,
            ));
        }
    }

    /// Personal bests and combo achievements. Higher-is-better ratios are
    /// checked mid-day (an early low value can never displace a record);
    /// lower-is-better metrics are left to an end-of-day host call.
    fn collect_achievements(&self, ctx: &AdviceContext, advices: &mut Vec<Advice>) {
        let bests = PersonalBests::new(&self.persistent);
        let date = ctx.day.date;
        let mut check = |metric: &str, value: f64| {
            if let Some(BestCheck::NewRecord { previous_value, .. }) =
                bests.check_and_update(metric, value, date)
            {
                if let Some(advice) = personal_best_advice(metric, value, previous_value) {
                    advices.push(advice);
                }
            }
        };
        check("streak", f64::from(ctx.streak_days));
        if ctx.meal_count >= 2 {
            check("proteinPct", ctx.protein_pct * 100.0);
            check("fiberPct", ctx.fiber_pct * 100.0);
            check("waterPct", ctx.water_pct * 100.0);
        }

        let combos = ComboChecker::new(
            &self.persistent,
            self.helpers.history.as_ref(),
            self.config.achievements.combo_cooldown_days,
        );
        if let Some(combo) = combos.check(date, &ctx.norms) {
            advices.push(combo_advice(combo));
        }
    }

    /// Resolve the final display text: time-of-day table, deterministic
    /// variant pick, name substitution, mood tone. Always ends as `Single`.
    fn personalize(&self, advice: &mut Advice, ctx: &AdviceContext) {
        if let Some(variants) = time_based_variants(&advice.id, ctx.hour) {
            advice.text =
                AdviceText::Variants(variants.iter().map(|v| (*v).to_owned()).collect());
        }
        let seed = variant_seed(ctx.day.date, &advice.id);
        let raw = match &advice.text {
            AdviceText::Single(s) => s.clone(),
            AdviceText::Variants(pool) => {
                let refs: Vec<&str> = pool.iter().map(String::as_str).collect();
                pick_variant(&seed, &refs).unwrap_or_default().to_owned()
            }
        };
        let named = personalize_text(&raw, ctx.first_name.as_deref());
        advice.text =
            AdviceText::Single(adapt_text_to_mood(&named, ctx.avg_mood, ctx.day.date, &advice.id));
    }

    /// Fill in the reading-speed TTL for advices that carry none (or the
    /// legacy fixed default).
    fn apply_dynamic_ttl(&self, advice: &mut Advice) {
        let ttl = &self.config.ttl;
        if advice.ttl_ms.is_some_and(|v| v != ttl.legacy_default_ms) {
            return;
        }
        let chars = u32::try_from(advice.text.max_len()).unwrap_or(u32::MAX);
        let mut ms = chars
            .saturating_mul(ttl.ms_per_char)
            .clamp(ttl.min_ms, ttl.max_ms);
        if advice.kind == AdviceKind::Critical || advice.can_skip_cooldown {
            ms += ttl.critical_bonus_ms;
        }
        advice.ttl_ms = Some(ms);
    }
}

/// Follow-up advice bodies for chain continuations. The user engaged with
/// the head advice, so follow-ups carry elevated priority.
fn follow_up_advice(id: &str) -> Option<Advice> {
    use AdviceCategory::{Hydration, Nutrition, Sleep};
    let advice = match id {
        "protein_sources" => Advice::new(
            id,
            "Easy protein wins: eggs, cottage cheese, canned fish, a protein shake",
            Nutrition,
            AdviceKind::Tip,
            12,
        )
        .with_icon("\u{1f4a1}"),
        "fiber_sources" => Advice::new(
            id,
            "Fiber shortcuts: a handful of berries, bran, any raw vegetable",
            Nutrition,
            AdviceKind::Tip,
            14,
        )
        .with_icon("\u{1f4a1}"),
        "water_benefits" => Advice::new(
            id,
            "Hydration pays off fast: fewer headaches, better focus, easier digestion",
            Hydration,
            AdviceKind::Tip,
            18,
        )
        .with_icon("\u{1f4a1}"),
        "complex_carbs_tip" => Advice::new(
            id,
            "Trade fast sugar for slow carbs: oats, buckwheat, whole-grain bread",
            Nutrition,
            AdviceKind::Tip,
            14,
        )
        .with_icon("\u{1f4a1}"),
        "good_fat_sources" => Advice::new(
            id,
            "Good-fat staples: olive oil, avocado, nuts, fatty fish",
            Nutrition,
            AdviceKind::Tip,
            16,
        )
        .with_icon("\u{1f4a1}"),
        "sleep_tips" => Advice::new(
            id,
            "Tonight: screens off an hour early, a cool room, no late caffeine",
            Sleep,
            AdviceKind::Tip,
            16,
        )
        .with_icon("\u{1f4a1}"),
        _ => return None,
    };
    Some(advice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DayTotals, Meal};
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn norms() -> NutrientNorms {
        NutrientNorms {
            kcal: 2000.0,
            protein: 120.0,
            carbs: 220.0,
            simple: 50.0,
            fiber: 30.0,
            fat: 70.0,
            trans: 2.0,
            harm: 10.0,
            water_ml: 2000.0,
        }
    }

    fn day() -> DayRecord {
        DayRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            meals: vec![
                Meal { hour: Some(9), ..Meal::default() },
                Meal { hour: Some(13), ..Meal::default() },
            ],
            totals: DayTotals {
                kcal: 1200.0,
                protein: 40.0,
                carbs: 120.0,
                simple: 25.0,
                fiber: 18.0,
                fat: 40.0,
                good_fat: 22.0,
                ..DayTotals::default()
            },
            water_ml: 600.0,
            deficit_pct: -15.0,
            ..DayRecord::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap()
    }

    fn request(now: DateTime<Utc>, hour: u32) -> GenerateRequest {
        GenerateRequest {
            day: day(),
            norms: Some(norms()),
            profile: UserProfile::default(),
            now,
            hour,
            trigger: "tab_open".to_owned(),
            ui_busy: false,
        }
    }

    fn engine() -> AdviceEngine {
        AdviceEngine::in_memory(Helpers::null(), AdviceConfig::default())
    }

    #[test]
    fn missing_norms_short_circuit() {
        let engine = engine();
        let mut req = request(t0(), 14);
        req.norms = None;
        assert!(engine.generate_advices(req).is_empty());
    }

    #[test]
    fn busy_ui_defers() {
        let engine = engine();
        let mut req = request(t0(), 14);
        req.ui_busy = true;
        assert!(engine.generate_advices(req).is_empty());
    }

    #[test]
    fn generates_ranked_relevant_advice() {
        let engine = engine();
        let result = engine.generate_advices(request(t0(), 14));
        assert!(!result.is_empty());
        // low protein and low water both hold in the fixture
        let ids: Vec<&str> = result.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"protein_low"));
        assert!(ids.contains(&"water_reminder"));
        // every survivor has a resolved single text and a TTL
        for advice in result.iter() {
            assert!(matches!(advice.text, AdviceText::Single(_)));
            let ttl = advice.ttl_ms.expect("dynamic TTL filled in");
            assert!((4_000..=14_000).contains(&ttl));
        }
        // no category exceeds the cap
        let mut counts = std::collections::HashMap::new();
        for advice in result.iter() {
            *counts.entry(advice.category).or_insert(0u32) += 1;
        }
        assert!(counts.values().all(|&c| c <= 2));
    }

    #[test]
    fn cache_returns_the_same_allocation() {
        let engine = engine();
        let first = engine.generate_advices(request(t0(), 14));
        let second = engine.generate_advices(request(t0() + Duration::seconds(30), 14));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn feedback_writes_invalidate_the_cache() {
        let engine = engine();
        let first = engine.generate_advices(request(t0(), 14));
        engine.track_dismiss("protein_low", 500, t0());
        let second = engine.generate_advices(request(t0() + Duration::seconds(30), 14));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn quick_dismissals_push_an_advice_down() {
        let engine = engine();
        let before = engine.generate_advices(request(t0(), 14));
        let pos_before = before.iter().position(|a| a.id == "protein_low");
        for _ in 0..3 {
            engine.track_dismiss("protein_low", 200, t0());
        }
        let after = engine.generate_advices(request(t0() + Duration::seconds(10), 14));
        let pos_after = after.iter().position(|a| a.id == "protein_low");
        match (pos_before, pos_after) {
            (Some(b), Some(a)) => assert!(a > b, "penalized advice must rank lower"),
            (Some(_), None) => {} // pushed out entirely, also acceptable
            _ => panic!("protein_low expected in the baseline result"),
        }
    }

    #[test]
    fn snoozed_advice_comes_back_elevated() {
        let engine = engine();
        let advice = Advice::new(
            "iron_reminder",
            "Time for your iron supplement",
            AdviceCategory::Health,
            AdviceKind::Tip,
            40,
        );
        engine.snooze(advice, 30, t0());
        assert_eq!(engine.pending_scheduled(), 1);

        let early = engine.generate_advices(request(t0() + Duration::minutes(10), 14));
        assert!(!early.iter().any(|a| a.id.ends_with("_scheduled")));

        let later = engine.generate_advices(request(t0() + Duration::minutes(40), 14));
        let delivered = later
            .iter()
            .find(|a| a.id == "iron_reminder_scheduled")
            .expect("snoozed advice delivered");
        assert!(delivered.scheduled);
        match &delivered.text {
            AdviceText::Single(s) => assert!(s.starts_with('\u{23f0}')),
            AdviceText::Variants(_) => panic!("personalized text must be single"),
        }
    }

    #[test]
    fn chain_follow_up_flows_through_generation() {
        let engine = engine();
        let shown = Advice::new(
            "protein_low",
            "More protein",
            AdviceCategory::Nutrition,
            AdviceKind::Warning,
            15,
        );
        engine.mark_shown(&shown, t0());
        let result = engine.generate_advices(request(t0() + Duration::minutes(35), 14));
        // the head fires again too, but dedup keeps only the group winner;
        // the follow-up shares the protein group with the head
        let has_chain_member = result
            .iter()
            .any(|a| a.id == "protein_sources" || a.id == "protein_low");
        assert!(has_chain_member);
    }

    #[test]
    fn session_gate_round_trip() {
        let engine = engine();
        let advice = Advice::new(
            "water_reminder",
            "Drink water",
            AdviceCategory::Hydration,
            AdviceKind::Tip,
            25,
        );
        assert!(engine.can_show(&advice, t0()));
        engine.mark_shown(&advice, t0());
        assert!(!engine.can_show(&advice, t0() + Duration::hours(1)), "no repeats per session");
        engine.reset_session();
        assert!(engine.can_show(&advice, t0() + Duration::hours(1)));
    }

    #[test]
    fn settings_update_notifies_listeners() {
        let engine = engine();
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        engine.on_settings_change(Box::new(|settings| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            assert!(!settings.sound_enabled);
        }));
        let patch = SettingsPatch { sound_enabled: Some(false), ..SettingsPatch::default() };
        engine.update_settings(patch);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_category_is_filtered_out() {
        let engine = engine();
        let patch = SettingsPatch {
            categories: Some([("hydration".to_owned(), false)].into()),
            ..SettingsPatch::default()
        };
        engine.update_settings(patch);
        let result = engine.generate_advices(request(t0(), 14));
        assert!(!result.iter().any(|a| a.category == AdviceCategory::Hydration));
    }

    #[test]
    fn streak_personal_best_is_celebrated() {
        let engine = engine();
        let mut req = request(t0(), 14);
        req.profile.streak_days = 5;
        let result = engine.generate_advices(req);
        assert!(result.iter().any(|a| a.id == "personal_best_streak"));
    }
}
