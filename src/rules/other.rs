// ABOUTME: Catch-all rule module: sleep, streaks, seasonal tips, pace and trends
// ABOUTME: Functional module; reads the day history for week-over-week trends
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::achievements::next_streak_milestone;
use crate::catalog::{SEASONAL_TIPS, STREAK_MILESTONES};
use crate::context::AdviceContext;
use crate::helpers::Helpers;
use crate::insights::{day_forecast, weekly_comparison};
use crate::types::{Advice, AdviceCategory, AdviceKind};
use chrono::{Datelike, Duration};

pub(super) fn generate(ctx: &AdviceContext, helpers: &Helpers) -> Vec<Advice> {
    let mut out = Vec::new();
    let sleep_norm = ctx.sleep_norm_hours.unwrap_or(8.0);

    if let Some(quality) = ctx.day.sleep_quality {
        if quality > 0.0 && quality <= 2.0 && ctx.hour < 12 {
            out.push(
                Advice::new(
                    "bad_sleep_advice",
                    "Rough night. Go easy on the coffee and lead with protein today",
                    AdviceCategory::Sleep,
                    AdviceKind::Tip,
                    26,
                )
                .with_icon("\u{1f62b}"),
            );
        }
    }

    if let Some(sleep) = ctx.day.sleep_hours {
        let deficit = sleep_norm - sleep;
        if deficit > 2.0 && ctx.kcal_pct > 1.15 {
            out.push(
                Advice::new(
                    "sleep_hunger_correlation",
                    "Short on sleep and over budget. Sleep debt raises appetite, that is hormones, not willpower",
                    AdviceCategory::Sleep,
                    AdviceKind::Tip,
                    20,
                )
                .with_icon("\u{1f9e0}")
                .with_triggers(&["product_added", "tab_open"]),
            );
        }
        if deficit > 1.5 && ctx.hour < 12 && ctx.kcal_pct < 0.3 {
            out.push(
                Advice::new(
                    "sleep_hunger_warning",
                    "Appetite runs higher after a short night. Plan a filling, protein-forward lunch",
                    AdviceCategory::Sleep,
                    AdviceKind::Tip,
                    25,
                )
                .with_icon("\u{26a1}"),
            );
        }
        if sleep > 0.0 && sleep < 6.0 && ctx.hour < 12 {
            out.push(
                Advice::new(
                    "sleep_low",
                    "Short night. Hunger runs higher on sleep debt, watch the snacks today",
                    AdviceCategory::Sleep,
                    AdviceKind::Warning,
                    20,
                )
                .with_icon("\u{1f634}"),
            );
        } else if sleep >= sleep_norm {
            out.push(
                Advice::new(
                    "great_sleep",
                    "A full night's sleep. Recovery, appetite and focus all covered",
                    AdviceCategory::Sleep,
                    AdviceKind::Success,
                    45,
                )
                .with_icon("\u{1f31b}"),
            );
        }
    }

    let short_nights = (1..=3)
        .filter_map(|offset| helpers.history.day(ctx.day.date - Duration::days(offset)))
        .filter_map(|d| d.sleep_hours)
        .filter(|&h| h > 0.0 && h < 6.0)
        .count();
    if short_nights == 3 {
        out.push(
            Advice::new(
                "sleep_debt_accumulating",
                "Three short nights in a row. Sleep debt pushes hunger hormones up, turn in early tonight",
                AdviceCategory::Sleep,
                AdviceKind::Warning,
                95,
            )
            .with_icon("\u{1f634}"),
        );
    }

    if let Some(milestone) = STREAK_MILESTONES.iter().find(|m| m.days == ctx.streak_days) {
        out.push(
            Advice::new(
                format!("streak_{}", milestone.days),
                format!("{} days in a row. The streak is real!", milestone.days),
                AdviceCategory::Achievement,
                AdviceKind::Streak,
                30,
            )
            .with_icon(milestone.icon),
        );
    } else if ctx.streak_days > 0 {
        if let Some((milestone, remaining)) = next_streak_milestone(ctx.streak_days) {
            if remaining <= 2 {
                out.push(
                    Advice::new(
                        "streak_countdown",
                        format!("Only {remaining} more to a {}-day streak. Don't break it now", milestone.days),
                        AdviceCategory::Achievement,
                        AdviceKind::Streak,
                        40,
                    )
                    .with_icon(milestone.icon),
                );
            }
        }
    }

    let month = ctx.day.date.month();
    for tip in SEASONAL_TIPS {
        if tip.months.contains(&month) {
            let texts: Vec<String> = tip.texts.iter().map(|t| (*t).to_owned()).collect();
            out.push(
                Advice::new(tip.id, texts, tip.category, AdviceKind::Tip, tip.priority)
                    .with_icon(tip.icon),
            );
        }
    }

    if ctx.hour >= 12 && !ctx.is_day_empty {
        let forecast = day_forecast(ctx.kcal_pct, ctx.hour);
        if forecast.delta < -0.25 {
            out.push(
                Advice::new(
                    "day_pace_behind",
                    "You're well behind the usual intake pace for this hour. Plan the next meal",
                    AdviceCategory::Other,
                    AdviceKind::Tip,
                    30,
                )
                .with_icon("\u{1f4c9}"),
            );
        }
    }

    if let Some(trend) = weekly_comparison(helpers.history.as_ref(), ctx.day.date) {
        if trend.previous_avg_protein > 0.0
            && trend.current_avg_protein > trend.previous_avg_protein * 1.1
        {
            out.push(
                Advice::new(
                    "weekly_protein_up",
                    "Protein is up more than 10% on last week. Quiet, steady progress",
                    AdviceCategory::Other,
                    AdviceKind::Success,
                    50,
                )
                .with_icon("\u{1f4c8}"),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DayRecord, DayTotals, UserProfile};
    use crate::helpers::DayHistory;
    use crate::rules::tests::{ctx_at, day, norms};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn ids(out: &[Advice]) -> Vec<&str> {
        out.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn short_sleep_warns_in_the_morning_only() {
        let mut d = day();
        d.sleep_hours = Some(5.0);
        let morning = generate(&ctx_at(9, d.clone()), &Helpers::null());
        assert!(ids(&morning).contains(&"sleep_low"));
        let evening = generate(&ctx_at(19, d), &Helpers::null());
        assert!(!ids(&evening).contains(&"sleep_low"));
    }

    #[test]
    fn poor_sleep_quality_flagged_before_noon() {
        let mut d = day();
        d.sleep_quality = Some(2.0);
        assert!(ids(&generate(&ctx_at(9, d.clone()), &Helpers::null())).contains(&"bad_sleep_advice"));
        assert!(!ids(&generate(&ctx_at(14, d), &Helpers::null())).contains(&"bad_sleep_advice"));
    }

    #[test]
    fn sleep_deficit_links_to_appetite() {
        // 2.5h short of the default 8h norm, 20% over budget
        let mut d = day();
        d.sleep_hours = Some(5.5);
        d.totals.kcal = 2400.0;
        let out = generate(&ctx_at(14, d), &Helpers::null());
        assert!(ids(&out).contains(&"sleep_hunger_correlation"));

        // barely started eating after a short night
        let mut morning = day();
        morning.sleep_hours = Some(6.0);
        morning.totals.kcal = 400.0;
        let out = generate(&ctx_at(9, morning), &Helpers::null());
        assert!(ids(&out).contains(&"sleep_hunger_warning"));
    }

    struct ShortNights;

    impl DayHistory for ShortNights {
        fn day(&self, _date: NaiveDate) -> Option<DayRecord> {
            Some(DayRecord { sleep_hours: Some(5.0), ..DayRecord::default() })
        }
    }

    #[test]
    fn three_short_nights_accumulate_debt() {
        let helpers = Helpers { history: Box::new(ShortNights), ..Helpers::null() };
        assert!(ids(&generate(&ctx_at(14, day()), &helpers)).contains(&"sleep_debt_accumulating"));
        assert!(!ids(&generate(&ctx_at(14, day()), &Helpers::null())).contains(&"sleep_debt_accumulating"));
    }

    #[test]
    fn streak_milestone_and_countdown() {
        let mut profile = UserProfile { streak_days: 7, ..UserProfile::default() };
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        let ctx = crate::context::AdviceContext::build(day(), norms(), &profile, now, 14, None, false);
        assert!(ids(&generate(&ctx, &Helpers::null())).contains(&"streak_7"));

        profile.streak_days = 6;
        let ctx = crate::context::AdviceContext::build(day(), norms(), &profile, now, 14, None, false);
        assert!(ids(&generate(&ctx, &Helpers::null())).contains(&"streak_countdown"));
    }

    #[test]
    fn seasonal_tip_matches_month() {
        let out = generate(&ctx_at(14, day()), &Helpers::null());
        // fixture date is in June
        assert!(ids(&out).contains(&"summer_hydration"));
        assert!(!ids(&out).contains(&"winter_vitamin_d"));
    }

    #[test]
    fn pace_warning_when_far_behind() {
        let mut d = day();
        d.totals.kcal = 400.0; // 0.20 vs 0.60 expected at 14
        let out = generate(&ctx_at(14, d), &Helpers::null());
        assert!(ids(&out).contains(&"day_pace_behind"));
    }

    struct FlatHistory {
        protein: (f64, f64),
    }

    impl DayHistory for FlatHistory {
        fn day(&self, date: NaiveDate) -> Option<DayRecord> {
            let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
            let offset = (today - date).num_days();
            let protein = if offset <= 7 { self.protein.0 } else { self.protein.1 };
            (1..=14).contains(&offset).then(|| DayRecord {
                totals: DayTotals { kcal: 1800.0, protein, ..DayTotals::default() },
                ..DayRecord::default()
            })
        }
    }

    #[test]
    fn weekly_protein_trend() {
        let helpers = Helpers {
            history: Box::new(FlatHistory { protein: (110.0, 90.0) }),
            ..Helpers::null()
        };
        let out = generate(&ctx_at(14, day()), &helpers);
        assert!(ids(&out).contains(&"weekly_protein_up"));

        let flat = Helpers {
            history: Box::new(FlatHistory { protein: (95.0, 90.0) }),
            ..Helpers::null()
        };
        let out = generate(&ctx_at(14, day()), &flat);
        assert!(!ids(&out).contains(&"weekly_protein_up"));
    }
}
