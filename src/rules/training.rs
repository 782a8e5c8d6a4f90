// ABOUTME: Training rule module: post-workout nutrition and recovery
// ABOUTME: Declarative table over the day's logged training sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::DeclarativeRule;
use crate::context::AdviceContext;
use crate::types::{Advice, AdviceCategory, AdviceKind};

use AdviceCategory::Training;

fn trained_low_protein(ctx: &AdviceContext) -> bool {
    ctx.training_minutes() > 0.0 && ctx.protein_pct < 0.8
}

fn trained_low_protein_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "post_training_protein",
        "You trained today but protein is behind. The recovery window is now",
        Training,
        AdviceKind::Tip,
        18,
    )
    .with_icon("\u{1f3cb}")
    .with_triggers(&["tab_open", "product_added"])
}

fn hard_session(ctx: &AdviceContext) -> bool {
    ctx.day
        .trainings
        .iter()
        .any(|t| t.high_intensity && t.minutes >= 20.0)
}

fn hard_session_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "hard_workout_recovery",
        "Hard session today. Extra water, carbs for glycogen, and an earlier night",
        Training,
        AdviceKind::Tip,
        20,
    )
    .with_icon("\u{1f525}")
}

fn long_workout(ctx: &AdviceContext) -> bool {
    ctx.training_minutes() >= 45.0
}

fn long_workout_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "great_workout",
        "45+ minutes of training. That's how habits are built",
        Training,
        AdviceKind::Achievement,
        35,
    )
    .with_icon("\u{1f3c5}")
}

pub(super) const RULES: &[DeclarativeRule] = &[
    DeclarativeRule { condition: trained_low_protein, build: trained_low_protein_advice },
    DeclarativeRule { condition: hard_session, build: hard_session_advice },
    DeclarativeRule { condition: long_workout, build: long_workout_advice },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Training as Session;
    use crate::rules::tests::{ctx_at, day};
    use crate::rules::RuleModule;

    #[test]
    fn training_day_wants_protein() {
        let mut d = day();
        d.trainings.push(Session { minutes: 30.0, high_intensity: false });
        d.totals.protein = 70.0; // 0.58
        let out = RuleModule::Declarative(RULES)
            .generate(&ctx_at(19, d), &crate::helpers::Helpers::null());
        assert!(out.iter().any(|a| a.id == "post_training_protein"));
        assert!(!out.iter().any(|a| a.id == "great_workout"));
    }

    #[test]
    fn hard_and_long_sessions_stack() {
        let mut d = day();
        d.trainings.push(Session { minutes: 60.0, high_intensity: true });
        d.totals.protein = 110.0; // 0.92, no protein nag
        let out = RuleModule::Declarative(RULES)
            .generate(&ctx_at(20, d), &crate::helpers::Helpers::null());
        let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["hard_workout_recovery", "great_workout"]);
    }

    #[test]
    fn rest_day_is_silent() {
        let out = RuleModule::Declarative(RULES)
            .generate(&ctx_at(19, day()), &crate::helpers::Helpers::null());
        assert!(out.is_empty());
    }
}
