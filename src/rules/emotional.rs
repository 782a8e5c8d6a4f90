// ABOUTME: Emotional rule module: support over scolding on bad days
// ABOUTME: Declarative table keyed on the derived emotional state and mood
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::DeclarativeRule;
use crate::context::{AdviceContext, EmotionalState};
use crate::types::{Advice, AdviceCategory, AdviceKind};

use AdviceCategory::Emotional;

fn is_stressed(ctx: &AdviceContext) -> bool {
    ctx.emotional_state == EmotionalState::Stressed
}

fn stress_support_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "stress_support",
        "Rough day? Food won't fix it, but a short walk and a warm meal help",
        Emotional,
        AdviceKind::Tip,
        10,
    )
    .with_icon("\u{1f9d8}")
}

fn is_crashed(ctx: &AdviceContext) -> bool {
    ctx.emotional_state == EmotionalState::Crashed
}

fn crash_support_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "crash_support",
        "One off day changes nothing. Tomorrow is a clean slate, ${firstName}",
        Emotional,
        AdviceKind::Tip,
        5,
    )
    .with_icon("\u{1f499}")
    .with_excludes(&["kcal_excess_critical", "kcal_excess_mild"])
    .skip_cooldown()
}

fn is_returning(ctx: &AdviceContext) -> bool {
    ctx.emotional_state == EmotionalState::Returning
}

fn returning_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "returning_user",
        "Good to see you back, ${firstName}! Pick up right where you left off",
        Emotional,
        AdviceKind::Success,
        8,
    )
    .with_icon("\u{1f44b}")
    .skip_cooldown()
}

fn mood_is_high(ctx: &AdviceContext) -> bool {
    ctx.avg_mood.is_some_and(|m| m >= 4.0) && ctx.meal_count >= 2
}

fn mood_high_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "mood_improving",
        "Great mood and the log to match. Days like this build momentum",
        Emotional,
        AdviceKind::Success,
        40,
    )
    .with_icon("\u{1f60a}")
}

pub(super) const RULES: &[DeclarativeRule] = &[
    DeclarativeRule { condition: is_crashed, build: crash_support_advice },
    DeclarativeRule { condition: is_stressed, build: stress_support_advice },
    DeclarativeRule { condition: is_returning, build: returning_advice },
    DeclarativeRule { condition: mood_is_high, build: mood_high_advice },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::{ctx_at, day};
    use crate::rules::RuleModule;

    fn run(ctx: &AdviceContext) -> Vec<Advice> {
        RuleModule::Declarative(RULES).generate(ctx, &crate::helpers::Helpers::null())
    }

    #[test]
    fn stressed_user_gets_support_not_warnings() {
        let mut d = day();
        for meal in &mut d.meals {
            meal.mood = Some(2.0);
        }
        let ctx = ctx_at(14, d);
        assert_eq!(ctx.emotional_state, EmotionalState::Stressed);
        let out = run(&ctx);
        assert!(out.iter().any(|a| a.id == "stress_support"));
        assert!(!out.iter().any(|a| a.id == "crash_support"));
    }

    #[test]
    fn crash_support_suppresses_calorie_scolding() {
        let mut d = day();
        d.totals.kcal = 2800.0; // 1.4, crashed
        let ctx = ctx_at(14, d);
        assert_eq!(ctx.emotional_state, EmotionalState::Crashed);
        let advice = run(&ctx).into_iter().find(|a| a.id == "crash_support").unwrap();
        assert!(advice.can_skip_cooldown);
        assert!(advice.excludes.contains(&"kcal_excess_critical".to_owned()));
    }

    #[test]
    fn good_mood_is_celebrated() {
        let mut d = day();
        for meal in &mut d.meals {
            meal.mood = Some(4.5);
        }
        let out = run(&ctx_at(14, d));
        assert!(out.iter().any(|a| a.id == "mood_improving"));
    }

    #[test]
    fn normal_day_is_silent() {
        assert!(run(&ctx_at(14, day())).is_empty());
    }
}
