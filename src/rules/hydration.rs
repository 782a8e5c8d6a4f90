// ABOUTME: Hydration rule module: water-intake reminders and goal praise
// ABOUTME: Declarative table over the water ratio
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::DeclarativeRule;
use crate::context::AdviceContext;
use crate::types::{Advice, AdviceCategory, AdviceKind};

use AdviceCategory::Hydration;

fn water_behind_midday(ctx: &AdviceContext) -> bool {
    (12..18).contains(&ctx.hour) && ctx.water_pct < 0.5
}

fn water_reminder_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "water_reminder",
        "Under half the water goal so far. A glass now, another with the next meal",
        Hydration,
        AdviceKind::Tip,
        25,
    )
    .with_icon("\u{1f4a7}")
}

fn water_behind_evening(ctx: &AdviceContext) -> bool {
    ctx.hour >= 18 && ctx.water_pct < 0.7
}

fn water_evening_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "water_evening_low",
        "The water goal is slipping away. Catch up gently, not all at bedtime",
        Hydration,
        AdviceKind::Warning,
        20,
    )
    .with_icon("\u{1f6b0}")
}

fn water_goal_hit(ctx: &AdviceContext) -> bool {
    ctx.water_pct >= 1.0
}

fn water_goal_advice(_ctx: &AdviceContext) -> Advice {
    Advice::new(
        "water_goal_reached",
        "Water goal reached. Skin, joints and focus all run on this",
        Hydration,
        AdviceKind::Achievement,
        35,
    )
    .with_icon("\u{1f3c6}")
}

pub(super) const RULES: &[DeclarativeRule] = &[
    DeclarativeRule { condition: water_behind_midday, build: water_reminder_advice },
    DeclarativeRule { condition: water_behind_evening, build: water_evening_advice },
    DeclarativeRule { condition: water_goal_hit, build: water_goal_advice },
];
