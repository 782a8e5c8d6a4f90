// ABOUTME: Static configuration tables wiring the rule catalog together
// ABOUTME: Dedup groups, time windows, chains, combos, metrics, seasonal tips, tone tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Advice Catalog Tables
//!
//! The closed, data-driven half of the rule system: named deduplication
//! groups, time-of-day windows, chain links, combo achievement definitions,
//! trackable personal-best metrics, goal-mode bonus advices, seasonal tips,
//! the streak milestone ladder, mood tone tables, time-of-day text variants
//! and product-category keyword lists. Rule modules and the filter cascade
//! consume these by id.

use crate::types::AdviceCategory;

/// Named groups of interchangeable advice ids; at most one member of a group
/// survives a generation pass.
pub const DEDUP_GROUPS: &[(&str, &[&str])] = &[
    (
        "protein",
        &[
            "protein_low",
            "protein_sources",
            "post_training_protein",
            "bedtime_protein",
            "protein_champion",
            "protein_per_meal_low",
        ],
    ),
    (
        "water",
        &[
            "water_reminder",
            "water_evening_low",
            "water_goal_reached",
            "water_benefits",
        ],
    ),
    (
        "carbs",
        &[
            "simple_carbs_warning",
            "complex_carbs_tip",
            "simple_complex_ratio",
            "evening_carbs_high",
        ],
    ),
    ("fiber", &["fiber_low", "fiber_good", "fiber_sources"]),
    (
        "fat",
        &["fat_quality_low", "fat_quality_great", "trans_fat_warning"],
    ),
    (
        "kcal",
        &[
            "kcal_excess_critical",
            "kcal_excess_mild",
            "kcal_under_critical",
            "evening_undereating",
            "evening_perfect",
        ],
    ),
    (
        "sleep",
        &[
            "sleep_low",
            "bad_sleep_advice",
            "great_sleep",
            "sleep_hunger_correlation",
            "sleep_debt_accumulating",
        ],
    ),
    (
        "training",
        &[
            "post_training_protein",
            "hard_workout_recovery",
            "great_workout",
        ],
    ),
    (
        "mood",
        &["stress_support", "crash_support", "mood_improving"],
    ),
];

/// Time-of-day window restricting when an advice may be shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindow {
    /// Drop when `hour >= not_after`
    pub not_after_hour: Option<u32>,
    /// Drop when `hour < not_before`
    pub not_before_hour: Option<u32>,
    /// Drop outside `[from, to)`
    pub only_between_hours: Option<(u32, u32)>,
}

impl TimeWindow {
    /// Does the window admit the given hour?
    #[must_use]
    pub fn allows(&self, hour: u32) -> bool {
        if let Some(limit) = self.not_after_hour {
            if hour >= limit {
                return false;
            }
        }
        if let Some(limit) = self.not_before_hour {
            if hour < limit {
                return false;
            }
        }
        if let Some((from, to)) = self.only_between_hours {
            if hour < from || hour >= to {
                return false;
            }
        }
        true
    }
}

const fn not_after(hour: u32) -> TimeWindow {
    TimeWindow {
        not_after_hour: Some(hour),
        not_before_hour: None,
        only_between_hours: None,
    }
}

const fn not_before(hour: u32) -> TimeWindow {
    TimeWindow {
        not_after_hour: None,
        not_before_hour: Some(hour),
        only_between_hours: None,
    }
}

const fn between(from: u32, to: u32) -> TimeWindow {
    TimeWindow {
        not_after_hour: None,
        not_before_hour: None,
        only_between_hours: Some((from, to)),
    }
}

/// Per-advice time restrictions; advices not listed pass at any hour.
pub const TIME_RESTRICTIONS: &[(&str, TimeWindow)] = &[
    ("morning_breakfast", not_after(12)),
    ("lunch_time", between(11, 15)),
    ("snack_window", between(15, 18)),
    ("evening_undereating", not_before(18)),
    ("evening_perfect", not_before(20)),
    ("evening_carbs_high", not_before(19)),
    ("late_dinner_warning", not_before(21)),
    ("bedtime_protein", between(20, 23)),
    ("night_owl_warning", between(1, 5)),
    ("bad_sleep_advice", not_after(12)),
    ("sleep_hunger_warning", not_after(14)),
];

/// Look up the time window for an advice id.
#[must_use]
pub fn time_window_for(id: &str) -> Option<TimeWindow> {
    TIME_RESTRICTIONS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, w)| *w)
}

/// Follow-up link: after `delay_minutes` since the head advice was shown, the
/// `next` advice becomes a candidate exactly once.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink {
    /// Follow-up advice id
    pub next: &'static str,
    /// Minimum delay before the follow-up fires
    pub delay_minutes: i64,
}

/// Head-advice id → follow-up link.
pub const CHAIN_LINKS: &[(&str, ChainLink)] = &[
    ("protein_low", ChainLink { next: "protein_sources", delay_minutes: 30 }),
    ("fiber_low", ChainLink { next: "fiber_sources", delay_minutes: 30 }),
    ("water_reminder", ChainLink { next: "water_benefits", delay_minutes: 60 }),
    ("simple_carbs_warning", ChainLink { next: "complex_carbs_tip", delay_minutes: 20 }),
    ("fat_quality_low", ChainLink { next: "good_fat_sources", delay_minutes: 45 }),
    ("sleep_low", ChainLink { next: "sleep_tips", delay_minutes: 120 }),
];

/// Look up the chain link for a head advice id.
#[must_use]
pub fn chain_link_for(id: &str) -> Option<ChainLink> {
    CHAIN_LINKS.iter().find(|(key, _)| *key == id).map(|(_, l)| *l)
}

/// Threshold conditions a day must satisfy to count toward a combo. All set
/// fields must hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComboConditions {
    /// Protein ratio at least
    pub protein_pct_min: Option<f64>,
    /// Fiber ratio at least
    pub fiber_pct_min: Option<f64>,
    /// Carbs ratio at least
    pub carbs_pct_min: Option<f64>,
    /// Fat ratio at least
    pub fat_pct_min: Option<f64>,
    /// Every macro ratio also under this ceiling
    pub all_under: Option<f64>,
    /// Water ratio at least
    pub water_pct_min: Option<f64>,
    /// Harm ratio at most
    pub harm_pct_max: Option<f64>,
    /// Trans-fat ratio at most
    pub trans_pct_max: Option<f64>,
    /// First meal strictly before this hour
    pub breakfast_before_hour: Option<u32>,
}

/// Multi-day combo achievement definition.
#[derive(Debug, Clone, Copy)]
pub struct ComboAchievement {
    /// Stable id, also the cooldown key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Day conditions
    pub conditions: ComboConditions,
    /// Qualifying days needed
    pub days_required: u32,
    /// Icon hint
    pub icon: &'static str,
    /// Award text
    pub text: &'static str,
}

const NO_CONDITIONS: ComboConditions = ComboConditions {
    protein_pct_min: None,
    fiber_pct_min: None,
    carbs_pct_min: None,
    fat_pct_min: None,
    all_under: None,
    water_pct_min: None,
    harm_pct_max: None,
    trans_pct_max: None,
    breakfast_before_hour: None,
};

/// Combo achievement definitions, checked in order; the first satisfied combo
/// per pass is awarded.
pub const COMBO_ACHIEVEMENTS: &[ComboAchievement] = &[
    ComboAchievement {
        id: "protein_fiber_combo",
        name: "Protein + Fiber",
        conditions: ComboConditions {
            protein_pct_min: Some(0.9),
            fiber_pct_min: Some(0.8),
            ..NO_CONDITIONS
        },
        days_required: 3,
        icon: "\u{1f4aa}\u{1f957}",
        text: "3 days straight of great protein AND fiber. Combo!",
    },
    ComboAchievement {
        id: "balanced_macros_combo",
        name: "Balanced macros",
        conditions: ComboConditions {
            protein_pct_min: Some(0.9),
            carbs_pct_min: Some(0.9),
            fat_pct_min: Some(0.9),
            all_under: Some(1.15),
            ..NO_CONDITIONS
        },
        days_required: 3,
        icon: "\u{2696}",
        text: "3 days of perfectly balanced macros. Mastery!",
    },
    ComboAchievement {
        id: "hydration_master",
        name: "Hydration master",
        conditions: ComboConditions {
            water_pct_min: Some(1.0),
            ..NO_CONDITIONS
        },
        days_required: 5,
        icon: "\u{1f4a7}",
        text: "5 days at your water goal. Hydration on point!",
    },
    ComboAchievement {
        id: "clean_eating",
        name: "Clean eating",
        conditions: ComboConditions {
            harm_pct_max: Some(0.5),
            trans_pct_max: Some(0.3),
            ..NO_CONDITIONS
        },
        days_required: 3,
        icon: "\u{1f33f}",
        text: "3 days with junk at a minimum. Clean eating!",
    },
    ComboAchievement {
        id: "early_bird",
        name: "Early bird",
        conditions: ComboConditions {
            breakfast_before_hour: Some(9),
            ..NO_CONDITIONS
        },
        days_required: 5,
        icon: "\u{1f305}",
        text: "5 days with an early breakfast. That's a routine!",
    },
];

/// Metric eligible for personal-best tracking.
#[derive(Debug, Clone, Copy)]
pub struct TrackableMetric {
    /// Storage key
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Icon hint
    pub icon: &'static str,
    /// Display unit
    pub unit: &'static str,
    /// True when a larger value is better
    pub higher_is_better: bool,
}

/// Metrics the engine records personal bests for.
pub const TRACKABLE_METRICS: &[TrackableMetric] = &[
    TrackableMetric { key: "proteinPct", name: "Protein", icon: "\u{1f969}", unit: "%", higher_is_better: true },
    TrackableMetric { key: "fiberPct", name: "Fiber", icon: "\u{1f96c}", unit: "%", higher_is_better: true },
    TrackableMetric { key: "waterPct", name: "Water", icon: "\u{1f4a7}", unit: "%", higher_is_better: true },
    TrackableMetric { key: "goodFatRatio", name: "Healthy fats", icon: "\u{1f951}", unit: "%", higher_is_better: true },
    TrackableMetric { key: "streak", name: "Day streak", icon: "\u{1f525}", unit: "d", higher_is_better: true },
    TrackableMetric { key: "lowHarmDay", name: "Clean day", icon: "\u{1f33f}", unit: "%", higher_is_better: false },
];

/// Look up a trackable metric definition.
#[must_use]
pub fn trackable_metric(key: &str) -> Option<TrackableMetric> {
    TRACKABLE_METRICS.iter().find(|m| m.key == key).copied()
}

/// Goal-mode bonus advice stub (id, text, priority).
pub type GoalBonus = (&'static str, &'static str, i32);

/// Extra candidates merged in for users on a caloric deficit.
pub const DEFICIT_BONUSES: &[GoalBonus] = &[
    ("deficit_protein_priority", "On a deficit, protein is priority number one", 25),
    ("deficit_water_hunger", "Thirst often masquerades as hunger. Drink a glass of water first", 27),
];

/// Extra candidates merged in for users bulking.
pub const BULK_BONUSES: &[GoalBonus] = &[
    ("bulk_protein_timing", "Protein after training is the window of opportunity", 25),
    ("bulk_carbs_energy", "Complex carbs are fuel for growth", 26),
    ("bulk_sleep_growth", "Muscle grows while you sleep. Aim for 7-8 hours", 27),
];

/// Extra candidates merged in for users maintaining.
pub const MAINTENANCE_BONUSES: &[GoalBonus] = &[
    ("maintenance_balance", "Balance beats perfection. Hold the average", 25),
    ("maintenance_variety", "Variety is what makes a diet stick", 26),
];

/// Month-gated low-priority lifestyle tip.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalTip {
    /// Stable id
    pub id: &'static str,
    /// Months (1-12) the tip is active in
    pub months: &'static [u32],
    /// Icon hint
    pub icon: &'static str,
    /// Text variants
    pub texts: &'static [&'static str],
    /// Category
    pub category: AdviceCategory,
    /// Priority
    pub priority: i32,
}

/// Seasonal tips, one per season.
pub const SEASONAL_TIPS: &[SeasonalTip] = &[
    SeasonalTip {
        id: "winter_vitamin_d",
        months: &[11, 12, 1, 2, 3],
        icon: "\u{2744}",
        texts: &[
            "Vitamin D matters in winter: fatty fish, eggs, mushrooms",
            "Not much sun? Add fatty fish and eggs to the menu",
            "Winter vitamin D through food: salmon, mackerel, egg yolk",
        ],
        category: AdviceCategory::Lifestyle,
        priority: 60,
    },
    SeasonalTip {
        id: "spring_greens",
        months: &[3, 4, 5],
        icon: "\u{1f331}",
        texts: &[
            "Spring is greens season: spinach, arugula, fresh herbs",
            "Shake off the winter: more vegetables and water",
        ],
        category: AdviceCategory::Lifestyle,
        priority: 60,
    },
    SeasonalTip {
        id: "summer_hydration",
        months: &[6, 7, 8],
        icon: "\u{2600}",
        texts: &[
            "Hot out: add 500 ml to your water goal",
            "Summer hydration: watermelon, cucumbers, plain water",
            "You lose water in the heat. Top up regularly",
        ],
        category: AdviceCategory::Hydration,
        priority: 55,
    },
    SeasonalTip {
        id: "autumn_immunity",
        months: &[9, 10, 11],
        icon: "\u{1f342}",
        texts: &[
            "Autumn: back up your immune system with ginger, lemon, honey",
            "Cold season ahead. Vitamin C from citrus and kiwi",
        ],
        category: AdviceCategory::Lifestyle,
        priority: 60,
    },
];

/// Streak milestone ladder entry.
#[derive(Debug, Clone, Copy)]
pub struct StreakMilestone {
    /// Days required
    pub days: u32,
    /// Icon hint
    pub icon: &'static str,
}

/// Milestones the streak nudge counts toward.
pub const STREAK_MILESTONES: &[StreakMilestone] = &[
    StreakMilestone { days: 3, icon: "\u{1f525}" },
    StreakMilestone { days: 7, icon: "\u{2b50}" },
    StreakMilestone { days: 14, icon: "\u{1f48e}" },
    StreakMilestone { days: 30, icon: "\u{1f3c6}" },
];

/// Tone table adapting advice texts to the user's mood.
#[derive(Debug, Clone, Copy)]
pub struct MoodTone {
    /// Prefix variants (may be empty strings)
    pub prefixes: &'static [&'static str],
    /// Suffix variants (may be empty strings)
    pub suffixes: &'static [&'static str],
    /// Suppress warning-kind advices entirely
    pub avoid_warnings: bool,
}

/// Tone for low mood (1-2): soften, drop warnings.
pub const MOOD_TONE_LOW: MoodTone = MoodTone {
    prefixes: &["No big deal, ", "It's all right, ", "Don't worry, "],
    suffixes: &[" \u{1f499}", " You've got this!", ""],
    avoid_warnings: true,
};

/// Tone for high mood (4-5): celebrate.
pub const MOOD_TONE_HIGH: MoodTone = MoodTone {
    prefixes: &["Great going! ", "Awesome! ", "Keep it up! "],
    suffixes: &[" \u{1f389}", " \u{1f4aa}", ""],
    avoid_warnings: false,
};

/// Time-of-day text table for an advice id.
#[derive(Debug, Clone, Copy)]
pub struct TimeBasedTexts {
    /// Advice id the table applies to
    pub id: &'static str,
    /// Before 12:00
    pub morning: &'static [&'static str],
    /// 12:00-17:59
    pub afternoon: &'static [&'static str],
    /// 18:00 onward
    pub evening: &'static [&'static str],
}

/// Advices whose text rotates with the time of day.
pub const TIME_BASED_TEXTS: &[TimeBasedTexts] = &[
    TimeBasedTexts {
        id: "protein_low",
        morning: &[
            "Protein matters most in the morning: omelet or cottage cheese?",
            "Start the day with protein and the energy lasts till lunch",
        ],
        afternoon: &[
            "A lunch without protein means a hungry evening",
            "Add protein to lunch: chicken, fish, cottage cheese",
        ],
        evening: &[
            "Evening protein means overnight muscle recovery",
            "Protein for dinner: cottage cheese, fish, eggs",
        ],
    },
    TimeBasedTexts {
        id: "water_reminder",
        morning: &[
            "A glass of water first thing kick-starts the metabolism",
            "Start the day with water. Your body will thank you",
        ],
        afternoon: &[
            "Midday: time to top up the water balance",
            "Keep sipping. The evening is still far off",
        ],
        evening: &[
            "Go easy in the evening, but don't forget water entirely",
            "A glass of water before bed, just not in the last hour",
        ],
    },
    TimeBasedTexts {
        id: "fiber_low",
        morning: &[
            "Morning oatmeal covers fiber for the whole day",
            "A fiber-rich breakfast keeps you full till lunch",
        ],
        afternoon: &[
            "Add a salad to lunch. Fiber is running low",
            "Lunch without vegetables? Add a side",
        ],
        evening: &[
            "Vegetables for dinner: light and fiber-rich",
            "Evening is salad time",
        ],
    },
    TimeBasedTexts {
        id: "simple_carbs_warning",
        morning: &[
            "Sugar in the morning means energy swings all day",
            "Swap the sweets for complex carbs",
        ],
        afternoon: &[
            "Dessert after lunch? An energy dip is coming",
            "Fruit beats dessert here",
        ],
        evening: &[
            "Sugar in the evening means poor sleep",
            "Sweets hit hardest at night",
        ],
    },
];

/// Look up the time-of-day text table for an advice id.
#[must_use]
pub fn time_based_texts(id: &str) -> Option<&'static TimeBasedTexts> {
    TIME_BASED_TEXTS.iter().find(|t| t.id == id)
}

/// Product category keyword table used by the coverage analysis.
#[derive(Debug, Clone, Copy)]
pub struct ProductCategory {
    /// Category key
    pub key: &'static str,
    /// Substrings matched against normalized product names
    pub keywords: &'static [&'static str],
    /// Icon hint
    pub icon: &'static str,
    /// Nudge when the category is missing today
    pub advice: &'static str,
    /// Praise when the category is covered
    pub good_advice: &'static str,
}

/// Keyword tables for the eight tracked product categories.
pub const PRODUCT_CATEGORIES: &[ProductCategory] = &[
    ProductCategory {
        key: "vegetables",
        keywords: &[
            "cucumber", "tomato", "carrot", "cabbage", "broccoli", "spinach", "lettuce",
            "pepper", "onion", "garlic", "zucchini", "eggplant", "beet", "radish",
            "celery", "parsley", "dill", "arugula", "cauliflower", "pumpkin", "pea",
            "green bean",
        ],
        icon: "\u{1f957}",
        advice: "Low on vegetables today. Add a salad or a veggie side",
        good_advice: "Great vegetable coverage today!",
    },
    ProductCategory {
        key: "fruits",
        keywords: &[
            "apple", "banana", "orange", "tangerine", "pear", "grape", "peach",
            "apricot", "plum", "kiwi", "mango", "pineapple", "watermelon", "melon",
            "strawberr", "raspberr", "blueberr", "berr", "pomegranate", "grapefruit",
            "lemon",
        ],
        icon: "\u{1f34e}",
        advice: "Fruit is nature's vitamins. Add one today",
        good_advice: "A fruity day!",
    },
    ProductCategory {
        key: "dairy",
        keywords: &[
            "milk", "kefir", "yogurt", "cottage cheese", "cheese", "sour cream",
            "cream", "mozzarella", "parmesan", "ricotta", "feta",
        ],
        icon: "\u{1f95b}",
        advice: "Dairy means calcium. Cottage cheese or yogurt?",
        good_advice: "Calcium covered!",
    },
    ProductCategory {
        key: "fish",
        keywords: &[
            "fish", "salmon", "trout", "mackerel", "cod", "tuna", "herring", "carp",
            "perch", "pollock", "shrimp", "mussel", "squid", "seafood",
        ],
        icon: "\u{1f41f}",
        advice: "Fish 2-3 times a week: omega-3 for the brain",
        good_advice: "Omega-3 secured!",
    },
    ProductCategory {
        key: "meat",
        keywords: &[
            "meat", "beef", "pork", "chicken", "turkey", "lamb", "rabbit", "duck",
            "veal", "mince", "steak", "fillet", "breast", "thigh", "cutlet",
        ],
        icon: "\u{1f969}",
        advice: "Meat is the main source of protein and iron",
        good_advice: "Protein secured!",
    },
    ProductCategory {
        key: "grains",
        keywords: &[
            "buckwheat", "rice", "oatmeal", "oat", "millet", "barley", "bulgur",
            "couscous", "quinoa", "pasta", "spaghetti", "bread", "porridge",
        ],
        icon: "\u{1f33e}",
        advice: "Complex carbs: steady energy for the whole day",
        good_advice: "Energy secured!",
    },
    ProductCategory {
        key: "nuts",
        keywords: &[
            "nut", "almond", "walnut", "hazelnut", "cashew", "pistachio", "peanut",
            "pecan", "macadamia", "seed", "chia", "flax",
        ],
        icon: "\u{1f95c}",
        advice: "Nuts bring healthy fats and protein. A handful a day",
        good_advice: "Healthy fats, check",
    },
    ProductCategory {
        key: "eggs",
        keywords: &["egg", "omelet", "scramble"],
        icon: "\u{1f95a}",
        advice: "Eggs are the reference protein. 2-3 a day is fine",
        good_advice: "Reference protein!",
    },
];

/// Categories whose advice is boosted under high crash risk.
pub const CRASH_PREVENTION_CATEGORIES: &[AdviceCategory] = &[
    AdviceCategory::Emotional,
    AdviceCategory::Nutrition,
    AdviceCategory::Sleep,
];

/// Specific ids boosted under high crash risk regardless of category.
pub const CRASH_PREVENTION_IDS: &[&str] = &[
    "crash_support",
    "stress_support",
    "sleep_hunger_correlation",
    "undereating_warning",
    "evening_undereating",
    "chronic_undereating_pattern",
];

/// Expected share of the daily calorie budget by hour, for the day forecast.
pub const EXPECTED_KCAL_BY_HOUR: &[(u32, f64)] =
    &[(9, 0.25), (12, 0.45), (15, 0.60), (18, 0.75), (21, 0.90)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_window_semantics() {
        assert!(!not_after(12).allows(12));
        assert!(not_after(12).allows(11));
        assert!(!not_before(18).allows(17));
        assert!(not_before(18).allows(18));
        let w = between(11, 15);
        assert!(w.allows(11));
        assert!(w.allows(14));
        assert!(!w.allows(15));
        assert!(!w.allows(10));
    }

    #[test]
    fn post_training_protein_sits_in_two_groups() {
        // Deliberate overlap carried over from the shipped tables; the dedup
        // pass must tolerate membership in multiple groups.
        let groups: Vec<&str> = DEDUP_GROUPS
            .iter()
            .filter(|(_, members)| members.contains(&"post_training_protein"))
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(groups, vec!["protein", "training"]);
    }

    #[test]
    fn chain_lookup() {
        let link = chain_link_for("protein_low").unwrap();
        assert_eq!(link.next, "protein_sources");
        assert_eq!(link.delay_minutes, 30);
        assert!(chain_link_for("unknown").is_none());
    }
}
