// ABOUTME: Deterministic text-variant selection and placeholder substitution
// ABOUTME: FNV-1a over date+id keeps the variant stable all day and rotating across days
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Personalizer
//!
//! Variant selection is deliberately not random: [`pick_variant`] hashes the
//! seed string (by contract, ISO date + advice id) with 64-bit FNV-1a and
//! indexes the variant pool with the hash modulo pool length. The same advice
//! therefore shows the same wording for the whole day and can rotate the next
//! day. The function is pure and its hash is a stable contract; tests may pin
//! exact selections for fixed dates.

use crate::catalog::{MoodTone, MOOD_TONE_HIGH, MOOD_TONE_LOW};
use chrono::NaiveDate;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the seed bytes.
#[must_use]
pub fn fnv1a(seed: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in seed.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Pick one variant deterministically: `variants[fnv1a(seed) % len]`.
/// Returns `None` for an empty pool.
#[must_use]
pub fn pick_variant<'a>(seed: &str, variants: &'a [&'a str]) -> Option<&'a str> {
    if variants.is_empty() {
        return None;
    }
    let index = (fnv1a(seed) % variants.len() as u64) as usize;
    Some(variants[index])
}

/// Build the canonical variant seed for an advice on a given date.
#[must_use]
pub fn variant_seed(date: NaiveDate, advice_id: &str) -> String {
    format!("{}{advice_id}", date.format("%Y-%m-%d"))
}

/// Substitute `${firstName}` placeholders. With a name present the
/// placeholder is replaced verbatim; with no name the placeholder and its
/// adjacent comma/space punctuation collapse so "Great job, ${firstName}!"
/// degrades to "Great job!".
#[must_use]
pub fn personalize_text(text: &str, first_name: Option<&str>) -> String {
    const PLACEHOLDER: &str = "${firstName}";
    if !text.contains(PLACEHOLDER) {
        return text.to_owned();
    }
    match first_name {
        Some(name) if !name.trim().is_empty() => text.replace(PLACEHOLDER, name.trim()),
        _ => {
            let collapsed = text
                .replace(&format!(", {PLACEHOLDER}"), "")
                .replace(&format!("{PLACEHOLDER}, "), "")
                .replace(&format!(" {PLACEHOLDER}"), "")
                .replace(PLACEHOLDER, "");
            collapsed.replace("  ", " ").trim().to_owned()
        }
    }
}

/// Mood bucket → tone table. Neutral mood (or no mood data) applies no tone.
#[must_use]
pub fn tone_for_mood(avg_mood: Option<f64>) -> Option<&'static MoodTone> {
    let mood = avg_mood?;
    if mood <= 0.0 {
        return None;
    }
    if mood < 3.0 {
        Some(&MOOD_TONE_LOW)
    } else if mood >= 4.0 {
        Some(&MOOD_TONE_HIGH)
    } else {
        None
    }
}

/// Wrap a text in the mood tone's prefix/suffix, both picked
/// deterministically from the same seed namespace as the variants.
#[must_use]
pub fn adapt_text_to_mood(
    text: &str,
    avg_mood: Option<f64>,
    date: NaiveDate,
    advice_id: &str,
) -> String {
    let Some(tone) = tone_for_mood(avg_mood) else {
        return text.to_owned();
    };
    let seed = format!("{}mood", variant_seed(date, advice_id));
    let prefix = pick_variant(&seed, tone.prefixes).unwrap_or("");
    let suffix = pick_variant(&format!("{seed}sfx"), tone.suffixes).unwrap_or("");
    format!("{prefix}{text}{suffix}")
}

/// Time-of-day period used by the time-based text tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    /// Before 12:00
    Morning,
    /// 12:00-17:59
    Afternoon,
    /// 18:00 onward
    Evening,
}

impl TimePeriod {
    /// Classify an hour of day.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }
}

/// Time-adapted variant pool for an advice id, when the catalog has one.
#[must_use]
pub fn time_based_variants(advice_id: &str, hour: u32) -> Option<&'static [&'static str]> {
    let table = crate::catalog::time_based_texts(advice_id)?;
    Some(match TimePeriod::from_hour(hour) {
        TimePeriod::Morning => table.morning,
        TimePeriod::Afternoon => table.afternoon,
        TimePeriod::Evening => table.evening,
    })
}
