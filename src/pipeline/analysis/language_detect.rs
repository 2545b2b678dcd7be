//! Lightweight script detection for completions.
//!
//! Providers sometimes answer a Tamil prompt in English. Counting Tamil
//! letters against Latin letters is enough to tell the two apart.

use crate::models::Language;

/// Below this many letters there is no usable signal.
const MIN_LETTERS: usize = 20;

/// Share of Tamil letters above which text counts as Tamil.
const TAMIL_RATIO_THRESHOLD: f64 = 0.3;

/// Detect which of the supported languages `text` is written in.
///
/// Returns `None` when the text is too short or carries no letters.
pub fn detect_language(text: &str) -> Option<Language> {
    let (tamil, latin) = count_letters(text);
    let total = tamil + latin;
    if total < MIN_LETTERS {
        return None;
    }

    if tamil as f64 / total as f64 >= TAMIL_RATIO_THRESHOLD {
        Some(Language::Tamil)
    } else {
        Some(Language::English)
    }
}

/// Count Tamil-block characters and ASCII letters.
fn count_letters(text: &str) -> (usize, usize) {
    text.chars().fold((0, 0), |(tamil, latin), ch| match ch {
        '\u{0B80}'..='\u{0BFF}' => (tamil + 1, latin),
        c if c.is_ascii_alphabetic() => (tamil, latin + 1),
        _ => (tamil, latin),
    })
}
