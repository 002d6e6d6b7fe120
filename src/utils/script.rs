//! Arabic script detection.
//!
//! This is a code-point range check, not a language identifier: a single
//! Arabic character anywhere in the text is enough to classify it as Arabic.

use std::ops::RangeInclusive;

/// The Arabic Unicode block (U+0600 to U+06FF).
pub const ARABIC_BLOCK: RangeInclusive<char> = '\u{0600}'..='\u{06FF}';

/// Returns true if any character in `text` falls within the Arabic block.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| ARABIC_BLOCK.contains(&c))
}
