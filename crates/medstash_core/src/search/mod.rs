//! In-memory search over medications and substances.
//!
//! # Responsibility
//! - Provide the diacritic-aware text matcher used for filtering and
//!   highlighting.
//! - Project match state per medication for list rendering.
//! - Keep name ordering consistent between the list and autocomplete.
//!
//! # Invariants
//! - Matching is substring-only: no ranking, no typo tolerance.

use std::cmp::Ordering;

pub mod medication_matcher;
pub mod substance_filter;
pub mod text_match;

/// Orders names alphabetically, ignoring case and diacritics first.
///
/// Names that fold to the same key fall back to lower-case comparison, then
/// to lower case before upper case, so `Equal` is only returned for identical
/// strings.
pub fn name_order(a: &str, b: &str) -> Ordering {
    text_match::fold(a)
        .cmp(&text_match::fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}
