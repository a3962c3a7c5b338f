//! Diacritic-aware substring matcher used for search and highlighting.
//!
//! # Responsibility
//! - Locate the first occurrence of a query inside a text.
//! - Report the hit as character spans over the original, unfolded text.
//!
//! # Invariants
//! - A blank query never matches.
//! - Comparison is case-insensitive in both directions.
//! - A query without combining marks matches accented text ("a" finds "ă");
//!   a query with combining marks must match them exactly.
//! - Span offsets count Unicode scalar values of the original text, never
//!   bytes.

use serde::Serialize;
use unicode_normalization::char::decompose_canonical;
use unicode_normalization::UnicodeNormalization;

/// Half-open character range `[start, start + length)` into a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub length: usize,
}

impl MatchSpan {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Successful match with at least one span, ordered by `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMatch {
    pub spans: Vec<MatchSpan>,
}

/// `None` when the query does not occur (or is blank).
pub type MatchResult = Option<TextMatch>;

/// Piece of a text split for rendering, see [`highlight_segments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Finds `query` in `text` under case and diacritic folding.
///
/// Returns at most one span, positioned at the first occurrence.
pub fn match_text(text: &str, query: &str) -> MatchResult {
    if query.trim().is_empty() {
        return None;
    }

    let keep_marks = has_diacritics(query);
    let needle = fold_chars(query, keep_marks).chars;
    if needle.is_empty() {
        return None;
    }

    let haystack = fold_chars(text, keep_marks);
    let position = haystack
        .chars
        .windows(needle.len())
        .enumerate()
        .find(|(at, window)| {
            *window == needle.as_slice()
                && (!keep_marks || ends_on_cluster_boundary(&haystack.chars, at + needle.len()))
        })
        .map(|(at, _)| at)?;

    let start = haystack.origin[position];
    let last = position + needle.len() - 1;
    // Stretch over marks stripped after the last matched character so a
    // highlight never splits a base letter from its accent.
    let next_kept = haystack
        .origin
        .get(last + 1)
        .copied()
        .unwrap_or(haystack.char_count);
    let end = next_kept.max(haystack.origin[last] + 1);
    Some(TextMatch {
        spans: vec![MatchSpan {
            start,
            length: end - start,
        }],
    })
}

/// Returns whether `query`, once decomposed, carries combining diacritical
/// marks (U+0300..=U+036F).
pub fn has_diacritics(query: &str) -> bool {
    query.nfd().any(is_combining_diacritic)
}

/// Lower-cases `text` and strips combining diacritical marks.
///
/// Used as the primary key for name ordering.
pub fn fold(text: &str) -> String {
    fold_chars(text, false).chars.into_iter().collect()
}

/// Splits `text` into plain and highlighted runs according to `result`.
///
/// Spans that fall outside the text are clamped; `None` yields one plain run.
pub fn highlight_segments<'a>(
    text: &'a str,
    result: &MatchResult,
) -> Vec<HighlightSegment<'a>> {
    let Some(found) = result else {
        return vec![HighlightSegment {
            text,
            highlighted: false,
        }];
    };

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;
    let byte_at = |index: usize| boundaries[index.min(char_count)];

    let mut segments = Vec::new();
    let mut last_end = 0;
    for span in &found.spans {
        let start = span.start.min(char_count);
        let end = span.end().min(char_count);
        if start < last_end || start == end {
            continue;
        }
        if start > last_end {
            segments.push(HighlightSegment {
                text: &text[byte_at(last_end)..byte_at(start)],
                highlighted: false,
            });
        }
        segments.push(HighlightSegment {
            text: &text[byte_at(start)..byte_at(end)],
            highlighted: true,
        });
        last_end = end;
    }
    if last_end < char_count {
        segments.push(HighlightSegment {
            text: &text[byte_at(last_end)..],
            highlighted: false,
        });
    }
    segments
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// A match that keeps marks must not stop between a base letter and its
/// accent: "a" is not "ă".
fn ends_on_cluster_boundary(chars: &[char], end: usize) -> bool {
    !matches!(chars.get(end), Some(next) if is_combining_diacritic(*next))
}

struct Folded {
    chars: Vec<char>,
    /// Original character index for every folded character.
    origin: Vec<usize>,
    /// Character count of the original text.
    char_count: usize,
}

fn fold_chars(text: &str, keep_marks: bool) -> Folded {
    let mut chars = Vec::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    let mut char_count = 0;

    for (index, original) in text.chars().enumerate() {
        char_count = index + 1;
        for lower in original.to_lowercase() {
            decompose_canonical(lower, |c| {
                if keep_marks || !is_combining_diacritic(c) {
                    chars.push(c);
                    origin.push(index);
                }
            });
        }
    }

    Folded {
        chars,
        origin,
        char_count,
    }
}
