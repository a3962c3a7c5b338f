//! Per-medication match projection.
//!
//! # Responsibility
//! - Apply [`match_text`] to one medication's name and each resolved
//!   substance name for a given query.
//! - Separate "matches at all" from "matched through a substance" so the list
//!   can reveal substance details on substance-only hits.
//!
//! # Invariants
//! - Instances are immutable; build a fresh one whenever the query or the
//!   resolved substances change.
//! - A blank query never matches anything.

use crate::model::medication::Medication;
use crate::model::substance::{ResolvedSubstance, Substance};
use crate::search::text_match::{match_text, MatchResult};
use log::debug;

/// Resolved substance paired with its own match result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstanceWithHighlights {
    pub name: String,
    pub concentration: Option<String>,
    pub match_result: MatchResult,
}

/// Match state for one medication under one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationMatcher {
    name_match: MatchResult,
    substances: Vec<SubstanceWithHighlights>,
}

impl MedicationMatcher {
    /// Builds a matcher from an already resolved substance list.
    pub fn new(name: &str, substances: &[ResolvedSubstance], query: &str) -> Self {
        let substances = substances
            .iter()
            .map(|substance| SubstanceWithHighlights {
                name: substance.name.clone(),
                concentration: substance.concentration.clone(),
                match_result: match_text(&substance.name, query),
            })
            .collect();

        Self {
            name_match: match_text(name, query),
            substances,
        }
    }

    /// Resolves `medication`'s links against `substances` and builds a matcher.
    ///
    /// Unresolvable substance ids are left out instead of failing.
    pub fn for_medication(medication: &Medication, substances: &[Substance], query: &str) -> Self {
        let resolved = medication.resolve_substances(substances);
        let dropped = medication.substances.len() - resolved.len();
        if dropped > 0 {
            debug!(
                "event=substance_unresolved module=search status=skipped medication_id={} dropped={}",
                medication.id, dropped
            );
        }
        Self::new(&medication.name, &resolved, query)
    }

    /// True when the name or any substance name matches.
    pub fn matches(&self) -> bool {
        self.name_match.is_some() || self.has_substance_match()
    }

    /// True when at least one substance name matches, regardless of the name.
    pub fn has_substance_match(&self) -> bool {
        self.substances
            .iter()
            .any(|substance| substance.match_result.is_some())
    }

    /// Match result for the medication name itself.
    pub fn name_match(&self) -> &MatchResult {
        &self.name_match
    }

    /// Every input substance, in input order, with its own match result.
    pub fn substances_with_highlights(&self) -> &[SubstanceWithHighlights] {
        &self.substances
    }
}

#[cfg(test)]
mod tests {
    use super::MedicationMatcher;
    use crate::model::medication::{Medication, Presentation, YearMonth};
    use crate::model::substance::{ResolvedSubstance, Substance};
    use crate::search::text_match::{MatchSpan, TextMatch};

    fn paracetamol() -> Vec<ResolvedSubstance> {
        vec![ResolvedSubstance::new("Paracetamol", Some("500mg"))]
    }

    #[test]
    fn matches_on_name() {
        let matcher = MedicationMatcher::new("Parasinus", &[], "sinus");
        assert!(matcher.matches());
        assert!(!matcher.has_substance_match());
    }

    #[test]
    fn matches_on_substance() {
        let matcher = MedicationMatcher::new("Parasinus", &paracetamol(), "ceta");
        assert!(matcher.matches());
        assert!(matcher.has_substance_match());
        assert!(matcher.name_match().is_none());
    }

    #[test]
    fn no_match_when_nothing_contains_query() {
        let matcher = MedicationMatcher::new("Parasinus", &paracetamol(), "ibuprofen");
        assert!(!matcher.matches());
        assert!(!matcher.has_substance_match());
    }

    #[test]
    fn blank_query_matches_nothing() {
        for query in ["", "  "] {
            let matcher = MedicationMatcher::new("Parasinus", &paracetamol(), query);
            assert!(!matcher.matches());
            assert!(matcher
                .substances_with_highlights()
                .iter()
                .all(|substance| substance.match_result.is_none()));
        }
    }

    #[test]
    fn name_only_match_leaves_substances_unhighlighted() {
        let matcher = MedicationMatcher::new("Parasinus", &paracetamol(), "sinus");
        let substances = matcher.substances_with_highlights();
        assert_eq!(substances.len(), 1);
        assert!(substances[0].match_result.is_none());
    }

    #[test]
    fn substances_are_highlighted_independently_in_input_order() {
        let substances = vec![
            ResolvedSubstance::new("Paracetamol", Some("500mg")),
            ResolvedSubstance::new("Cafeină", Some("65mg")),
        ];
        let matcher = MedicationMatcher::new("Parasinus", &substances, "ceta");
        let highlighted = matcher.substances_with_highlights();

        assert_eq!(highlighted.len(), 2);
        assert_eq!(highlighted[0].name, "Paracetamol");
        assert_eq!(highlighted[0].concentration.as_deref(), Some("500mg"));
        assert_eq!(
            highlighted[0].match_result,
            Some(TextMatch {
                spans: vec![MatchSpan {
                    start: 4,
                    length: 4
                }]
            })
        );
        assert_eq!(highlighted[1].name, "Cafeină");
        assert!(highlighted[1].match_result.is_none());
    }

    #[test]
    fn identical_inputs_build_identical_matchers() {
        let first = MedicationMatcher::new("Parasinus", &paracetamol(), "para");
        let second = MedicationMatcher::new("Parasinus", &paracetamol(), "para");
        assert_eq!(first, second);
        assert_eq!(first.matches(), second.matches());
        assert_eq!(first.has_substance_match(), second.has_substance_match());
        assert_eq!(
            first.substances_with_highlights(),
            second.substances_with_highlights()
        );
    }

    #[test]
    fn for_medication_resolves_links_and_skips_unknown_ids() {
        let medication = Medication::new(1, "Advil", Presentation::Pill, YearMonth::new(2025, 8))
            .with_substance(42, None)
            .with_substance(1, Some("200mg"));
        let substances = vec![Substance::new(1, "Ibuprofen")];

        let matcher = MedicationMatcher::for_medication(&medication, &substances, "ibu");
        assert!(matcher.matches());
        assert!(matcher.has_substance_match());
        assert_eq!(matcher.substances_with_highlights().len(), 1);
        assert_eq!(
            matcher.substances_with_highlights()[0].concentration.as_deref(),
            Some("200mg")
        );
    }
}
