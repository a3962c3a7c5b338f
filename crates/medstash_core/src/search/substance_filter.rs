//! Substance autocomplete helpers for the add-medication form.

use crate::model::substance::Substance;
use crate::search::text_match::match_text;
use crate::search::name_order;

/// Returns substances ordered by name, keeping only those matching `query`.
///
/// A blank query returns every substance.
pub fn filter_substances<'a>(substances: &'a [Substance], query: &str) -> Vec<&'a Substance> {
    let mut sorted: Vec<&Substance> = substances.iter().collect();
    sorted.sort_by(|a, b| name_order(&a.name, &b.name));

    if query.trim().is_empty() {
        return sorted;
    }

    sorted
        .into_iter()
        .filter(|substance| match_text(&substance.name, query).is_some())
        .collect()
}

/// Returns whether the "add new substance" option should be offered.
///
/// False for blank queries and when a substance with the same trimmed name
/// already exists (case-insensitive).
pub fn should_show_add_option(substances: &[Substance], query: &str) -> bool {
    let wanted = query.trim().to_lowercase();
    if wanted.is_empty() {
        return false;
    }
    !substances
        .iter()
        .any(|substance| substance.name.trim().to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::{filter_substances, should_show_add_option};
    use crate::model::substance::Substance;

    fn substances() -> Vec<Substance> {
        vec![
            Substance::new(1, "Paracetamol"),
            Substance::new(2, "Ibuprofen"),
            Substance::new(3, "Aspirină"),
        ]
    }

    fn names<'a>(found: &[&'a Substance]) -> Vec<&'a str> {
        found.iter().map(|substance| substance.name.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_all_sorted_by_name() {
        let all = substances();
        assert_eq!(
            names(&filter_substances(&all, "")),
            vec!["Aspirină", "Ibuprofen", "Paracetamol"]
        );
    }

    #[test]
    fn filters_by_case_insensitive_substring() {
        let all = substances();
        assert_eq!(names(&filter_substances(&all, "par")), vec!["Paracetamol"]);
        assert_eq!(filter_substances(&all, "IBU").len(), 1);
        assert_eq!(filter_substances(&all, "mol").len(), 1);
        assert_eq!(filter_substances(&all, "fen").len(), 1);
        assert!(filter_substances(&all, "xyz").is_empty());
    }

    #[test]
    fn plain_query_finds_accented_substance() {
        let all = substances();
        assert_eq!(names(&filter_substances(&all, "aspirina")), vec!["Aspirină"]);
    }

    #[test]
    fn add_option_hidden_for_blank_or_exact_names() {
        let all = substances();
        assert!(!should_show_add_option(&all, ""));
        assert!(!should_show_add_option(&all, "   "));
        assert!(!should_show_add_option(&all, "Paracetamol"));
        assert!(!should_show_add_option(&all, "PARACETAMOL"));
        assert!(!should_show_add_option(&all, " paracetamol "));
    }

    #[test]
    fn add_option_shown_for_partial_or_new_names() {
        let all = substances();
        assert!(should_show_add_option(&all, "Para"));
        assert!(should_show_add_option(&all, "Ibu"));
        assert!(should_show_add_option(&all, "New Substance"));
    }
}
