// ReportScope - core/search.rs
//
// Case-insensitive substring search over row labels or log messages, with
// cyclic next/previous navigation through the matches.

use crate::core::projection::ReportRow;
use crate::core::tree::ReportTree;

/// Direction for result navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Previous,
}

/// Indices (ascending) of the labels containing `term`, ignoring case.
/// An empty term matches nothing.
pub fn search_labels<'a, I>(term: &str, labels: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    labels
        .into_iter()
        .enumerate()
        .filter(|(_, label)| label.to_lowercase().contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Indices of projected rows whose label contains `term`.
pub fn search(term: &str, rows: &[ReportRow]) -> Vec<usize> {
    search_labels(term, rows.iter().map(|row| row.label.as_str()))
}

/// Ids of every tree node (expanded or not) whose message contains `term`,
/// in pre-order.
pub fn matching_node_ids(tree: &ReportTree, term: &str) -> Vec<String> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    tree.pre_order()
        .filter(|visit| visit.node.message.to_lowercase().contains(&needle))
        .map(|visit| visit.node.id.clone())
        .collect()
}

/// Cyclic step through `result_count` results.
///
/// `None` as `current` starts at the first (next) or last (previous)
/// result. Returns `None` when there are no results.
pub fn navigate(
    direction: SearchDirection,
    result_count: usize,
    current: Option<usize>,
) -> Option<usize> {
    if result_count == 0 {
        return None;
    }
    let next = match (direction, current) {
        (SearchDirection::Next, None) => 0,
        (SearchDirection::Previous, None) => result_count - 1,
        (SearchDirection::Next, Some(idx)) => (idx + 1) % result_count,
        (SearchDirection::Previous, Some(idx)) => (idx + result_count - 1) % result_count,
    };
    Some(next)
}

// =============================================================================
// Search state
// =============================================================================

/// Term, ordered matches and the cursor into them.
///
/// `current` is always `None` or a valid index into `results`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: String,
    results: Vec<usize>,
    current: Option<usize>,
}

impl SearchState {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> &[usize] {
        &self.results
    }

    /// Cursor into `results`.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Row (or log) index of the current match.
    pub fn current_target(&self) -> Option<usize> {
        self.current.and_then(|idx| self.results.get(idx).copied())
    }

    pub fn is_match(&self, target: usize) -> bool {
        self.results.binary_search(&target).is_ok()
    }

    /// Store fresh results for `term` and put the cursor on the first match.
    pub fn set_results(&mut self, term: impl Into<String>, results: Vec<usize>) {
        self.term = term.into();
        self.current = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    /// Drop results but keep the term (e.g. after the row list changed shape).
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.current = None;
    }

    pub fn clear(&mut self) {
        self.term.clear();
        self.clear_results();
    }

    pub fn step(&mut self, direction: SearchDirection) -> Option<usize> {
        self.current = navigate(direction, self.results.len(), self.current);
        self.current_target()
    }

    /// "current/total" for the search bar, e.g. "2/5"; "0/0" with no match.
    pub fn position_label(&self) -> String {
        let position = self.current.map_or(0, |idx| idx + 1);
        format!("{position}/{}", self.results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_case_insensitive_substring() {
        let labels = ["Errors", "Warnings", "Terror"];
        assert_eq!(search_labels("err", labels), vec![0, 2]);
    }

    #[test]
    fn test_empty_term_matches_nothing() {
        assert!(search_labels("", ["a", "b"]).is_empty());
    }

    #[test]
    fn test_navigate_wraps_both_ways() {
        assert_eq!(navigate(SearchDirection::Next, 3, Some(2)), Some(0));
        assert_eq!(navigate(SearchDirection::Previous, 3, Some(0)), Some(2));
        assert_eq!(navigate(SearchDirection::Next, 3, Some(0)), Some(1));
        assert_eq!(navigate(SearchDirection::Previous, 3, Some(2)), Some(1));
    }

    #[test]
    fn test_navigate_without_results_is_none() {
        assert_eq!(navigate(SearchDirection::Next, 0, None), None);
        assert_eq!(navigate(SearchDirection::Previous, 0, Some(4)), None);
    }

    #[test]
    fn test_navigate_from_no_cursor() {
        assert_eq!(navigate(SearchDirection::Next, 4, None), Some(0));
        assert_eq!(navigate(SearchDirection::Previous, 4, None), Some(3));
    }

    #[test]
    fn test_search_state_cursor_stays_in_range() {
        let mut state = SearchState::default();
        state.set_results("err", vec![1, 4, 9]);
        assert_eq!(state.current_target(), Some(1));
        assert_eq!(state.step(SearchDirection::Previous), Some(9));
        assert_eq!(state.step(SearchDirection::Next), Some(1));
        assert_eq!(state.position_label(), "1/3");
        assert!(state.is_match(4));
        assert!(!state.is_match(5));

        state.clear_results();
        assert_eq!(state.term(), "err");
        assert_eq!(state.current(), None);
        assert_eq!(state.step(SearchDirection::Next), None);
        assert_eq!(state.position_label(), "0/0");

        state.clear();
        assert_eq!(state.term(), "");
    }
}
