// ReportScope - app/state.rs
//
// Viewer state for one loaded report. Owns the mapped tree, its id index,
// navigation, the projected rows, both searches, the severity/text filters,
// the displayed logs and the fetch coordinator. Owned by the eframe::App
// implementation (or any embedder) and advanced with `tick` once per frame.
//
// Every user action is one method here and runs to completion; background
// work only re-enters through `tick`.

use crate::app::debounce::Debouncer;
use crate::app::fetch::{FetchEvent, LogFetchCoordinator, RefreshOutcome};
use crate::app::navigation::{HighlightState, NavigationState};
use crate::app::source::{LogSource, PayloadLogSource};
use crate::core::filter::SeverityChecklist;
use crate::core::model::Log;
use crate::core::projection::{project, ReportRow, ScrollLock};
use crate::core::report::Report;
use crate::core::search::{matching_node_ids, search, search_labels, SearchDirection, SearchState};
use crate::core::severity::SeverityName;
use crate::core::tree::{map_report_to_tree, ReportIndex, ReportKind, ReportTree};
use crate::util::constants::{DEFAULT_REPORT_TYPE, DEFAULT_SEARCH_DEBOUNCE_MS, MAX_NOTIFICATIONS};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// Settings
// =============================================================================

/// What happens when the already-selected report is clicked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReselectPolicy {
    /// Nothing: filters and highlight are kept.
    #[default]
    OnChange,
    /// Filters are reset and logs refetched on every click.
    Always,
}

/// What happens to the displayed logs when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    #[default]
    KeepPrevious,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSettings {
    pub search_debounce: Duration,
    pub reselect_policy: ReselectPolicy,
    pub fetch_failure: FetchFailurePolicy,
    /// Routes persisted filters; "study", "security", ...
    pub report_type: String,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            reselect_policy: ReselectPolicy::default(),
            fetch_failure: FetchFailurePolicy::default(),
            report_type: DEFAULT_REPORT_TYPE.to_string(),
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Sent to the embedder whenever the selected report changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub kind: ReportKind,
    pub id: String,
}

pub type SelectionListener = Box<dyn FnMut(&SelectionChange)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

// =============================================================================
// Viewer
// =============================================================================

pub struct ReportViewer {
    settings: ViewerSettings,

    tree: ReportTree,
    index: ReportIndex,
    navigation: NavigationState,
    rows: Vec<ReportRow>,
    tree_scroll: ScrollLock,

    tree_query: String,
    tree_search: SearchState,
    tree_search_input: Debouncer<String>,

    available: Vec<SeverityName>,
    checklist: SeverityChecklist,
    filter_dirty: bool,
    text_query: String,
    text_filter: String,
    text_filter_input: Debouncer<String>,

    logs: Vec<Log>,
    fetcher: LogFetchCoordinator,

    log_query: String,
    log_search: SearchState,
    log_search_input: Debouncer<String>,
    log_scroll: Option<usize>,

    notifications: VecDeque<Notification>,
    selection_listener: Option<SelectionListener>,
}

impl fmt::Debug for ReportViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportViewer")
            .field("root", &self.tree.id)
            .field("nodes", &self.index.len())
            .field("selected", &self.navigation.selected())
            .field("rows", &self.rows.len())
            .field("logs", &self.logs.len())
            .field("loading", &self.fetcher.is_loading())
            .finish()
    }
}

impl ReportViewer {
    /// Viewer over `report`, serving logs from the report's own leaves.
    pub fn from_report(
        report: &Report,
        settings: ViewerSettings,
        saved_filter: Option<&[SeverityName]>,
    ) -> Self {
        let tree = map_report_to_tree(report);
        let source = Arc::new(PayloadLogSource::new(report, &tree));
        Self::with_tree(tree, report.all_severities(), source, settings, saved_filter)
    }

    /// Viewer over `report` with logs from an external `source`.
    pub fn new(
        report: &Report,
        source: Arc<dyn LogSource>,
        settings: ViewerSettings,
        saved_filter: Option<&[SeverityName]>,
    ) -> Self {
        let tree = map_report_to_tree(report);
        Self::with_tree(tree, report.all_severities(), source, settings, saved_filter)
    }

    /// Viewer over a tree already mapped from `report`.
    ///
    /// Use this when `source` is keyed by the same tree, so generated ids
    /// agree between the two.
    pub fn from_tree(
        report: &Report,
        tree: ReportTree,
        source: Arc<dyn LogSource>,
        settings: ViewerSettings,
        saved_filter: Option<&[SeverityName]>,
    ) -> Self {
        Self::with_tree(tree, report.all_severities(), source, settings, saved_filter)
    }

    fn with_tree(
        tree: ReportTree,
        available: Vec<SeverityName>,
        source: Arc<dyn LogSource>,
        settings: ViewerSettings,
        saved_filter: Option<&[SeverityName]>,
    ) -> Self {
        let index = ReportIndex::build(&tree);
        let navigation = NavigationState::new(&tree.id);
        let checklist = match saved_filter {
            Some(saved) => SeverityChecklist::from_saved(&available, saved),
            None => SeverityChecklist::defaults(&available),
        };
        let delay = settings.search_debounce;

        tracing::info!(
            root = %tree.id,
            nodes = index.len(),
            severities = available.len(),
            report_type = %settings.report_type,
            restored_filter = saved_filter.is_some(),
            "Report viewer created"
        );

        let mut viewer = Self {
            settings,
            tree,
            index,
            navigation,
            rows: Vec::new(),
            tree_scroll: ScrollLock::default(),
            tree_query: String::new(),
            tree_search: SearchState::default(),
            tree_search_input: Debouncer::new(delay),
            available,
            checklist,
            filter_dirty: false,
            text_query: String::new(),
            text_filter: String::new(),
            text_filter_input: Debouncer::new(delay),
            logs: Vec::new(),
            fetcher: LogFetchCoordinator::new(source),
            log_query: String::new(),
            log_search: SearchState::default(),
            log_search_input: Debouncer::new(delay),
            log_scroll: None,
            notifications: VecDeque::new(),
            selection_listener: None,
        };
        viewer.reproject();
        viewer.refresh_logs();
        viewer
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn tree(&self) -> &ReportTree {
        &self.tree
    }

    pub fn index(&self) -> &ReportIndex {
        &self.index
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn selected(&self) -> &str {
        self.navigation.selected()
    }

    pub fn selected_kind(&self) -> ReportKind {
        self.index
            .kind_of(self.navigation.selected())
            .unwrap_or_default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.navigation.is_expanded(id)
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.navigation.highlighted()
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.navigation.highlight().is_highlighted(id)
    }

    /// For subscribing to highlight changes.
    pub fn highlight_mut(&mut self) -> &mut HighlightState {
        self.navigation.highlight_mut()
    }

    pub fn tree_query(&self) -> &str {
        &self.tree_query
    }

    pub fn tree_search(&self) -> &SearchState {
        &self.tree_search
    }

    pub fn checklist(&self) -> &SeverityChecklist {
        &self.checklist
    }

    pub fn text_query(&self) -> &str {
        &self.text_query
    }

    /// The text filter currently applied to the logs (after debounce).
    pub fn text_filter(&self) -> &str {
        &self.text_filter
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.is_loading()
    }

    pub fn log_query(&self) -> &str {
        &self.log_query
    }

    pub fn log_search(&self) -> &SearchState {
        &self.log_search
    }

    pub fn notifications(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    pub fn set_selection_listener(&mut self, listener: SelectionListener) {
        self.selection_listener = Some(listener);
    }

    // -------------------------------------------------------------------------
    // Tree navigation
    // -------------------------------------------------------------------------

    /// Label click. Returns true if the selection changed.
    pub fn select_report(&mut self, id: &str) -> bool {
        if id == self.navigation.selected() {
            if self.settings.reselect_policy == ReselectPolicy::Always {
                tracing::debug!(id, "Report re-selected; resetting filters");
                self.reset_filter_context();
                self.refresh_logs();
            }
            return false;
        }
        if !self.navigation.select(id, &self.index) {
            tracing::debug!(id, "Selection ignored; id not in tree");
            return false;
        }

        self.reset_filter_context();
        self.clear_tree_search();
        self.reproject();

        let change = SelectionChange {
            kind: self.selected_kind(),
            id: id.to_string(),
        };
        if let Some(listener) = self.selection_listener.as_mut() {
            listener(&change);
        }
        self.refresh_logs();
        true
    }

    pub fn expand(&mut self, id: &str) -> bool {
        let changed = self.navigation.expand(id);
        if changed {
            self.on_shape_change();
        }
        changed
    }

    pub fn collapse(&mut self, id: &str) -> bool {
        let changed = self.navigation.collapse(id);
        if changed {
            self.on_shape_change();
        }
        changed
    }

    /// Expand/collapse affordance click. Returns the new expanded state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let expanded = self.navigation.toggle(id);
        self.on_shape_change();
        expanded
    }

    /// Log row click: reveal the node the log belongs to and scroll the
    /// tree to it once. The selection is not changed.
    pub fn on_log_row_clicked(&mut self, log_index: usize) -> bool {
        let target = self
            .logs
            .get(log_index)
            .and_then(|log| log.parent_id.clone());
        let before = self.navigation.expanded().len();
        if !self
            .navigation
            .reveal_and_highlight(target.as_deref(), &self.index)
        {
            return false;
        }
        if self.navigation.expanded().len() != before {
            self.on_shape_change();
        } else {
            self.reproject();
        }
        if let Some(target) = target {
            self.tree_scroll.arm(target);
        }
        true
    }

    /// Row index the tree panel should scroll to, delivered once.
    pub fn take_tree_scroll_target(&mut self) -> Option<usize> {
        self.tree_scroll.take(&self.rows)
    }

    // -------------------------------------------------------------------------
    // Tree search
    // -------------------------------------------------------------------------

    /// Search box edit. An empty term clears immediately; anything else is
    /// debounced.
    pub fn set_tree_search_term(&mut self, term: &str, now: Instant) {
        self.tree_query = term.to_string();
        if term.is_empty() {
            self.clear_tree_search();
        } else {
            self.tree_search_input.call(term.to_string(), now);
        }
    }

    /// Run the tree search now (Enter key, or debounce expiry).
    pub fn run_tree_search(&mut self) {
        self.tree_search_input.cancel();
        let term = self.tree_query.clone();
        if term.is_empty() {
            self.tree_search.clear();
            return;
        }

        // Results index the projected rows, so matches hidden under
        // collapsed nodes must be revealed first.
        let matches = matching_node_ids(&self.tree, &term);
        let expanded = self
            .navigation
            .expand_ancestors(matches.iter().map(String::as_str), &self.index);
        if expanded > 0 {
            self.reproject();
        }

        let results = search(&term, &self.rows);
        tracing::debug!(term = %term, matches = results.len(), expanded, "Tree search");
        self.tree_search.set_results(term, results);
        self.arm_tree_search_target();
    }

    /// Next/previous button. Re-runs the search if the results were
    /// invalidated by an expand or collapse.
    pub fn step_tree_search(&mut self, direction: SearchDirection) -> Option<usize> {
        if self.tree_search.results().is_empty() && !self.tree_query.is_empty() {
            self.run_tree_search();
            return self.tree_search.current_target();
        }
        let target = self.tree_search.step(direction);
        self.arm_tree_search_target();
        target
    }

    fn arm_tree_search_target(&mut self) {
        if let Some(row) = self
            .tree_search
            .current_target()
            .and_then(|idx| self.rows.get(idx))
        {
            self.tree_scroll.arm(row.id.clone());
        }
    }

    fn clear_tree_search(&mut self) {
        self.tree_query.clear();
        self.tree_search.clear();
        self.tree_search_input.cancel();
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Checklist click. Refetches immediately when the state changed.
    pub fn set_severity(&mut self, name: SeverityName, checked: bool) -> bool {
        if !self.checklist.set(name, checked) {
            return false;
        }
        self.filter_dirty = true;
        self.navigation.highlight_mut().clear();
        self.refresh_logs();
        true
    }

    /// Check or uncheck every available severity at once.
    pub fn set_all_severities(&mut self, checked: bool) {
        let mut changed = false;
        for name in self.checklist.available() {
            changed |= self.checklist.set(name, checked);
        }
        if changed {
            self.filter_dirty = true;
            self.navigation.highlight_mut().clear();
            self.refresh_logs();
        }
    }

    /// "Reset" button: taxonomy defaults and no text filter.
    pub fn reset_filters(&mut self) {
        self.reset_filter_context();
        self.refresh_logs();
    }

    /// Text filter edit; applied after the debounce delay, or at once when
    /// cleared.
    pub fn set_text_filter(&mut self, text: &str, now: Instant) {
        self.text_query = text.to_string();
        if text.is_empty() {
            self.text_filter_input.cancel();
            self.apply_text_filter(String::new());
        } else {
            self.text_filter_input.call(text.to_string(), now);
        }
    }

    fn apply_text_filter(&mut self, text: String) {
        if text == self.text_filter {
            return;
        }
        self.text_filter = text;
        self.navigation.highlight_mut().clear();
        self.refresh_logs();
    }

    /// Checked severities to persist for this report type, once per change.
    pub fn take_filter_to_persist(&mut self) -> Option<(String, Vec<SeverityName>)> {
        if !std::mem::take(&mut self.filter_dirty) {
            return None;
        }
        Some((
            self.settings.report_type.clone(),
            self.checklist.selected().into_iter().collect(),
        ))
    }

    fn reset_filter_context(&mut self) {
        let defaults = SeverityChecklist::defaults(&self.available);
        if defaults != self.checklist {
            self.checklist = defaults;
            self.filter_dirty = true;
        }
        self.text_query.clear();
        self.text_filter.clear();
        self.text_filter_input.cancel();
        self.navigation.highlight_mut().clear();
    }

    // -------------------------------------------------------------------------
    // Logs
    // -------------------------------------------------------------------------

    /// Request the logs of the selected report at the current filters.
    pub fn refresh_logs(&mut self) {
        let kind = self.selected_kind();
        let text = (!self.text_filter.is_empty()).then_some(self.text_filter.as_str());
        let outcome = self.fetcher.refresh(
            self.navigation.selected(),
            kind,
            &self.checklist.selected(),
            text,
        );
        if outcome == RefreshOutcome::Cleared {
            self.replace_logs(Vec::new());
        }
    }

    /// Block until the pending fetch resolves (headless use and tests).
    pub fn wait_for_logs(&mut self, timeout: Duration) -> bool {
        let events = self.fetcher.wait(timeout);
        self.apply_fetch_events(events)
    }

    fn apply_fetch_events(&mut self, events: Vec<FetchEvent>) -> bool {
        let mut changed = false;
        for event in events {
            changed = true;
            match event {
                FetchEvent::Loaded { logs, .. } => self.replace_logs(logs),
                FetchEvent::Failed { error, .. } => {
                    self.notify(NotificationLevel::Error, error.to_string());
                    if self.settings.fetch_failure == FetchFailurePolicy::Clear {
                        self.replace_logs(Vec::new());
                    }
                }
            }
        }
        changed
    }

    fn replace_logs(&mut self, logs: Vec<Log>) {
        self.logs = logs;
        self.log_query.clear();
        self.log_search.clear();
        self.log_search_input.cancel();
        self.log_scroll = None;
    }

    // -------------------------------------------------------------------------
    // Log search
    // -------------------------------------------------------------------------

    pub fn set_log_search_term(&mut self, term: &str, now: Instant) {
        self.log_query = term.to_string();
        if term.is_empty() {
            self.log_search.clear();
            self.log_search_input.cancel();
        } else {
            self.log_search_input.call(term.to_string(), now);
        }
    }

    pub fn run_log_search(&mut self) {
        self.log_search_input.cancel();
        let term = self.log_query.clone();
        let results = search_labels(&term, self.logs.iter().map(|log| log.message.as_str()));
        tracing::debug!(term = %term, matches = results.len(), "Log search");
        self.log_search.set_results(term, results);
        self.log_scroll = self.log_search.current_target();
    }

    pub fn step_log_search(&mut self, direction: SearchDirection) -> Option<usize> {
        let target = self.log_search.step(direction);
        self.log_scroll = target;
        target
    }

    /// Log row the log table should scroll to, delivered once.
    pub fn take_log_scroll_target(&mut self) -> Option<usize> {
        self.log_scroll.take()
    }

    // -------------------------------------------------------------------------
    // Frame driver
    // -------------------------------------------------------------------------

    /// Fire expired debouncers and commit finished fetches.
    /// Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.tree_search_input.poll(now).is_some() {
            self.run_tree_search();
            changed = true;
        }
        if self.log_search_input.poll(now).is_some() {
            self.run_log_search();
            changed = true;
        }
        if let Some(text) = self.text_filter_input.poll(now) {
            self.apply_text_filter(text);
            changed = true;
        }
        let events = self.fetcher.poll();
        changed |= self.apply_fetch_events(events);
        changed
    }

    /// How long until `tick` has work to do, for repaint scheduling.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let pending = [
            self.tree_search_input.remaining(now),
            self.log_search_input.remaining(now),
            self.text_filter_input.remaining(now),
        ]
        .into_iter()
        .flatten()
        .min();
        if self.fetcher.is_loading() {
            let poll = Duration::from_millis(50);
            return Some(pending.map_or(poll, |p| p.min(poll)));
        }
        pending
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            level,
            message: message.into(),
        });
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn reproject(&mut self) {
        self.rows = project(
            &self.tree,
            self.navigation.expanded(),
            Some(self.navigation.selected()),
        );
    }

    /// Row indices move when nodes open or close, so search results die.
    fn on_shape_change(&mut self) {
        self.reproject();
        self.tree_search.clear_results();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{LogRequest, RawLog};
    use crate::util::error::FetchError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    fn line(message: &str, severity: SeverityName) -> Report {
        Report::new(message).with_severities(&[severity])
    }

    fn report() -> Report {
        Report::new("Study").with_id("root").with_sub_reports(vec![
            line("Study started", SeverityName::Info),
            Report::new("Load flow").with_id("lf").with_sub_reports(vec![
                line("Line L1 overloaded", SeverityName::Warn),
                Report::new("Network errors").with_id("net").with_sub_reports(vec![
                    line("Bus B3 isolated", SeverityName::Error),
                    line("Trace detail", SeverityName::Trace),
                ]),
            ]),
            Report::new("Security analysis").with_id("sa").with_sub_reports(vec![
                line("Contingency N-1 ok", SeverityName::Info),
            ]),
        ])
    }

    fn viewer() -> ReportViewer {
        let mut viewer = ReportViewer::from_report(&report(), ViewerSettings::default(), None);
        assert!(viewer.wait_for_logs(WAIT));
        viewer
    }

    fn messages(viewer: &ReportViewer) -> Vec<&str> {
        viewer.logs().iter().map(|l| l.message.as_str()).collect()
    }

    struct FailingSource;

    impl LogSource for FailingSource {
        fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
            Err(FetchError::Backend {
                report_id: request.report_id.clone(),
                message: "503".to_string(),
            })
        }
    }

    #[test]
    fn test_initial_state_selects_root_with_default_filter() {
        let viewer = viewer();
        assert_eq!(viewer.selected(), "root");
        assert_eq!(viewer.rows().len(), 3);
        assert!(viewer.rows()[0].is_selected);
        // TRACE is not displayed by default.
        assert!(!viewer.checklist().is_checked(SeverityName::Trace));
        assert_eq!(
            messages(&viewer),
            vec![
                "Study started",
                "Line L1 overloaded",
                "Bus B3 isolated",
                "Contingency N-1 ok"
            ]
        );
    }

    #[test]
    fn test_saved_filter_is_applied_at_mount() {
        let mut viewer = ReportViewer::from_report(
            &report(),
            ViewerSettings::default(),
            Some(&[SeverityName::Error, SeverityName::Trace]),
        );
        viewer.wait_for_logs(WAIT);
        assert_eq!(messages(&viewer), vec!["Bus B3 isolated", "Trace detail"]);
    }

    #[test]
    fn test_select_resets_filters_and_notifies_embedder() {
        let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut viewer = viewer();
        viewer.set_selection_listener(Box::new(move |change: &SelectionChange| {
            sink.borrow_mut().push(change.clone())
        }));

        viewer.set_severity(SeverityName::Info, false);
        viewer.wait_for_logs(WAIT);
        assert!(viewer.select_report("lf"));
        viewer.wait_for_logs(WAIT);

        assert!(viewer.checklist().is_checked(SeverityName::Info));
        assert_eq!(messages(&viewer), vec!["Line L1 overloaded", "Bus B3 isolated"]);
        assert_eq!(
            seen.borrow().as_slice(),
            &[SelectionChange {
                kind: ReportKind::Node,
                id: "lf".to_string()
            }]
        );
    }

    #[test]
    fn test_reselect_is_noop_under_on_change_policy() {
        let mut viewer = viewer();
        viewer.set_severity(SeverityName::Warn, false);
        assert!(!viewer.select_report("root"));
        assert!(!viewer.checklist().is_checked(SeverityName::Warn));
        assert!(!viewer.select_report("ghost"));
        assert_eq!(viewer.selected(), "root");
    }

    #[test]
    fn test_reselect_resets_under_always_policy() {
        let settings = ViewerSettings {
            reselect_policy: ReselectPolicy::Always,
            ..ViewerSettings::default()
        };
        let mut viewer = ReportViewer::from_report(&report(), settings, None);
        viewer.set_severity(SeverityName::Warn, false);
        viewer.select_report("root");
        assert!(viewer.checklist().is_checked(SeverityName::Warn));
    }

    #[test]
    fn test_empty_severity_selection_clears_logs_without_fetch() {
        let mut viewer = viewer();
        viewer.set_all_severities(false);
        assert!(viewer.logs().is_empty());
        assert!(!viewer.is_loading());
    }

    #[test]
    fn test_log_row_click_reveals_and_scrolls_once() {
        let mut viewer = viewer();
        let bus = viewer
            .logs()
            .iter()
            .position(|l| l.message == "Bus B3 isolated")
            .unwrap();
        assert!(viewer.on_log_row_clicked(bus));
        assert_eq!(viewer.highlighted(), Some("net"));
        assert!(viewer.is_highlighted("net"));
        assert!(!viewer.is_highlighted("lf"));
        assert!(viewer.is_expanded("lf"));
        assert_eq!(viewer.selected(), "root");

        let row = viewer.take_tree_scroll_target().unwrap();
        assert_eq!(viewer.rows()[row].id, "net");
        assert_eq!(viewer.take_tree_scroll_target(), None);
    }

    #[test]
    fn test_tree_search_expands_collapsed_matches_after_debounce() {
        let start = Instant::now();
        let mut viewer = viewer();
        viewer.set_tree_search_term("err", start);
        assert!(!viewer.tick(start + Duration::from_millis(100)));
        assert!(viewer.tree_search().results().is_empty());

        assert!(viewer.tick(start + Duration::from_millis(300)));
        assert!(viewer.is_expanded("lf"));
        let results = viewer.tree_search().results().to_vec();
        assert_eq!(results.len(), 1);
        assert_eq!(viewer.rows()[results[0]].id, "net");
        assert_eq!(viewer.take_tree_scroll_target(), Some(results[0]));
    }

    #[test]
    fn test_clearing_tree_search_is_immediate() {
        let start = Instant::now();
        let mut viewer = viewer();
        viewer.set_tree_search_term("a", start);
        viewer.run_tree_search();
        assert!(!viewer.tree_search().results().is_empty());
        viewer.set_tree_search_term("", start);
        assert!(viewer.tree_search().results().is_empty());
        assert_eq!(viewer.tree_search().current(), None);
        assert!(!viewer.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_collapse_invalidates_search_results_and_step_reruns() {
        let mut viewer = viewer();
        viewer.set_tree_search_term("a", Instant::now());
        viewer.run_tree_search();
        viewer.collapse("root");
        assert!(viewer.tree_search().results().is_empty());
        assert_eq!(viewer.tree_query(), "a");
        assert!(viewer.step_tree_search(SearchDirection::Next).is_some());
    }

    #[test]
    fn test_text_filter_is_debounced() {
        let start = Instant::now();
        let mut viewer = viewer();
        viewer.set_text_filter("bus", start);
        assert_eq!(viewer.text_filter(), "");
        viewer.tick(start + Duration::from_millis(300));
        assert_eq!(viewer.text_filter(), "bus");
        viewer.wait_for_logs(WAIT);
        assert_eq!(messages(&viewer), vec!["Bus B3 isolated"]);
    }

    #[test]
    fn test_log_search_is_cleared_when_logs_are_replaced() {
        let mut viewer = viewer();
        viewer.set_log_search_term("line", Instant::now());
        viewer.run_log_search();
        assert_eq!(viewer.log_search().results(), &[1]);
        assert_eq!(viewer.take_log_scroll_target(), Some(1));

        viewer.set_severity(SeverityName::Error, false);
        viewer.wait_for_logs(WAIT);
        assert!(viewer.log_search().results().is_empty());
        assert_eq!(viewer.log_query(), "");
    }

    /// Serves the first request from the payload, then fails every request.
    struct FlakySource {
        inner: PayloadLogSource,
        calls: AtomicUsize,
    }

    impl LogSource for FlakySource {
        fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return self.inner.fetch_logs(request);
            }
            FailingSource.fetch_logs(request)
        }
    }

    /// Load the root logs, then uncheck INFO against a failing source.
    fn viewer_after_failed_refresh(fetch_failure: FetchFailurePolicy) -> ReportViewer {
        let report = report();
        let tree = map_report_to_tree(&report);
        let source = FlakySource {
            inner: PayloadLogSource::new(&report, &tree),
            calls: AtomicUsize::new(0),
        };
        let settings = ViewerSettings {
            fetch_failure,
            ..ViewerSettings::default()
        };
        let mut viewer = ReportViewer::from_tree(&report, tree, Arc::new(source), settings, None);
        assert!(viewer.wait_for_logs(WAIT));
        assert_eq!(viewer.logs().len(), 4);

        assert!(viewer.set_severity(SeverityName::Info, false));
        assert!(viewer.wait_for_logs(WAIT));
        let last = viewer.notifications().last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert!(last.message.contains("503"));
        viewer
    }

    #[test]
    fn test_failed_refresh_keeps_previous_logs_by_default() {
        let viewer = viewer_after_failed_refresh(FetchFailurePolicy::KeepPrevious);
        assert_eq!(
            messages(&viewer),
            vec![
                "Study started",
                "Line L1 overloaded",
                "Bus B3 isolated",
                "Contingency N-1 ok"
            ]
        );
        assert!(!viewer.is_loading());
    }

    #[test]
    fn test_failed_refresh_clears_logs_under_clear_policy() {
        let viewer = viewer_after_failed_refresh(FetchFailurePolicy::Clear);
        assert!(viewer.logs().is_empty());
        assert!(!viewer.is_loading());
    }

    #[test]
    fn test_first_fetch_failure_notifies() {
        let mut viewer =
            ReportViewer::new(&report(), Arc::new(FailingSource), ViewerSettings::default(), None);
        viewer.wait_for_logs(WAIT);
        assert!(viewer.logs().is_empty());
        let last = viewer.notifications().last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert!(last.message.contains("503"));
    }

    #[test]
    fn test_filter_change_is_persisted_once() {
        let mut viewer = viewer();
        assert_eq!(viewer.take_filter_to_persist(), None);
        viewer.set_severity(SeverityName::Warn, false);
        let (report_type, checked) = viewer.take_filter_to_persist().unwrap();
        assert_eq!(report_type, DEFAULT_REPORT_TYPE);
        assert!(!checked.contains(&SeverityName::Warn));
        assert_eq!(viewer.take_filter_to_persist(), None);
    }
}
