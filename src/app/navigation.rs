// ReportScope - app/navigation.rs
//
// Tree navigation state: selected node, expanded nodes, and the transient
// highlight set by clicking a log row.
//
// Highlight is a single observable value. Listeners receive the previous and
// new id, so only the two affected rows need repainting.

use crate::core::tree::ReportIndex;
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// Highlight
// =============================================================================

/// Emitted to highlight listeners when the highlighted id changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<String>,
    pub current: Option<String>,
}

impl HighlightChange {
    /// True if the row `id` must re-render for this change.
    pub fn affects(&self, id: &str) -> bool {
        self.previous.as_deref() == Some(id) || self.current.as_deref() == Some(id)
    }
}

pub type HighlightListener = Box<dyn FnMut(&HighlightChange)>;

/// Handle returned by [`HighlightState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct HighlightState {
    current: Option<String>,
    generation: u64,
    listeners: Vec<(SubscriptionId, HighlightListener)>,
    next_subscription: u64,
}

impl fmt::Debug for HighlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightState")
            .field("current", &self.current)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl HighlightState {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Incremented on every change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id)
    }

    /// Replace the highlighted id. Listeners run only when it changes.
    pub fn set(&mut self, id: Option<String>) -> bool {
        if self.current == id {
            return false;
        }
        let change = HighlightChange {
            previous: std::mem::replace(&mut self.current, id),
            current: self.current.clone(),
        };
        self.generation += 1;
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set(None)
    }

    pub fn subscribe(&mut self, listener: HighlightListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub, _)| *sub != id);
    }
}

// =============================================================================
// Navigation
// =============================================================================

#[derive(Debug)]
pub struct NavigationState {
    selected: String,
    expanded: HashSet<String>,
    highlight: HighlightState,
}

impl NavigationState {
    /// Root selected and expanded, nothing highlighted.
    pub fn new(root_id: &str) -> Self {
        Self {
            selected: root_id.to_string(),
            expanded: [root_id.to_string()].into_iter().collect(),
            highlight: HighlightState::default(),
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlight.current()
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn highlight_mut(&mut self) -> &mut HighlightState {
        &mut self.highlight
    }

    /// Select `id`. Returns false (and changes nothing) when `id` is already
    /// selected or unknown to `index`.
    ///
    /// A new selection clears the highlight and expands the ancestors of the
    /// selected node so it is visible.
    pub fn select(&mut self, id: &str, index: &ReportIndex) -> bool {
        if id == self.selected || !index.contains(id) {
            return false;
        }
        self.selected = id.to_string();
        self.highlight.clear();
        self.expand_ancestors([id], index);
        tracing::debug!(id, "Report selected");
        true
    }

    /// Returns true if `id` was not expanded before.
    pub fn expand(&mut self, id: &str) -> bool {
        self.expanded.insert(id.to_string())
    }

    /// Returns true if `id` was expanded before.
    pub fn collapse(&mut self, id: &str) -> bool {
        self.expanded.remove(id)
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.collapse(id) {
            self.expand(id);
        }
        self.is_expanded(id)
    }

    /// Expand every ancestor of every id in `targets`, as one batch.
    /// Returns the number of nodes newly expanded.
    pub fn expand_ancestors<'a, I>(&mut self, targets: I, index: &ReportIndex) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for target in targets {
            for ancestor in index.ancestors(target) {
                if !self.expanded.contains(&ancestor) {
                    missing.push(ancestor);
                }
            }
        }
        let before = self.expanded.len();
        self.expanded.extend(missing);
        self.expanded.len() - before
    }

    /// Reveal the tree node a clicked log row belongs to.
    ///
    /// Expands all of its collapsed ancestors in one batch and highlights it.
    /// The selection is left untouched. Absent or unknown targets are a no-op.
    pub fn reveal_and_highlight(&mut self, target: Option<&str>, index: &ReportIndex) -> bool {
        let Some(target) = target.filter(|id| index.contains(id)) else {
            tracing::debug!(requested = ?target, "Reveal target not in tree; ignoring");
            return false;
        };
        let expanded = self.expand_ancestors([target], index);
        self.highlight.set(Some(target.to_string()));
        tracing::debug!(id = target, expanded, "Report revealed and highlighted");
        true
    }
}
