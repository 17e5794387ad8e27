//! Selection tracking for browsing surfaces.
//!
//! Two disciplines: single-pick (at most one id, click-to-toggle) and
//! multi-check (arbitrary file subset). When a match rule is active the
//! selection is reconciled against the matched set, never merged with it.

use std::collections::HashSet;

use crate::catalog::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    SinglePick,
    MultiCheck,
}

#[derive(Debug)]
pub struct SelectionSet {
    mode: SelectionMode,
    selected: HashSet<NodeId>,
}

impl SelectionSet {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Toggles one id. Single-pick: re-clicking deselects, clicking another
    /// id replaces the previous pick. Multi-check: plain add/remove.
    pub fn toggle(&mut self, id: &NodeId) {
        match self.mode {
            SelectionMode::SinglePick => {
                if self.selected.contains(id) {
                    self.selected.clear();
                } else {
                    self.selected.clear();
                    self.selected.insert(id.clone());
                }
            }
            SelectionMode::MultiCheck => {
                if !self.selected.remove(id) {
                    self.selected.insert(id.clone());
                }
            }
        }
    }

    /// Sets the selection to exactly the displayed file id set. Only
    /// meaningful under multi-check.
    pub fn select_all(&mut self, displayed: &[NodeId]) {
        if self.mode != SelectionMode::MultiCheck {
            log::warn!("select_all ignored outside multi-check mode");
            return;
        }
        self.selected = displayed.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Header toggle state: checked iff the displayed set is non-empty and
    /// exactly equals the selection.
    pub fn all_selected(&self, displayed: &[NodeId]) -> bool {
        if displayed.is_empty() {
            return false;
        }
        let displayed: HashSet<_> = displayed.iter().cloned().collect();
        displayed == self.selected
    }

    /// A rule became active: the selection is replaced with the matched
    /// set, regardless of what was selected before. Under single-pick only
    /// the first matched id is taken, preserving the at-most-one invariant.
    pub fn reconcile_with_match(&mut self, matched: &[NodeId]) {
        self.selected.clear();
        match self.mode {
            SelectionMode::SinglePick => {
                if let Some(first) = matched.first() {
                    self.selected.insert(first.clone());
                }
            }
            SelectionMode::MultiCheck => {
                self.selected = matched.iter().cloned().collect();
            }
        }
    }

    /// The rule was cleared: the selection is cleared, not restored.
    pub fn reconcile_cleared(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.contains(id)
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
