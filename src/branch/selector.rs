//! Branch selection state.
//!
//! Each branch point on the rendered path owns one selection: the index of
//! the child currently shown. Selections are keyed by [`PathIdentity`], the
//! branch point's id together with the choices made at every branch point
//! above it, so the same node reached through different ancestors keeps
//! separate state.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

/// One choice made at a branch point above another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BranchStep {
    /// Branch point node id.
    pub node_id: String,
    /// Selected child index at that branch point.
    pub index: usize,
}

/// Stable key for a branch point's selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathIdentity {
    /// Branch point node id.
    pub node_id: String,
    /// Choices at the branch points above, outermost first.
    pub ancestry: Vec<BranchStep>,
}

impl PathIdentity {
    /// Identity of a branch point below the given ancestry.
    #[must_use]
    pub fn new(node_id: impl Into<String>, ancestry: Vec<BranchStep>) -> Self {
        Self {
            node_id: node_id.into(),
            ancestry,
        }
    }

    /// Ancestry for the branch points below this one when `index` is chosen.
    #[must_use]
    pub fn descend(&self, index: usize) -> Vec<BranchStep> {
        let mut ancestry = self.ancestry.clone();
        ancestry.push(BranchStep {
            node_id: self.node_id.clone(),
            index,
        });
        ancestry
    }

    /// Nesting depth: the number of branch points above this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestry.len()
    }
}

impl fmt::Display for PathIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.ancestry {
            write!(f, "{}[{}]/", step.node_id, step.index)?;
        }
        f.write_str(&self.node_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    index: usize,
    child_count: usize,
}

/// Selected child index per branch point of one conversation.
///
/// Entries are created lazily at index 0 the first time a branch point is
/// walked, and change only through navigation. Every stored index satisfies
/// `index < child_count`.
#[derive(Debug, Clone, Default)]
pub struct BranchSelector {
    entries: HashMap<PathIdentity, Selection>,
}

impl BranchSelector {
    /// Create an empty selector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected index for a branch point with `child_count` children.
    ///
    /// Records the branch point on first use and clamps a stored index that
    /// no longer fits.
    pub fn get_selected(&mut self, identity: &PathIdentity, child_count: usize) -> usize {
        if child_count == 0 {
            return 0;
        }
        let entry = self
            .entries
            .entry(identity.clone())
            .or_insert(Selection {
                index: 0,
                child_count,
            });
        entry.child_count = child_count;
        entry.index = entry.index.min(child_count - 1);
        entry.index
    }

    /// Selected index without recording anything.
    #[must_use]
    pub fn selected(&self, identity: &PathIdentity) -> Option<usize> {
        self.entries.get(identity).map(|s| s.index)
    }

    /// Child count last seen for a branch point.
    #[must_use]
    pub fn child_count(&self, identity: &PathIdentity) -> Option<usize> {
        self.entries.get(identity).map(|s| s.child_count)
    }

    /// Select a child, clamped to the branch point's children.
    ///
    /// Returns whether the selection changed. Unknown identities are ignored:
    /// a branch point must have been walked before it can be navigated.
    pub fn set_selected(&mut self, identity: &PathIdentity, index: usize) -> bool {
        let Some(entry) = self.entries.get_mut(identity) else {
            return false;
        };
        let clamped = index.min(entry.child_count.saturating_sub(1));
        if clamped == entry.index {
            return false;
        }
        trace!(branch = %identity, from = entry.index, to = clamped, "Branch selection changed");
        entry.index = clamped;
        true
    }

    /// Move to the previous alternative. No-op at the first.
    pub fn previous(&mut self, identity: &PathIdentity) -> bool {
        match self.selected(identity) {
            Some(index) if index > 0 => self.set_selected(identity, index - 1),
            _ => false,
        }
    }

    /// Move to the next alternative. No-op at the last.
    pub fn next(&mut self, identity: &PathIdentity) -> bool {
        match self.entries.get(identity).copied() {
            Some(s) if s.index + 1 < s.child_count => self.set_selected(identity, s.index + 1),
            _ => false,
        }
    }

    /// Select by one-based position, clamped to `1..=child_count`.
    pub fn set_explicit(&mut self, identity: &PathIdentity, one_based: usize) -> bool {
        let Some(count) = self.child_count(identity) else {
            return false;
        };
        let one_based = one_based.clamp(1, count.max(1));
        self.set_selected(identity, one_based - 1)
    }

    /// Forget every selection.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of branch points seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no branch point has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
