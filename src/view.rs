//! The open conversation and its branch selections.

use std::sync::Arc;

use tracing::debug;

use crate::branch::{rewalk_branch, walk_conversation, BranchPoint, BranchSelector, NodeStore, PathIdentity, SelectedPath};
use crate::model::Conversation;

/// A conversation being read, with the branch choices made so far.
///
/// The selector lives exactly as long as the view: opening another
/// conversation builds a new view and so starts from the first branch
/// everywhere.
#[derive(Debug, Clone)]
pub struct ConversationView {
    conversation: Arc<Conversation>,
    selector: BranchSelector,
    path: SelectedPath,
}

impl ConversationView {
    /// Open a conversation and walk its default path.
    #[must_use]
    pub fn open(conversation: Arc<Conversation>) -> Self {
        let mut selector = BranchSelector::new();
        let path = walk_conversation(&NodeStore::new(&conversation.mapping), &mut selector);
        debug!(
            conversation = %conversation.id,
            nodes = path.len(),
            branches = path.branch_points().len(),
            "Opened conversation"
        );
        Self {
            conversation,
            selector,
            path,
        }
    }

    /// The conversation.
    #[must_use]
    pub fn conversation(&self) -> &Arc<Conversation> {
        &self.conversation
    }

    /// The selected path.
    #[must_use]
    pub const fn path(&self) -> &SelectedPath {
        &self.path
    }

    /// The branch selections.
    #[must_use]
    pub const fn selector(&self) -> &BranchSelector {
        &self.selector
    }

    /// Branch points on the selected path, outermost first.
    #[must_use]
    pub fn branch_points(&self) -> Vec<&BranchPoint> {
        self.path.branch_points()
    }

    /// Show the previous alternative at a branch point.
    pub fn previous_branch(&mut self, identity: &PathIdentity) -> bool {
        let changed = self.selector.previous(identity);
        self.after_change(identity, changed)
    }

    /// Show the next alternative at a branch point.
    pub fn next_branch(&mut self, identity: &PathIdentity) -> bool {
        let changed = self.selector.next(identity);
        self.after_change(identity, changed)
    }

    /// Show the alternative with a one-based number, clamped to the range.
    pub fn select_branch(&mut self, identity: &PathIdentity, one_based: usize) -> bool {
        let changed = self.selector.set_explicit(identity, one_based);
        self.after_change(identity, changed)
    }

    /// Apply one-based choices to successive branch points from the top.
    ///
    /// Each choice re-walks the path, so later choices land on the branch
    /// points the earlier ones revealed. Choices beyond the last branch
    /// point are ignored.
    pub fn apply_choices(&mut self, choices: &[usize]) {
        for (depth, choice) in choices.iter().enumerate() {
            let Some(identity) = self.path.branch_points().get(depth).map(|bp| bp.identity.clone()) else {
                break;
            };
            self.select_branch(&identity, *choice);
        }
    }

    /// Forget every branch choice and walk the default path again.
    pub fn reset(&mut self) {
        self.selector.reset();
        self.path = walk_conversation(&NodeStore::new(&self.conversation.mapping), &mut self.selector);
    }

    fn after_change(&mut self, identity: &PathIdentity, changed: bool) -> bool {
        if !changed {
            return false;
        }
        let store = NodeStore::new(&self.conversation.mapping);
        rewalk_branch(&store, &mut self.path, identity, &mut self.selector)
    }
}
