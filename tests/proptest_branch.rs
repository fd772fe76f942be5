//! Property-based tests for branch walking, filtering and highlighting.
//!
//! Trees are generated as parent lists: node `i + 1` hangs off an earlier
//! node picked by index, so every list describes a valid tree.

use deepseek_reader::branch::{rewalk_branch, walk_conversation, BranchSelector, NodeStore, PathIdentity};
use deepseek_reader::render::QueryHighlighter;
use deepseek_reader::search::{filter, DateRange};
use proptest::prelude::*;
use proptest::sample::Index;

mod generators;

/// Parent lists for trees of up to `max` extra nodes.
fn parent_lists(max: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<Index>(), 0..max)
        .prop_map(|picks| picks.iter().enumerate().map(|(i, pick)| pick.index(i + 1)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The selected path is a parent-to-child chain from the first node to a leaf.
    #[test]
    fn path_is_chain_ending_at_leaf(parents in parent_lists(40)) {
        let conversation = generators::tree(&parents);
        let store = NodeStore::new(&conversation.mapping);
        let mut selector = BranchSelector::new();
        let path = walk_conversation(&store, &mut selector);
        let ids = path.node_ids();

        prop_assert_eq!(ids.first().copied(), Some("n0"));
        for pair in ids.windows(2) {
            prop_assert!(store.children(pair[0]).iter().any(|child| child == pair[1]));
        }
        let last = ids.last().copied().unwrap_or("n0");
        prop_assert!(store.children(last).is_empty());
    }

    /// Every branch point on the path shows an existing child.
    #[test]
    fn branch_points_select_existing_children(
        parents in parent_lists(40),
        moves in prop::collection::vec((any::<Index>(), any::<bool>()), 0..20),
    ) {
        let conversation = generators::tree(&parents);
        let store = NodeStore::new(&conversation.mapping);
        let mut selector = BranchSelector::new();
        let mut path = walk_conversation(&store, &mut selector);

        for (pick, forward) in moves {
            let points: Vec<PathIdentity> = path.branch_points().into_iter().map(|bp| bp.identity.clone()).collect();
            if points.is_empty() {
                break;
            }
            let identity = &points[pick.index(points.len())];
            let changed = if forward { selector.next(identity) } else { selector.previous(identity) };
            if changed {
                prop_assert!(rewalk_branch(&store, &mut path, identity, &mut selector));
            }
        }

        for bp in path.branch_points() {
            let children = store.children(&bp.identity.node_id);
            prop_assert_eq!(bp.child_count, children.len());
            prop_assert!(bp.selected < bp.child_count);
            prop_assert_eq!(&bp.child_id, &children[bp.selected]);
            prop_assert_eq!(bp.continuation.nodes.first(), Some(&bp.child_id));
        }
    }

    /// Re-walking one branch gives the same path as walking from scratch.
    #[test]
    fn rewalk_matches_fresh_walk(
        parents in parent_lists(40),
        moves in prop::collection::vec((any::<Index>(), 1usize..4), 0..12),
    ) {
        let conversation = generators::tree(&parents);
        let store = NodeStore::new(&conversation.mapping);
        let mut selector = BranchSelector::new();
        let mut path = walk_conversation(&store, &mut selector);

        for (pick, position) in moves {
            let points: Vec<PathIdentity> = path.branch_points().into_iter().map(|bp| bp.identity.clone()).collect();
            if points.is_empty() {
                break;
            }
            let identity = &points[pick.index(points.len())];
            if selector.set_explicit(identity, position) {
                rewalk_branch(&store, &mut path, identity, &mut selector);
            }
        }

        let mut fresh_selector = selector.clone();
        let fresh = walk_conversation(&store, &mut fresh_selector);
        prop_assert_eq!(path, fresh);
    }

    /// Navigation never leaves `0..child_count`.
    #[test]
    fn navigation_stays_in_bounds(
        child_count in 1usize..8,
        steps in prop::collection::vec(any::<bool>(), 0..30),
    ) {
        let identity = PathIdentity::new("n0", Vec::new());
        let mut selector = BranchSelector::new();
        selector.get_selected(&identity, child_count);

        for forward in steps {
            let before = selector.selected(&identity).unwrap_or(0);
            let changed = if forward { selector.next(&identity) } else { selector.previous(&identity) };
            let after = selector.selected(&identity).unwrap_or(0);

            prop_assert!(after < child_count);
            prop_assert_eq!(changed, before != after);
        }
    }

    /// A stored selection is clamped when the branch point has fewer children.
    #[test]
    fn selection_clamps_after_shrink(before in 2usize..10, after in 1usize..10) {
        let identity = PathIdentity::new("n0", Vec::new());
        let mut selector = BranchSelector::new();
        selector.get_selected(&identity, before);
        selector.set_selected(&identity, before - 1);

        let selected = selector.get_selected(&identity, after);
        prop_assert_eq!(selected, (before - 1).min(after - 1));
    }

    /// Filtering an already filtered list changes nothing.
    #[test]
    fn filter_is_idempotent(count in 0usize..40, query in "(topic|rust|keyword[0-9]|number 1|)") {
        let conversations = generators::many(count, &[0]);
        let once = filter(&conversations, &query, DateRange::default());
        let twice = filter(&once, &query, DateRange::default());

        let once_ids: Vec<&str> = once.iter().map(|c| c.id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(once_ids, twice_ids);
    }

    /// Highlight counts agree with a plain case-insensitive substring count.
    #[test]
    fn highlight_count_matches_literal_search(text in "[abAB .]{0,60}", query in "[abAB.]{1,3}") {
        let expected = text.to_lowercase().matches(&query.to_lowercase()).count();
        prop_assert_eq!(QueryHighlighter::new(&query).count(&text), expected);
    }
}
