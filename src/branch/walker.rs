//! Selected-path walking.
//!
//! A walk follows single children silently and stops at the first branch
//! point, where the branch selector picks which child continues. The result
//! is a chain of linear segments, one per branch point on the selected path,
//! so each branch point can be re-walked on its own without touching the
//! segments above it.
//!
//! ```text
//! root ─ A ─┬─ B ─ D        segment 1: [root, A]   branch at A (1 / 2)
//!           └─ C            segment 2: [B, D]
//! ```

use serde::Serialize;
use tracing::debug;

use super::selector::{BranchSelector, BranchStep, PathIdentity};
use super::store::NodeStore;

/// A linear run of message nodes, optionally ended by a branch point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    /// Node ids in display order.
    pub nodes: Vec<String>,
    /// Branch point that ended the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchPoint>,
}

/// A branch point on the selected path and the continuation it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchPoint {
    /// Selection key.
    pub identity: PathIdentity,
    /// Selected child index (0-based).
    pub selected: usize,
    /// Number of alternatives.
    pub child_count: usize,
    /// Id of the selected child.
    pub child_id: String,
    /// Walk of the selected child.
    pub continuation: Box<PathSegment>,
}

impl BranchPoint {
    /// Whether a previous alternative exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.selected > 0
    }

    /// Whether a next alternative exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.selected + 1 < self.child_count
    }
}

/// The currently selected path through a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedPath {
    /// First segment; later segments hang off its branch points.
    pub root: PathSegment,
}

impl SelectedPath {
    /// Segments from the top of the conversation down.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        std::iter::successors(Some(&self.root), |segment| {
            segment.branch.as_ref().map(|bp| bp.continuation.as_ref())
        })
    }

    /// Every node id on the path, in display order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        self.segments()
            .flat_map(|segment| segment.nodes.iter().map(String::as_str))
            .collect()
    }

    /// Branch points on the path, outermost first.
    #[must_use]
    pub fn branch_points(&self) -> Vec<&BranchPoint> {
        self.segments().filter_map(|segment| segment.branch.as_ref()).collect()
    }

    /// Look up a branch point on the path.
    #[must_use]
    pub fn branch_point(&self, identity: &PathIdentity) -> Option<&BranchPoint> {
        self.branch_points().into_iter().find(|bp| &bp.identity == identity)
    }

    /// Mutable access to a branch point on the path.
    pub fn branch_point_mut(&mut self, identity: &PathIdentity) -> Option<&mut BranchPoint> {
        let mut segment = &mut self.root;
        loop {
            let bp = segment.branch.as_mut()?;
            if &bp.identity == identity {
                return Some(bp);
            }
            segment = bp.continuation.as_mut();
        }
    }

    /// Number of message nodes on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments().map(|segment| segment.nodes.len()).sum()
    }

    /// Whether the path shows no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walk from `start` along the selected children.
///
/// Stops at a missing node, a node without a message, or a leaf. A walk
/// never visits more nodes than the mapping holds, which bounds the work on
/// cyclic input.
pub fn walk(
    store: &NodeStore<'_>,
    start: &str,
    selector: &mut BranchSelector,
    ancestry: &[BranchStep],
) -> PathSegment {
    let mut budget = store.len();
    walk_segment(store, start, selector, ancestry.to_vec(), &mut budget)
}

/// Walk a whole conversation from its root.
///
/// A root carrying a message starts the path. A structural root is expanded
/// like a branch point: one child is walked directly, several children make
/// the root itself the first branch point.
pub fn walk_conversation(store: &NodeStore<'_>, selector: &mut BranchSelector) -> SelectedPath {
    let mut budget = store.len();
    let Some(root_id) = store.root_id() else {
        return SelectedPath::default();
    };
    let Some(root) = store.get(root_id) else {
        return SelectedPath::default();
    };

    let segment = if root.message.is_some() {
        walk_segment(store, root_id, selector, Vec::new(), &mut budget)
    } else {
        match root.children.as_slice() {
            [] => PathSegment::default(),
            [only] => walk_segment(store, only, selector, Vec::new(), &mut budget),
            children => PathSegment {
                nodes: Vec::new(),
                branch: Some(branch_at(store, root_id, children, selector, Vec::new(), &mut budget)),
            },
        }
    };

    SelectedPath { root: segment }
}

/// Re-walk the continuation of one branch point after its selection changed.
///
/// Only the subtree below `identity` is replaced; the segments above it and
/// their branch points are left as they are. Returns `false` when the branch
/// point is not on the path.
pub fn rewalk_branch(
    store: &NodeStore<'_>,
    path: &mut SelectedPath,
    identity: &PathIdentity,
    selector: &mut BranchSelector,
) -> bool {
    let Some(bp) = path.branch_point_mut(identity) else {
        return false;
    };
    let children = store.children(&identity.node_id);
    let selected = selector.get_selected(identity, children.len());
    let Some(child_id) = children.get(selected) else {
        return false;
    };

    let mut budget = store.len();
    let continuation = walk_segment(store, child_id, selector, identity.descend(selected), &mut budget);
    debug!(branch = %identity, selected, nodes = continuation.nodes.len(), "Re-walked branch");

    bp.selected = selected;
    bp.child_count = children.len();
    bp.child_id = child_id.clone();
    bp.continuation = Box::new(continuation);
    true
}

fn walk_segment(
    store: &NodeStore<'_>,
    start: &str,
    selector: &mut BranchSelector,
    ancestry: Vec<BranchStep>,
    budget: &mut usize,
) -> PathSegment {
    let mut segment = PathSegment::default();
    let mut current = start;

    loop {
        if *budget == 0 {
            debug!(node = current, "Walk budget exhausted, stopping");
            break;
        }
        let Some(node) = store.get(current) else {
            break;
        };
        if node.message.is_none() {
            break;
        }
        *budget -= 1;
        segment.nodes.push(current.to_string());

        match node.children.as_slice() {
            [] => break,
            [only] => current = only.as_str(),
            children => {
                segment.branch = Some(branch_at(store, current, children, selector, ancestry, budget));
                break;
            }
        }
    }

    segment
}

fn branch_at(
    store: &NodeStore<'_>,
    node_id: &str,
    children: &[String],
    selector: &mut BranchSelector,
    ancestry: Vec<BranchStep>,
    budget: &mut usize,
) -> BranchPoint {
    let identity = PathIdentity::new(node_id, ancestry);
    let selected = selector.get_selected(&identity, children.len());
    let child_id = children.get(selected).cloned().unwrap_or_default();
    let continuation = walk_segment(store, &child_id, selector, identity.descend(selected), budget);

    BranchPoint {
        identity,
        selected,
        child_count: children.len(),
        child_id,
        continuation: Box::new(continuation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fragment, FragmentKind, Message, Node, NodeMap};
    use pretty_assertions::assert_eq;

    fn message(text: &str) -> Option<Message> {
        Some(Message {
            fragments: vec![Fragment::text(FragmentKind::Response, text)],
            ..Message::default()
        })
    }

    fn mapping(nodes: &[(&str, &[&str], bool)]) -> NodeMap {
        nodes
            .iter()
            .map(|(id, children, has_message)| {
                (
                    (*id).to_string(),
                    Node {
                        id: Some((*id).to_string()),
                        children: children.iter().map(|c| (*c).to_string()).collect(),
                        message: if *has_message { message(id) } else { None },
                        ..Node::default()
                    },
                )
            })
            .collect()
    }

    /// root→[A], A→[B,C], B→[D], C→[]
    fn scenario() -> NodeMap {
        mapping(&[
            ("root", &["A"], true),
            ("A", &["B", "C"], true),
            ("B", &["D"], true),
            ("C", &[], true),
            ("D", &[], true),
        ])
    }

    #[test]
    fn test_walk_stops_at_branch_point() {
        let mapping = scenario();
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();

        let path = walk_conversation(&store, &mut selector);
        let segments: Vec<_> = path.segments().map(|s| s.nodes.clone()).collect();
        assert_eq!(segments, vec![vec!["root", "A"], vec!["B", "D"]]);

        let bp = &path.branch_points()[0];
        assert_eq!(bp.identity, PathIdentity::new("A", Vec::new()));
        assert_eq!((bp.selected, bp.child_count), (0, 2));
        assert!(!bp.has_previous());
        assert!(bp.has_next());
    }

    #[test]
    fn test_rewalk_replaces_only_continuation() {
        let mapping = scenario();
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();
        let mut path = walk_conversation(&store, &mut selector);
        let identity = PathIdentity::new("A", Vec::new());

        assert!(selector.next(&identity));
        assert!(rewalk_branch(&store, &mut path, &identity, &mut selector));

        assert_eq!(path.root.nodes, vec!["root", "A"]);
        assert_eq!(path.node_ids(), vec!["root", "A", "C"]);
        assert_eq!(path.branch_points()[0].child_id, "C");
    }

    #[test]
    fn test_structural_root_with_branches() {
        let mapping = mapping(&[("root", &["x", "y"], false), ("x", &[], true), ("y", &[], true)]);
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();

        let path = walk_conversation(&store, &mut selector);
        assert!(path.root.nodes.is_empty());
        assert_eq!(path.node_ids(), vec!["x"]);
        assert_eq!(path.branch_points()[0].identity.node_id, "root");
    }

    #[test]
    fn test_structural_root_single_child() {
        let mapping = mapping(&[("root", &["x"], false), ("x", &["z"], true), ("z", &[], true)]);
        let store = NodeStore::new(&mapping);
        let path = walk_conversation(&store, &mut BranchSelector::new());

        assert_eq!(path.node_ids(), vec!["x", "z"]);
        assert!(path.branch_points().is_empty());
    }

    #[test]
    fn test_missing_or_empty_nodes_stop_walk() {
        let mapping = mapping(&[("a", &["gone"], true), ("b", &["c"], true), ("c", &["d"], false)]);
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();

        assert_eq!(walk(&store, "a", &mut selector, &[]).nodes, vec!["a"]);
        assert_eq!(walk(&store, "b", &mut selector, &[]).nodes, vec!["b"]);
        assert!(walk(&store, "nowhere", &mut selector, &[]).nodes.is_empty());
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mapping = mapping(&[("a", &["b"], true), ("b", &["a"], true)]);
        let store = NodeStore::new(&mapping);
        let segment = walk(&store, "a", &mut BranchSelector::new(), &[]);
        assert_eq!(segment.nodes, vec!["a", "b"]);
    }

    #[test]
    fn test_nested_selection_survives_parent_switch() {
        // A→[B,C], B→[E,F]
        let mapping = mapping(&[
            ("A", &["B", "C"], true),
            ("B", &["E", "F"], true),
            ("C", &[], true),
            ("E", &[], true),
            ("F", &[], true),
        ]);
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();
        let mut path = SelectedPath {
            root: walk(&store, "A", &mut selector, &[]),
        };
        let outer = PathIdentity::new("A", Vec::new());
        let inner = PathIdentity::new("B", outer.descend(0));

        selector.next(&inner);
        rewalk_branch(&store, &mut path, &inner, &mut selector);
        assert_eq!(path.node_ids(), vec!["A", "B", "F"]);

        selector.next(&outer);
        rewalk_branch(&store, &mut path, &outer, &mut selector);
        assert_eq!(path.node_ids(), vec!["A", "C"]);

        selector.previous(&outer);
        rewalk_branch(&store, &mut path, &outer, &mut selector);
        assert_eq!(path.node_ids(), vec!["A", "B", "F"]);
    }

    #[test]
    fn test_rewalk_unknown_branch() {
        let mapping = scenario();
        let store = NodeStore::new(&mapping);
        let mut selector = BranchSelector::new();
        let mut path = walk_conversation(&store, &mut selector);

        let ghost = PathIdentity::new("B", Vec::new());
        assert!(!rewalk_branch(&store, &mut path, &ghost, &mut selector));
    }
}
