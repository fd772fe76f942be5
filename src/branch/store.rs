//! Read-only view over a conversation's node mapping.

use crate::model::{Fragment, Node, NodeMap, ROOT_ID};

/// Read-only access to the nodes of one conversation.
///
/// The store never validates structure. Lookups of missing ids return
/// `None` and callers stop walking there.
#[derive(Debug, Clone, Copy)]
pub struct NodeStore<'a> {
    mapping: &'a NodeMap,
}

impl<'a> NodeStore<'a> {
    /// Wrap a node mapping.
    #[must_use]
    pub const fn new(mapping: &'a NodeMap) -> Self {
        Self { mapping }
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a Node> {
        self.mapping.get(id)
    }

    /// Whether a node exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.mapping.contains_key(id)
    }

    /// The structural root node.
    #[must_use]
    pub fn root(&self) -> Option<&'a Node> {
        self.get(ROOT_ID)
    }

    /// Id of the node the conversation starts from.
    ///
    /// Exports carry a `root` node; older or hand-made files may not, in
    /// which case the first node without a known parent is used.
    #[must_use]
    pub fn root_id(&self) -> Option<&'a str> {
        if self.contains(ROOT_ID) {
            return Some(ROOT_ID);
        }
        self.mapping
            .iter()
            .find(|(_, node)| {
                node.parent
                    .as_deref()
                    .map_or(true, |parent| !self.mapping.contains_key(parent))
            })
            .map(|(id, _)| id.as_str())
    }

    /// Child ids of a node, empty when the node is missing.
    #[must_use]
    pub fn children(&self, id: &str) -> &'a [String] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether the mapping has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Every fragment in the mapping, across all branches.
    pub fn fragments(&self) -> impl Iterator<Item = &'a Fragment> {
        self.mapping
            .values()
            .filter_map(|node| node.message.as_ref())
            .flat_map(|message| message.fragments.iter())
    }

    /// Ids of all branch points, in mapping order.
    pub fn branch_point_ids(&self) -> impl Iterator<Item = &'a str> {
        self.mapping
            .iter()
            .filter(|(_, node)| node.is_branch_point())
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fragment, FragmentKind, Message};

    fn mapping() -> NodeMap {
        let message = Message {
            fragments: vec![Fragment::text(FragmentKind::Request, "hi")],
            ..Message::default()
        };
        [
            (
                "root".to_string(),
                Node {
                    children: vec!["a".into(), "b".into()],
                    ..Node::default()
                },
            ),
            (
                "a".to_string(),
                Node {
                    message: Some(message),
                    ..Node::default()
                },
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup() {
        let mapping = mapping();
        let store = NodeStore::new(&mapping);

        assert!(store.root().is_some());
        assert_eq!(store.root_id(), Some("root"));
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert_eq!(store.children("root"), ["a", "b"]);
        assert!(store.children("missing").is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_root_fallback_to_parentless_node() {
        let mapping: NodeMap = [
            (
                "child".to_string(),
                Node {
                    parent: Some("top".into()),
                    ..Node::default()
                },
            ),
            ("top".to_string(), Node::default()),
        ]
        .into_iter()
        .collect();

        assert_eq!(NodeStore::new(&mapping).root_id(), Some("top"));
    }

    #[test]
    fn test_fragments_and_branch_points() {
        let mapping = mapping();
        let store = NodeStore::new(&mapping);

        assert_eq!(store.fragments().count(), 1);
        assert_eq!(store.branch_point_ids().collect::<Vec<_>>(), ["root"]);
    }
}
