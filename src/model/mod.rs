//! Data model for DeepSeek conversation exports.
//!
//! An export is an array of conversations. Each conversation owns a node
//! mapping that forms a tree: a node may point at several children, and a
//! node with two or more children is a branch point offering alternative
//! continuations. The model is read-only once loaded.
//!
//! Deserialization is deliberately tolerant below the conversation level:
//! malformed nodes are dropped from the mapping with a warning, unknown
//! fragment types are kept verbatim, and `null` collections read as empty.

pub mod fragment;
pub mod timestamp;

pub use fragment::*;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::search::QueryMatcher;

/// Id of the structural root node every export carries.
pub const ROOT_ID: &str = "root";

/// Title shown for conversations without one.
pub const UNTITLED: &str = "Untitled conversation";

/// A single conversation from an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: String,

    /// Conversation title, if the producer assigned one.
    #[serde(default)]
    pub title: Option<String>,

    /// When the conversation was started.
    #[serde(with = "timestamp")]
    pub inserted_at: DateTime<Utc>,

    /// When the conversation was last updated.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,

    /// Node id to node mapping.
    #[serde(default)]
    pub mapping: NodeMap,
}

impl Conversation {
    /// Title for display, falling back to a placeholder.
    #[must_use]
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => UNTITLED,
        }
    }

    /// Whether the title contains the query.
    #[must_use]
    pub fn title_contains(&self, matcher: &QueryMatcher) -> bool {
        self.title.as_deref().is_some_and(|title| matcher.is_match(title))
    }

    /// Whether any fragment in any node contains the query.
    ///
    /// Every branch is searched, not only the selected path.
    #[must_use]
    pub fn content_contains(&self, matcher: &QueryMatcher) -> bool {
        self.mapping
            .values()
            .filter_map(|node| node.message.as_ref())
            .flat_map(|message| message.fragments.iter())
            .filter_map(|fragment| fragment.content.as_deref())
            .any(|content| matcher.is_match(content))
    }
}

impl AsRef<Conversation> for Conversation {
    fn as_ref(&self) -> &Conversation {
        self
    }
}

/// Id to node mapping of one conversation.
///
/// Lookup is by id only; iteration order follows the input but nothing
/// depends on it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct NodeMap(IndexMap<String, Node>);

impl NodeMap {
    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.0.get(id)
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains_key(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all nodes.
    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.0.values()
    }

    /// Iterate over `(id, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Node)> for NodeMap {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for NodeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut nodes = IndexMap::with_capacity(raw.len());

        for (id, value) in raw {
            match serde_json::from_value::<Node>(value) {
                Ok(node) => {
                    nodes.insert(id, node);
                }
                Err(e) => warn!(node = %id, error = %e, "Skipping malformed node"),
            }
        }

        Ok(Self(nodes))
    }
}

/// One node of the conversation tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    /// Node id as recorded by the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Parent node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Ordered child ids. Empty for leaves.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<String>,

    /// Message carried by this node. Structural nodes have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl Node {
    /// Whether this node offers alternative continuations.
    #[must_use]
    pub fn is_branch_point(&self) -> bool {
        self.children.len() > 1
    }

    /// Whether this node ends its path.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A message attached to a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Model that produced the message, e.g. `deepseek-reasoner`.
    #[serde(default)]
    pub model: Option<String>,

    /// When the message was recorded.
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<DateTime<Utc>>,

    /// Ordered content fragments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fragments: Vec<Fragment>,

    /// Producer fields this model does not interpret.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Message {
    /// Model name, empty when absent.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }

    /// Whether the message came from a reasoning model.
    #[must_use]
    pub fn is_reasoner(&self) -> bool {
        self.model() == "deepseek-reasoner"
    }

    /// Fragment type tags joined for a message header.
    #[must_use]
    pub fn type_summary(&self) -> String {
        if self.fragments.is_empty() {
            return "Unknown type".to_string();
        }
        self.fragments
            .iter()
            .map(|f| f.kind.as_str())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn conversation(value: Value) -> Conversation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_malformed_nodes_are_skipped() {
        let conv = conversation(json!({
            "id": "c1",
            "title": "Test",
            "inserted_at": "2025-01-28T10:00:00+00:00",
            "updated_at": "2025-01-28T11:00:00+00:00",
            "mapping": {
                "root": {"id": "root", "children": ["a"], "message": null},
                "a": {"id": "a", "children": "not-a-list"},
                "b": null
            }
        }));

        assert_eq!(conv.mapping.len(), 1);
        assert!(conv.mapping.contains_key("root"));
    }

    #[test]
    fn test_null_children_read_as_leaf() {
        let node: Node = serde_json::from_value(json!({"children": null})).unwrap();
        assert!(node.is_leaf());
        assert!(!node.is_branch_point());
    }

    #[test]
    fn test_display_title_placeholder() {
        let mut conv = conversation(json!({
            "id": "c1",
            "title": "",
            "inserted_at": "2025-01-28T10:00:00Z",
            "updated_at": "2025-01-28T10:00:00Z",
            "mapping": {}
        }));
        assert_eq!(conv.display_title(), UNTITLED);

        conv.title = Some("Rust lifetimes".to_string());
        assert_eq!(conv.display_title(), "Rust lifetimes");
        assert!(conv.title_contains(&QueryMatcher::new("LIFETIMES")));
    }

    #[test]
    fn test_message_type_summary() {
        let message: Message = serde_json::from_value(json!({
            "model": "deepseek-reasoner",
            "inserted_at": "2025-01-28T10:00:00Z",
            "fragments": [
                {"type": "THINK", "content": "hmm"},
                {"type": "RESPONSE", "content": "done"}
            ],
            "files": []
        }))
        .unwrap();

        assert_eq!(message.type_summary(), "THINK + RESPONSE");
        assert!(message.is_reasoner());
        assert!(message.extra.contains_key("files"));
        assert_eq!(Message::default().type_summary(), "Unknown type");
    }

    #[test]
    fn test_content_search_covers_every_branch() {
        let conv = conversation(json!({
            "id": "c1",
            "inserted_at": "2025-01-28T10:00:00Z",
            "updated_at": "2025-01-28T10:00:00Z",
            "mapping": {
                "root": {"children": ["a", "b"]},
                "a": {"children": [], "message": {"fragments": [{"type": "REQUEST", "content": "first"}]}},
                "b": {"children": [], "message": {"fragments": [{"type": "RESPONSE", "content": "Hidden Branch"}]}}
            }
        }));

        assert!(conv.content_contains(&QueryMatcher::new("hidden branch")));
        assert!(!conv.content_contains(&QueryMatcher::new("absent")));
    }
}
