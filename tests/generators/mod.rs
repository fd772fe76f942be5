//! Synthetic conversation generators.
//!
//! Builds export-shaped JSON for conversations whose tree shape is given
//! as a parent list, so tests can cover arbitrary branching.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use deepseek_reader::model::Conversation;
use serde_json::{json, Map, Value};

/// Configuration for a generated conversation.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Conversation id.
    pub id: String,
    /// Title; `None` leaves it out.
    pub title: Option<String>,
    /// Creation time.
    pub inserted_at: DateTime<Utc>,
    /// Parent of node `i + 1`, as an index into earlier nodes. Node 0 hangs
    /// off the structural root.
    pub parents: Vec<usize>,
    /// Text placed in every request.
    pub request_text: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            id: "generated".to_string(),
            title: Some("Generated conversation".to_string()),
            inserted_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            parents: Vec::new(),
            request_text: "question".to_string(),
        }
    }
}

/// Node id for node `index`.
pub fn node_id(index: usize) -> String {
    format!("n{index}")
}

/// Export JSON for one conversation.
pub fn conversation_value(config: &ConversationConfig) -> Value {
    let count = config.parents.len() + 1;
    let mut children: Vec<Vec<String>> = vec![Vec::new(); count];
    for (i, parent) in config.parents.iter().enumerate() {
        children[*parent].push(node_id(i + 1));
    }

    let mut mapping = Map::new();
    mapping.insert(
        "root".to_string(),
        json!({"id": "root", "children": [node_id(0)]}),
    );
    for (i, kids) in children.iter().enumerate() {
        let (kind, content) = if i % 2 == 0 {
            ("REQUEST", format!("{} {i}", config.request_text))
        } else {
            ("RESPONSE", format!("answer {i}"))
        };
        let parent = if i == 0 {
            "root".to_string()
        } else {
            node_id(config.parents[i - 1])
        };
        mapping.insert(
            node_id(i),
            json!({
                "id": node_id(i),
                "parent": parent,
                "children": kids,
                "message": {
                    "model": "deepseek-chat",
                    "inserted_at": (config.inserted_at + Duration::minutes(i as i64)).to_rfc3339(),
                    "fragments": [{"type": kind, "content": content}]
                }
            }),
        );
    }

    let mut value = json!({
        "id": config.id,
        "inserted_at": config.inserted_at.to_rfc3339(),
        "updated_at": (config.inserted_at + Duration::hours(1)).to_rfc3339(),
        "mapping": mapping,
    });
    if let Some(title) = &config.title {
        value["title"] = json!(title);
    }
    value
}

/// Parsed conversation for a config.
pub fn conversation(config: &ConversationConfig) -> Conversation {
    serde_json::from_value(conversation_value(config)).expect("generated conversation is valid")
}

/// Conversation with the given parent list and default settings.
pub fn tree(parents: &[usize]) -> Conversation {
    conversation(&ConversationConfig {
        parents: parents.to_vec(),
        ..ConversationConfig::default()
    })
}

/// A balanced tree where every inner node has `fan_out` children.
pub fn balanced_parents(depth: usize, fan_out: usize) -> Vec<usize> {
    let mut parents = Vec::new();
    let mut level = vec![0usize];
    let mut next_index = 1;
    for _ in 0..depth {
        let mut next_level = Vec::new();
        for &parent in &level {
            for _ in 0..fan_out {
                parents.push(parent);
                next_level.push(next_index);
                next_index += 1;
            }
        }
        level = next_level;
    }
    parents
}

/// `count` conversations, one per day, titled and worded by index.
pub fn many(count: usize, parents: &[usize]) -> Vec<Conversation> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            conversation(&ConversationConfig {
                id: format!("conv-{i:05}"),
                title: Some(format!("Topic {} number {i}", ["rust", "python", "sql", "go"][i % 4])),
                inserted_at: start + Duration::days(i as i64),
                parents: parents.to_vec(),
                request_text: format!("keyword{}", i % 10),
            })
        })
        .collect()
}
