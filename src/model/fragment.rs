//! Message fragments.
//!
//! A message is an ordered list of typed fragments:
//! - `REQUEST`: the user's prompt
//! - `RESPONSE`: the model's answer
//! - `THINK`: the reasoning trace of a reasoner model
//! - `SEARCH`: web search results gathered for the answer
//!
//! Any other type tag is preserved as-is and shown as a structured dump.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Fragment type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// User prompt.
    Request,
    /// Model answer.
    Response,
    /// Reasoning trace.
    Think,
    /// Web search results.
    Search,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl FragmentKind {
    /// Classify a raw type tag. Tags are matched exactly.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "REQUEST" => Self::Request,
            "RESPONSE" => Self::Response,
            "THINK" => Self::Think,
            "SEARCH" => Self::Search,
            other => Self::Other(other.to_string()),
        }
    }

    /// The tag as it appears in the export.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
            Self::Think => "THINK",
            Self::Search => "SEARCH",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the fragment's content is markdown text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Request | Self::Response | Self::Think)
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One web search hit attached to a `SEARCH` fragment.
///
/// Fields are read leniently: a scalar of the wrong type is converted to
/// text where that makes sense and dropped otherwise, so one odd field never
/// hides the other results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    /// Page title.
    pub title: Option<String>,
    /// Text excerpt.
    pub snippet: Option<String>,
    /// Page URL.
    pub url: Option<String>,
    /// Publication time in unix seconds.
    pub published_at: Option<f64>,
    /// Name of the publishing site.
    pub site_name: Option<String>,
}

impl SearchResult {
    /// Read a result object. Returns `None` for anything but an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| match object.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        let published_at = match object.get("published_at") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        Some(Self {
            title: text("title"),
            snippet: text("snippet"),
            url: text("url"),
            published_at,
            site_name: text("site_name"),
        })
    }
}

impl<'de> Deserialize<'de> for SearchResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| serde::de::Error::custom("search result must be an object"))
    }
}

/// A typed unit of message content.
///
/// The raw JSON object is retained so unrecognized or malformed fragments
/// can be shown exactly as the producer wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Type tag.
    pub kind: FragmentKind,
    /// Text content, when the fragment carries a string `content` field.
    pub content: Option<String>,
    /// Search results, when `results` is an array of result objects.
    pub results: Option<Vec<SearchResult>>,
    raw: Value,
}

impl Fragment {
    /// Build a fragment from its raw JSON form.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .map_or_else(|| FragmentKind::Other(String::new()), FragmentKind::from_tag);
        let content = raw.get("content").and_then(Value::as_str).map(str::to_owned);
        let results = match raw.get("results") {
            Some(Value::Array(items)) => items.iter().map(SearchResult::from_value).collect(),
            _ => None,
        };

        Self {
            kind,
            content,
            results,
            raw,
        }
    }

    /// Convenience constructor for a text fragment.
    #[must_use]
    pub fn text(kind: FragmentKind, content: impl Into<String>) -> Self {
        let content = content.into();
        Self::from_value(serde_json::json!({
            "type": kind.as_str(),
            "content": content,
        }))
    }

    /// The raw JSON object.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Results to render as cards: present, well-formed and non-empty.
    #[must_use]
    pub fn result_cards(&self) -> Option<&[SearchResult]> {
        self.results.as_deref().filter(|results| !results.is_empty())
    }

    /// Pretty-printed JSON of the raw fragment.
    #[must_use]
    pub fn dump(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_roundtrip_tags() {
        assert_eq!(FragmentKind::from_tag("THINK"), FragmentKind::Think);
        assert_eq!(FragmentKind::from_tag("think"), FragmentKind::Other("think".into()));
        assert_eq!(FragmentKind::Other("TOOL".into()).to_string(), "TOOL");
        assert!(FragmentKind::Request.is_text());
        assert!(!FragmentKind::Search.is_text());
    }

    #[test]
    fn test_search_results_parsed() {
        let fragment = Fragment::from_value(json!({
            "type": "SEARCH",
            "results": [{"title": "Rust", "url": "https://rust-lang.org", "published_at": 1700000000}]
        }));

        let cards = fragment.result_cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title.as_deref(), Some("Rust"));
        assert_eq!(cards[0].published_at, Some(1_700_000_000.0));
        assert!(cards[0].site_name.is_none());
    }

    #[test]
    fn test_empty_results_have_no_cards() {
        let fragment = Fragment::from_value(json!({"type": "SEARCH", "results": []}));
        assert_eq!(fragment.results.as_deref(), Some(&[][..]));
        assert!(fragment.result_cards().is_none());
    }

    #[test]
    fn test_malformed_results_rejected() {
        let fragment = Fragment::from_value(json!({"type": "SEARCH", "results": ["oops"]}));
        assert!(fragment.results.is_none());

        let fragment = Fragment::from_value(json!({"type": "SEARCH", "results": {"title": "x"}}));
        assert!(fragment.results.is_none());
    }

    #[test]
    fn test_odd_result_fields_keep_the_cards() {
        let fragment = Fragment::from_value(json!({
            "type": "SEARCH",
            "results": [
                {"title": 404, "url": null, "snippet": ["x"], "published_at": "1700000000"},
                {"title": "Second", "site_name": "example.org"}
            ]
        }));

        let cards = fragment.result_cards().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title.as_deref(), Some("404"));
        assert!(cards[0].url.is_none());
        assert!(cards[0].snippet.is_none());
        assert_eq!(cards[0].published_at, Some(1_700_000_000.0));
        assert_eq!(cards[1].site_name.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_non_string_content_ignored() {
        let fragment = Fragment::from_value(json!({"type": "RESPONSE", "content": 42}));
        assert!(fragment.content.is_none());
        assert_eq!(fragment.raw()["content"], 42);
    }

    #[test]
    fn test_serializes_raw() {
        let raw = json!({"type": "TOOL", "name": "calc", "args": [1, 2]});
        let fragment = Fragment::from_value(raw.clone());
        assert_eq!(serde_json::to_value(&fragment).unwrap(), raw);
    }
}
