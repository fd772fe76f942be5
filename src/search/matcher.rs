//! Case-insensitive literal matching of the search query.
//!
//! Filtering, title statistics and highlighting all go through
//! [`QueryMatcher`], so a conversation kept by the filter is matched by the
//! same rules that highlight it.

use regex::{Regex, RegexBuilder};

/// Compiled search query.
#[derive(Debug, Clone, Default)]
pub struct QueryMatcher {
    query: String,
    pattern: Option<Regex>,
}

impl QueryMatcher {
    /// Compile `query`. Pattern syntax in it is escaped; an empty query
    /// matches nothing.
    #[must_use]
    pub fn new(query: &str) -> Self {
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self {
            query: query.to_string(),
            pattern,
        }
    }

    /// The query as entered.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the query is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Compiled pattern, if the query is not empty.
    #[must_use]
    pub const fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Whether `text` contains the query.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|pattern| pattern.is_match(text))
    }

    /// Number of non-overlapping matches in `text`.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, |pattern| pattern.find_iter(text).count())
    }
}

impl PartialEq for QueryMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
    }
}

impl Eq for QueryMatcher {}
