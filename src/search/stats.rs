//! Match statistics shown next to the search box.

use std::fmt;

use serde::Serialize;

use super::QueryMatcher;
use crate::model::Conversation;

/// Counts of query matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Listed conversations whose title contains the query.
    pub title_matches: usize,
    /// Highlighted occurrences in the open conversation's selected path.
    pub content_matches: usize,
}

impl SearchStats {
    /// Compute statistics for `query`.
    ///
    /// `content_matches` comes from the renderer, which counts highlights as
    /// it draws the open conversation. An empty query reports zero.
    #[must_use]
    pub fn compute<'a, I>(query: &str, listed: I, content_matches: usize) -> Self
    where
        I: IntoIterator<Item = &'a Conversation>,
    {
        let matcher = QueryMatcher::new(query);
        if matcher.is_empty() {
            return Self::default();
        }
        Self {
            title_matches: listed
                .into_iter()
                .filter(|conversation| conversation.title_contains(&matcher))
                .count(),
            content_matches,
        }
    }

    /// Total of both counts.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.title_matches + self.content_matches
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} title matches, {} content matches",
            self.title_matches, self.content_matches
        )
    }
}
