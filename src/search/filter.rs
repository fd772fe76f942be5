//! Query and date-range filtering of conversations.

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::QueryMatcher;
use crate::model::Conversation;
use crate::util::Zone;

/// Inclusive bounds on a conversation's start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Earliest accepted start time.
    pub start: Option<DateTime<Utc>>,
    /// Latest accepted start time.
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Range covering whole calendar days in `zone`.
    ///
    /// `from` starts at 00:00:00.000 and `to` ends at 23:59:59.999.
    #[must_use]
    pub fn from_dates(zone: Zone, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            start: from.and_then(|date| zone.start_of_day(date)),
            end: to.and_then(|date| zone.end_of_day(date)),
        }
    }

    /// Whether neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `at` lies within the range.
    ///
    /// Comparison is at millisecond precision, so sub-millisecond digits
    /// past 23:59:59.999 still fall on the end date.
    #[must_use]
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let at = at.timestamp_millis();
        self.start.map_or(true, |start| at >= start.timestamp_millis())
            && self.end.map_or(true, |end| at <= end.timestamp_millis())
    }
}

/// A search query combined with a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    matcher: QueryMatcher,
    range: DateRange,
}

impl ConversationFilter {
    /// Build a filter. The query is matched case-insensitively.
    #[must_use]
    pub fn new(query: &str, range: DateRange) -> Self {
        Self {
            matcher: QueryMatcher::new(query),
            range,
        }
    }

    /// The query as entered.
    #[must_use]
    pub fn query(&self) -> &str {
        self.matcher.query()
    }

    /// The compiled query.
    #[must_use]
    pub const fn matcher(&self) -> &QueryMatcher {
        &self.matcher
    }

    /// The date range.
    #[must_use]
    pub const fn range(&self) -> &DateRange {
        &self.range
    }

    /// Whether the filter accepts everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty() && self.range.is_unbounded()
    }

    /// Whether `conversation` passes the filter.
    #[must_use]
    pub fn matches(&self, conversation: &Conversation) -> bool {
        if !self.range.contains(&conversation.inserted_at) {
            return false;
        }
        self.matcher.is_empty()
            || conversation.title_contains(&self.matcher)
            || conversation.content_contains(&self.matcher)
    }

    /// Indices of the conversations that pass, in input order.
    pub fn apply<C>(&self, conversations: &[C]) -> Vec<usize>
    where
        C: AsRef<Conversation> + Sync,
    {
        let kept: Vec<usize> = conversations
            .par_iter()
            .enumerate()
            .filter(|(_, conversation)| self.matches(conversation.as_ref()))
            .map(|(index, _)| index)
            .collect();
        debug!(
            total = conversations.len(),
            kept = kept.len(),
            query = %self.matcher.query(),
            "Filtered conversations"
        );
        kept
    }
}

/// Filter conversations, preserving input order.
pub fn filter<'a, C>(conversations: &'a [C], query: &str, range: DateRange) -> Vec<&'a C>
where
    C: AsRef<Conversation> + Sync,
{
    ConversationFilter::new(query, range)
        .apply(conversations)
        .into_iter()
        .map(|index| &conversations[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::time::parse_date;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn conversation(id: &str, title: Option<&str>, inserted_at: &str, content: &str) -> Conversation {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "inserted_at": inserted_at,
            "updated_at": inserted_at,
            "mapping": {
                "root": {"children": ["m"]},
                "m": {"children": [], "message": {"fragments": [{"type": "REQUEST", "content": content}]}}
            }
        }))
        .unwrap()
    }

    fn ids(list: &[&Conversation]) -> Vec<String> {
        list.iter().map(|c| c.id.clone()).collect()
    }

    fn sample() -> Vec<Conversation> {
        vec![
            conversation("a", Some("Rust Lifetimes"), "2025-03-01T08:00:00Z", "borrow checker"),
            conversation("b", None, "2025-03-02T08:00:00Z", "Talk about LIFETIMES here"),
            conversation("c", Some("Cooking"), "2025-03-03T23:59:59.999Z", "pasta"),
        ]
    }

    #[test]
    fn test_query_matches_title_or_content() {
        let all = sample();
        let found = filter(&all, "lifetimes", DateRange::default());
        assert_eq!(ids(&found), ["a", "b"]);
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let all = sample();
        assert_eq!(filter(&all, "", DateRange::default()).len(), 3);
        assert!(ConversationFilter::new("", DateRange::default()).is_empty());
    }

    #[test]
    fn test_end_of_day_is_inclusive() {
        let all = sample();
        let day = parse_date("2025-03-03").unwrap();
        let range = DateRange::from_dates(Zone::Utc, Some(day), Some(day));
        assert_eq!(ids(&filter(&all, "", range)), ["c"]);

        let before = parse_date("2025-03-02").unwrap();
        let range = DateRange::from_dates(Zone::Utc, None, Some(before));
        assert_eq!(ids(&filter(&all, "", range)), ["a", "b"]);
    }

    #[test]
    fn test_end_plus_one_day_excluded() {
        let range = DateRange::from_dates(Zone::Utc, None, parse_date("2025-03-01"));
        let end = range.end.unwrap();
        assert!(range.contains(&(end)));
        assert!(!range.contains(&(end + chrono::Duration::milliseconds(1))));
        assert!(!range.contains(&(end + chrono::Duration::days(1))));
    }

    #[test]
    fn test_microseconds_before_midnight_stay_on_end_date() {
        let all = vec![
            conversation("late", Some("Late"), "2025-03-01T23:59:59.999500Z", "x"),
            conversation("next", Some("Next"), "2025-03-02T00:00:00Z", "x"),
        ];
        let day = parse_date("2025-03-01");
        let range = DateRange::from_dates(Zone::Utc, day, day);
        assert_eq!(ids(&filter(&all, "", range)), ["late"]);

        let range = DateRange::from_dates(Zone::Utc, parse_date("2025-03-02"), None);
        assert_eq!(ids(&filter(&all, "", range)), ["next"]);
    }

    #[test]
    fn test_query_folds_unicode_case_like_highlighting() {
        let all = vec![conversation("k", Some("\u{212A}elvin scale"), "2025-03-01T08:00:00Z", "x")];
        assert_eq!(ids(&filter(&all, "kelvin", DateRange::default())), ["k"]);
        assert_eq!(crate::render::QueryHighlighter::new("kelvin").count("\u{212A}elvin scale"), 1);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let all = sample();
        let once: Vec<Conversation> = filter(&all, "e", DateRange::default())
            .into_iter()
            .cloned()
            .collect();
        let twice = filter(&once, "e", DateRange::default());
        assert_eq!(ids(&twice), once.iter().map(|c| c.id.clone()).collect::<Vec<_>>());
    }
}
