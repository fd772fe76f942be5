//! Search match highlighting.
//!
//! Matches are wrapped in private-use marker characters before any markdown
//! or structural rendering, so they survive into the styled output no matter
//! how the text is later split into spans. Renderers turn the markers into
//! the highlight style and strip them from everything else.

use std::borrow::Cow;
use std::ops::Range;

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::search::QueryMatcher;

/// Opens a highlighted match.
pub const MARK_START: char = '\u{E000}';
/// Closes a highlighted match.
pub const MARK_END: char = '\u{E001}';

/// Marks matches of the active search query.
#[derive(Debug, Clone, Default)]
pub struct QueryHighlighter {
    matcher: QueryMatcher,
}

impl QueryHighlighter {
    /// Build a highlighter. An empty query highlights nothing.
    ///
    /// The query is matched literally: pattern syntax in it is escaped.
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            matcher: QueryMatcher::new(query),
        }
    }

    /// The query text.
    #[must_use]
    pub fn query(&self) -> &str {
        self.matcher.query()
    }

    /// Whether there is anything to highlight.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.matcher.is_empty()
    }

    /// Wrap every match in markers, returning the marked text and the number
    /// of matches.
    #[must_use]
    pub fn mark<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize) {
        let Some(pattern) = self.matcher.pattern() else {
            return (Cow::Borrowed(text), 0);
        };
        let mut count = 0;
        let marked = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            count += 1;
            format!("{MARK_START}{}{MARK_END}", &caps[0])
        });
        (marked, count)
    }

    /// Number of matches in `text`.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.matcher.count(text)
    }

    /// Split `text` into plain and highlighted spans.
    #[must_use]
    pub fn spans(&self, text: &str, base: Style, highlight: Style) -> Vec<Span<'static>> {
        let (marked, _) = self.mark(text);
        let mut active = false;
        marked_spans(&marked, &mut active, base, highlight)
    }
}

/// Remove all markers.
#[must_use]
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    if text.contains([MARK_START, MARK_END]) {
        Cow::Owned(text.chars().filter(|c| *c != MARK_START && *c != MARK_END).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Turn marked text into spans.
///
/// `active` carries an open match across calls, for text the markdown parser
/// delivers in several pieces.
#[must_use]
pub fn marked_spans(text: &str, active: &mut bool, base: Style, highlight: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut buffer = String::new();

    let flush = |buffer: &mut String, spans: &mut Vec<Span<'static>>, active: bool| {
        if !buffer.is_empty() {
            let style = if active { base.patch(highlight) } else { base };
            spans.push(Span::styled(std::mem::take(buffer), style));
        }
    };

    for c in text.chars() {
        match c {
            MARK_START => {
                flush(&mut buffer, &mut spans, *active);
                *active = true;
            }
            MARK_END => {
                flush(&mut buffer, &mut spans, *active);
                *active = false;
            }
            _ => buffer.push(c),
        }
    }
    flush(&mut buffer, &mut spans, *active);
    spans
}

/// Strip markers, returning the plain text and the byte ranges of the
/// highlighted regions within it.
#[must_use]
pub fn extract_ranges(text: &str) -> (String, Vec<Range<usize>>) {
    let mut plain = String::with_capacity(text.len());
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;

    for c in text.chars() {
        match c {
            MARK_START => open = Some(plain.len()),
            MARK_END => {
                if let Some(start) = open.take() {
                    if start < plain.len() {
                        ranges.push(start..plain.len());
                    }
                }
            }
            _ => plain.push(c),
        }
    }
    if let Some(start) = open {
        if start < plain.len() {
            ranges.push(start..plain.len());
        }
    }
    (plain, ranges)
}

/// Apply `style` over byte `ranges` of an already styled line.
///
/// Ranges are relative to the start of the line's text and must be sorted
/// and non-overlapping.
#[must_use]
pub fn overlay(line: Line<'static>, ranges: &[Range<usize>], style: Style) -> Line<'static> {
    if ranges.is_empty() {
        return line;
    }

    let mut spans = Vec::with_capacity(line.spans.len() + ranges.len() * 2);
    let mut offset = 0;

    for span in line.spans {
        let text = span.content.as_ref();
        let (start, end) = (offset, offset + text.len());
        let mut cursor = 0;

        for range in ranges.iter().filter(|r| r.start < end && r.end > start) {
            let from = range.start.max(start) - start;
            let to = range.end.min(end) - start;
            if let Some(before) = text.get(cursor..from).filter(|s| !s.is_empty()) {
                spans.push(Span::styled(before.to_string(), span.style));
            }
            if let Some(hit) = text.get(from..to) {
                spans.push(Span::styled(hit.to_string(), span.style.patch(style)));
            }
            cursor = to;
        }
        if let Some(rest) = text.get(cursor..).filter(|s| !s.is_empty()) {
            spans.push(Span::styled(rest.to_string(), span.style));
        }
        offset = end;
    }

    Line::from(spans).style(line.style)
}
