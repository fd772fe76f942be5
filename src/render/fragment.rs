//! Rendering of individual message fragments.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::highlight::QueryHighlighter;
use super::markdown::{CodeBlock, MarkdownRenderer};
use super::syntax::SyntaxHighlighter;
use super::theme::Theme;
use super::RenderOptions;
use crate::model::{timestamp, Fragment, FragmentKind, SearchResult};

/// Placeholder for search results without a publication time.
pub const UNKNOWN_DATE: &str = "Unknown date";
/// Placeholder for search results without a site name.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// One rendered fragment.
#[derive(Debug, Clone, Default)]
pub struct RenderedFragment {
    /// Styled lines.
    pub lines: Vec<Line<'static>>,
    /// Highlighted query occurrences.
    pub highlights: usize,
    /// Code blocks with the index of their first line in `lines`.
    pub code_blocks: Vec<(usize, CodeBlock)>,
}

/// Renders fragments by type.
#[derive(Debug)]
pub struct FragmentRenderer<'a> {
    theme: &'a Theme,
    syntax: &'a SyntaxHighlighter,
    query: &'a QueryHighlighter,
    options: &'a RenderOptions,
}

impl<'a> FragmentRenderer<'a> {
    /// Create a renderer.
    #[must_use]
    pub const fn new(
        theme: &'a Theme,
        syntax: &'a SyntaxHighlighter,
        query: &'a QueryHighlighter,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            theme,
            syntax,
            query,
            options,
        }
    }

    /// Render one fragment.
    ///
    /// - `REQUEST`, `RESPONSE`, `THINK`: markdown, with highlighted matches
    /// - `SEARCH` with results: one card per result
    /// - anything else, or `SEARCH` without usable results: the raw JSON
    #[must_use]
    pub fn render(&self, fragment: &Fragment) -> RenderedFragment {
        match &fragment.kind {
            kind if kind.is_text() => self.render_text(fragment),
            FragmentKind::Search => match fragment.result_cards() {
                Some(results) => self.render_results(results),
                None => self.render_dump(fragment),
            },
            _ => self.render_dump(fragment),
        }
    }

    fn render_text(&self, fragment: &Fragment) -> RenderedFragment {
        let content = fragment.content.as_deref().unwrap_or_default();
        let (marked, _) = self.query.mark(content);
        let base = match fragment.kind {
            FragmentKind::Think => self.theme.muted_style().add_modifier(Modifier::ITALIC),
            _ => Style::default(),
        };
        let rendered = MarkdownRenderer::new(self.theme, self.syntax).render(&marked, base);

        RenderedFragment {
            lines: rendered.lines,
            highlights: rendered.highlights,
            code_blocks: rendered.code_blocks,
        }
    }

    fn render_results(&self, results: &[SearchResult]) -> RenderedFragment {
        let highlight = self.theme.highlight_style();
        let muted = self.theme.muted_style();
        let mut out = RenderedFragment::default();

        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                out.lines.push(Line::default());
            }

            let title = result.title.as_deref().unwrap_or_default();
            out.highlights += self.query.count(title);
            let mut title_line = self.query.spans(title, self.theme.link_style(), highlight);
            if let Some(url) = result.url.as_deref().filter(|url| !url.is_empty()) {
                title_line.push(Span::styled(format!(" <{url}>"), muted));
            }
            out.lines.push(Line::from(title_line));

            let snippet = result.snippet.as_deref().unwrap_or_default();
            out.highlights += self.query.count(snippet);
            for line in snippet.lines() {
                out.lines.push(Line::from(self.query.spans(line, Style::default(), highlight)));
            }

            let date = result
                .published_at
                .and_then(timestamp::from_unix_seconds)
                .map_or_else(
                    || UNKNOWN_DATE.to_string(),
                    |dt| self.options.zone.format(&dt, &self.options.date_format),
                );
            let site = result
                .site_name
                .as_deref()
                .filter(|site| !site.is_empty())
                .unwrap_or(UNKNOWN_SOURCE);
            out.lines.push(Line::from(Span::styled(format!("{date} | {site}"), muted)));
        }

        out
    }

    fn render_dump(&self, fragment: &Fragment) -> RenderedFragment {
        let style = self.theme.muted_style();
        RenderedFragment {
            lines: fragment
                .dump()
                .lines()
                .map(|line| Line::from(Span::styled(line.to_string(), style)))
                .collect(),
            ..RenderedFragment::default()
        }
    }
}
