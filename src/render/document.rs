//! Whole-conversation rendering along the selected path.
//!
//! Rendered messages are cached by node id for the conversation currently
//! on screen. Switching a branch only renders the nodes that were not seen
//! before; the cache is dropped when the query, the theme, or the
//! conversation changes.

use std::collections::HashMap;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use serde::Serialize;
use tracing::trace;

use super::fragment::FragmentRenderer;
use super::highlight::QueryHighlighter;
use super::markdown::CodeBlock;
use super::syntax::SyntaxHighlighter;
use super::theme::Theme;
use super::RenderOptions;
use crate::branch::{BranchPoint, NodeStore, PathIdentity, SelectedPath};
use crate::model::{Conversation, Message};

const DIVIDER_WIDTH: usize = 24;

/// Position of a branch navigator in a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigatorAnchor {
    /// Line index of the navigator.
    pub line: usize,
    /// Branch point the navigator controls.
    pub identity: PathIdentity,
    /// Selected alternative (0-based).
    pub selected: usize,
    /// Number of alternatives.
    pub child_count: usize,
}

/// A conversation rendered along its selected path.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Styled lines.
    pub lines: Vec<Line<'static>>,
    /// Branch navigators, top to bottom.
    pub navigators: Vec<NavigatorAnchor>,
    /// First line of each message, with its node id.
    pub messages: Vec<(usize, String)>,
    /// Code blocks with the line index of their header.
    pub code_blocks: Vec<(usize, CodeBlock)>,
    /// Highlighted query occurrences in message content.
    pub highlights: usize,
}

impl Document {
    /// Navigator at or above `line`, if any.
    #[must_use]
    pub fn navigator_before(&self, line: usize) -> Option<&NavigatorAnchor> {
        self.navigators.iter().rev().find(|anchor| anchor.line <= line)
    }

    /// Code block whose header is at or above `line`.
    #[must_use]
    pub fn code_block_before(&self, line: usize) -> Option<&CodeBlock> {
        self.code_blocks
            .iter()
            .rev()
            .find(|(start, _)| *start <= line)
            .map(|(_, block)| block)
    }
}

#[derive(Debug, Clone)]
struct RenderedMessage {
    lines: Vec<Line<'static>>,
    code_blocks: Vec<(usize, CodeBlock)>,
    highlights: usize,
}

/// Renders conversations, caching message output between branch switches.
#[derive(Debug)]
pub struct DocumentRenderer {
    theme: Theme,
    syntax: SyntaxHighlighter,
    query: QueryHighlighter,
    options: RenderOptions,
    conversation: Option<String>,
    cache: HashMap<String, RenderedMessage>,
}

impl DocumentRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new(theme: Theme, options: RenderOptions) -> Self {
        Self {
            syntax: SyntaxHighlighter::new(theme.syntax_theme),
            theme,
            query: QueryHighlighter::default(),
            options,
            conversation: None,
            cache: HashMap::new(),
        }
    }

    /// Active theme.
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Active search query.
    #[must_use]
    pub fn query(&self) -> &str {
        self.query.query()
    }

    /// Display options.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Change the highlighted query. Returns `true` if it changed.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.query.query() == query {
            return false;
        }
        self.query = QueryHighlighter::new(query);
        self.invalidate();
        true
    }

    /// Change the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.syntax = SyntaxHighlighter::new(theme.syntax_theme);
        self.theme = theme;
        self.invalidate();
    }

    /// Drop all cached output.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Number of cached messages.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Render `conversation` along `path`.
    ///
    /// `focused` marks one navigator as selected.
    pub fn render(
        &mut self,
        conversation: &Conversation,
        path: &SelectedPath,
        focused: Option<&PathIdentity>,
    ) -> Document {
        if self.conversation.as_deref() != Some(conversation.id.as_str()) {
            self.invalidate();
            self.conversation = Some(conversation.id.clone());
        }

        let store = NodeStore::new(&conversation.mapping);
        let mut doc = Document::default();
        self.render_header(conversation, &mut doc);

        if path.is_empty() && path.branch_points().is_empty() {
            doc.lines
                .push(Line::from(Span::styled("No messages", self.theme.muted_style())));
            return doc;
        }

        for segment in path.segments() {
            for node_id in &segment.nodes {
                let Some(message) = store.get(node_id).and_then(|node| node.message.as_ref()) else {
                    continue;
                };
                let rendered = self.message(node_id, message);
                let base = doc.lines.len();

                doc.messages.push((base, node_id.clone()));
                doc.lines.extend(rendered.lines.iter().cloned());
                doc.code_blocks.extend(
                    rendered
                        .code_blocks
                        .iter()
                        .map(|(line, block)| (base + line, block.clone())),
                );
                doc.highlights += rendered.highlights;
                doc.lines.push(Line::default());
            }

            if let Some(bp) = &segment.branch {
                let focus = focused == Some(&bp.identity);
                doc.navigators.push(NavigatorAnchor {
                    line: doc.lines.len(),
                    identity: bp.identity.clone(),
                    selected: bp.selected,
                    child_count: bp.child_count,
                });
                doc.lines.push(self.navigator(bp, focus));
                doc.lines.push(Line::default());
            }
        }

        while doc.lines.last().is_some_and(|line| line.width() == 0) {
            doc.lines.pop();
        }
        doc
    }

    fn render_header(&self, conversation: &Conversation, doc: &mut Document) {
        let muted = self.theme.muted_style();
        doc.lines.push(Line::from(Span::styled(
            conversation.display_title().to_string(),
            Style::default().fg(self.theme.primary).add_modifier(Modifier::BOLD),
        )));
        doc.lines.push(Line::from(Span::styled(
            format!(
                "Started {} | Ended {}",
                self.format_time(&conversation.inserted_at),
                self.format_time(&conversation.updated_at)
            ),
            muted,
        )));
        doc.lines.push(Line::from(Span::styled("═".repeat(DIVIDER_WIDTH * 2), muted)));
        doc.lines.push(Line::default());
    }

    fn format_time(&self, dt: &chrono::DateTime<chrono::Utc>) -> String {
        self.options.zone.format(dt, &self.options.datetime_format)
    }

    fn message(&mut self, node_id: &str, message: &Message) -> &RenderedMessage {
        if !self.cache.contains_key(node_id) {
            trace!(node = node_id, "Rendering message");
            let rendered = self.render_message(message);
            self.cache.insert(node_id.to_string(), rendered);
        }
        &self.cache[node_id]
    }

    fn render_message(&self, message: &Message) -> RenderedMessage {
        let theme = &self.theme;
        let muted = theme.muted_style();
        let time = message
            .inserted_at
            .as_ref()
            .map(|dt| self.format_time(dt))
            .unwrap_or_default();

        let mut header = vec![Span::styled(
            format!("▌ {}", message.type_summary()),
            Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
        )];
        if !message.model().is_empty() {
            header.push(Span::raw("  "));
            header.push(Span::styled(
                format!("[{}]", message.model()),
                theme.model_style(message.is_reasoner()),
            ));
        }
        if !time.is_empty() {
            header.push(Span::styled(format!("  {time}"), muted));
        }

        let mut out = RenderedMessage {
            lines: vec![Line::from(header)],
            code_blocks: Vec::new(),
            highlights: 0,
        };

        let renderer = FragmentRenderer::new(theme, &self.syntax, &self.query, &self.options);
        for (i, fragment) in message.fragments.iter().enumerate() {
            if i > 0 {
                out.lines.push(Line::from(Span::styled("┄".repeat(DIVIDER_WIDTH), muted)));
            }

            let mut fragment_header = vec![Span::styled(
                fragment.kind.to_string(),
                theme.fragment_style(&fragment.kind).add_modifier(Modifier::BOLD),
            )];
            if !time.is_empty() {
                fragment_header.push(Span::styled(format!(" · {time}"), muted));
            }
            out.lines.push(Line::from(fragment_header));

            let rendered = renderer.render(fragment);
            let base = out.lines.len();
            out.code_blocks
                .extend(rendered.code_blocks.into_iter().map(|(line, block)| (base + line, block)));
            out.lines.extend(rendered.lines);
            out.highlights += rendered.highlights;
        }

        out
    }

    fn navigator(&self, bp: &BranchPoint, focused: bool) -> Line<'static> {
        let theme = &self.theme;
        let arrow = |enabled: bool| {
            if enabled {
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
            } else {
                theme.muted_style()
            }
        };
        let counter = if focused {
            theme.selection_style()
        } else {
            theme.text_style()
        };

        Line::from(vec![
            Span::styled("◀", arrow(bp.has_previous())),
            Span::styled(format!(" {} / {} ", bp.selected + 1, bp.child_count), counter),
            Span::styled("▶", arrow(bp.has_next())),
            Span::styled(format!("  branch at {}", bp.identity), theme.muted_style()),
        ])
    }
}
