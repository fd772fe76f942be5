//! Markdown to styled terminal lines.
//!
//! Input text may already carry search markers (see [`super::highlight`]).
//! Prose resolves them into the highlight style as it is emitted. Code
//! blocks strip them before syntax highlighting and lay the highlight back
//! over the syntect output, so matches stay visible inside code.

use pulldown_cmark::{CodeBlockKind, Event as MdEvent, Options, Parser as MdParser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use serde::Serialize;

use super::highlight::{extract_ranges, marked_spans, overlay, strip_markers, MARK_START};
use super::language::resolve_language;
use super::syntax::SyntaxHighlighter;
use super::theme::Theme;

const CODE_RULE_WIDTH: usize = 40;

/// A fenced or indented code block found while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Declared or detected language.
    pub language: String,
    /// Code text without search markers.
    pub code: String,
}

/// Output of rendering one markdown document.
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    /// Styled lines.
    pub lines: Vec<Line<'static>>,
    /// Code blocks with the index of their header line in `lines`.
    pub code_blocks: Vec<(usize, CodeBlock)>,
    /// Highlighted matches that made it into `lines`.
    pub highlights: usize,
}

#[derive(Clone, Copy)]
enum ListKind {
    Bullet,
    Ordered(u64),
}

/// Renders markdown with a theme and a syntax highlighter.
#[derive(Debug)]
pub struct MarkdownRenderer<'a> {
    theme: &'a Theme,
    syntax: &'a SyntaxHighlighter,
}

impl<'a> MarkdownRenderer<'a> {
    /// Create a renderer.
    #[must_use]
    pub const fn new(theme: &'a Theme, syntax: &'a SyntaxHighlighter) -> Self {
        Self { theme, syntax }
    }

    /// Render `text` with `base` as the paragraph style.
    #[must_use]
    pub fn render(&self, text: &str, base: Style) -> RenderedMarkdown {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut state = State::new(self, base);
        for event in MdParser::new_ext(text, options) {
            state.handle(event);
        }
        state.finish()
    }
}

struct State<'r, 'a> {
    renderer: &'r MarkdownRenderer<'a>,
    out: RenderedMarkdown,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    marked: bool,
    quote_depth: usize,
    lists: Vec<ListKind>,
    heading: Option<usize>,
    link: Option<String>,
    code: Option<(String, String)>,
}

impl<'r, 'a> State<'r, 'a> {
    fn new(renderer: &'r MarkdownRenderer<'a>, base: Style) -> Self {
        Self {
            renderer,
            out: RenderedMarkdown::default(),
            current: Vec::new(),
            styles: vec![base],
            marked: false,
            quote_depth: 0,
            lists: Vec::new(),
            heading: None,
            link: None,
            code: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn text(&mut self, text: &str, style: Style) {
        let highlight = self.renderer.theme.highlight_style();
        self.out.highlights += text.matches(MARK_START).count();
        let spans = marked_spans(text, &mut self.marked, style, highlight);
        self.current.extend(spans);
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        if self.quote_depth > 0 {
            spans.push(Span::styled("│ ".repeat(self.quote_depth), self.renderer.theme.muted_style()));
        }
        spans.append(&mut self.current);
        self.out.lines.push(Line::from(spans));
    }

    fn blank(&mut self) {
        if self.out.lines.last().is_some_and(|line| line.width() > 0) {
            self.out.lines.push(Line::default());
        }
    }

    fn handle(&mut self, event: MdEvent<'_>) {
        if let Some((_, buffer)) = self.code.as_mut() {
            match event {
                MdEvent::Text(text) => buffer.push_str(&text),
                MdEvent::End(TagEnd::CodeBlock) => self.end_code_block(),
                _ => {}
            }
            return;
        }

        let theme = self.renderer.theme;
        match event {
            MdEvent::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    self.flush();
                    self.heading = Some(level as usize);
                    let primary = theme.primary;
                    self.push_style(|s| s.fg(primary).add_modifier(Modifier::BOLD));
                }
                Tag::BlockQuote(_) => {
                    self.flush();
                    self.quote_depth += 1;
                    self.push_style(|s| s.add_modifier(Modifier::ITALIC));
                }
                Tag::List(start) => {
                    self.flush();
                    self.lists.push(start.map_or(ListKind::Bullet, ListKind::Ordered));
                }
                Tag::Item => {
                    self.flush();
                    let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                    let bullet = match self.lists.last_mut() {
                        Some(ListKind::Ordered(n)) => {
                            let bullet = format!("{indent}{n}. ");
                            *n += 1;
                            bullet
                        }
                        _ => format!("{indent}• "),
                    };
                    self.current.push(Span::styled(bullet, theme.muted_style()));
                }
                Tag::CodeBlock(kind) => {
                    self.flush();
                    let info = match kind {
                        CodeBlockKind::Fenced(info) => info.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    self.code = Some((info, String::new()));
                }
                Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
                Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
                Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),
                Tag::Link { dest_url, .. } => {
                    self.link = Some(strip_markers(&dest_url).into_owned());
                    let link = theme.link_style();
                    self.push_style(|s| s.patch(link));
                }
                _ => {}
            },
            MdEvent::End(tag_end) => match tag_end {
                TagEnd::Paragraph => {
                    self.flush();
                    self.blank();
                }
                TagEnd::Heading(_) => {
                    self.pop_style();
                    self.heading = None;
                    self.flush();
                    self.blank();
                }
                TagEnd::BlockQuote(_) => {
                    self.pop_style();
                    self.flush();
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                    self.blank();
                }
                TagEnd::List(_) => {
                    self.flush();
                    self.lists.pop();
                    if self.lists.is_empty() {
                        self.blank();
                    }
                }
                TagEnd::Item | TagEnd::TableHead | TagEnd::TableRow => self.flush(),
                TagEnd::TableCell => self.current.push(Span::styled(" │ ", theme.muted_style())),
                TagEnd::Link => {
                    self.pop_style();
                    if let Some(url) = self.link.take().filter(|url| !url.is_empty()) {
                        self.current.push(Span::styled(format!(" <{url}>"), theme.muted_style()));
                    }
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
                _ => {}
            },
            MdEvent::Text(text) => {
                if let Some(level) = self.heading.filter(|_| self.current.is_empty()) {
                    self.current.push(Span::styled(format!("{} ", "#".repeat(level)), theme.muted_style()));
                }
                let style = self.style();
                self.text(&text, style);
            }
            MdEvent::Code(code) => {
                let style = self.style().fg(theme.primary).add_modifier(Modifier::BOLD);
                self.text(&code, style);
            }
            MdEvent::Html(html) | MdEvent::InlineHtml(html) => {
                let style = theme.muted_style();
                self.text(html.trim_end_matches('\n'), style);
                if html.ends_with('\n') {
                    self.flush();
                }
            }
            MdEvent::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.current.push(Span::styled(marker, theme.muted_style()));
            }
            MdEvent::SoftBreak => self.current.push(Span::raw(" ")),
            MdEvent::HardBreak => self.flush(),
            MdEvent::Rule => {
                self.flush();
                self.out.lines.push(Line::from(Span::styled("─".repeat(CODE_RULE_WIDTH), theme.muted_style())));
                self.blank();
            }
            _ => {}
        }
    }

    fn end_code_block(&mut self) {
        let Some((info, marked)) = self.code.take() else {
            return;
        };
        let theme = self.renderer.theme;
        let border = theme.muted_style();
        let (code, ranges) = extract_ranges(&marked);
        let code = code.trim_end_matches('\n').to_string();
        let language = resolve_language(&strip_markers(&info), &code);
        self.out.highlights += ranges.len();

        let header = format!("┌─ {} ", language.to_uppercase());
        let fill = CODE_RULE_WIDTH.saturating_sub(header.chars().count());
        let start = self.out.lines.len();
        self.out.lines.push(Line::from(Span::styled(format!("{header}{}", "─".repeat(fill)), border)));

        let highlighted = self.renderer.syntax.highlight_code(&code, &language);
        let mut offset = 0;
        for (source, line) in code.split('\n').zip(highlighted) {
            let line_ranges: Vec<_> = ranges
                .iter()
                .filter(|r| r.start < offset + source.len() && r.end > offset)
                .map(|r| r.start.max(offset) - offset..r.end.min(offset + source.len()) - offset)
                .collect();
            let line = overlay(line, &line_ranges, theme.highlight_style());

            let mut spans = vec![Span::styled("│ ", border)];
            spans.extend(line.spans);
            self.out.lines.push(Line::from(spans));
            offset += source.len() + 1;
        }

        self.out.lines.push(Line::from(Span::styled(format!("└{}", "─".repeat(CODE_RULE_WIDTH - 1)), border)));
        self.out.code_blocks.push((start, CodeBlock { language, code }));
        self.blank();
    }

    fn finish(mut self) -> RenderedMarkdown {
        if self.code.is_some() {
            self.end_code_block();
        }
        self.flush();
        while self.out.lines.last().is_some_and(|line| line.width() == 0) {
            self.out.lines.pop();
        }
        self.out
    }
}
