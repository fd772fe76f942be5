//! Reusable TUI components.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::render::Theme;

/// A scrollable text view.
///
/// Scrolling is by document line; lines below the top one wrap to the
/// panel width.
pub struct ScrollableText<'a> {
    title: String,
    content: &'a [Line<'static>],
    scroll: usize,
    focused: bool,
}

impl<'a> ScrollableText<'a> {
    /// Create a new scrollable text view.
    pub fn new(title: impl Into<String>, content: &'a [Line<'static>]) -> Self {
        Self {
            title: title.into(),
            content,
            scroll: 0,
            focused: false,
        }
    }

    /// Set scroll position.
    #[must_use]
    pub const fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set focused state.
    #[must_use]
    pub const fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Render the component.
    pub fn render(self, f: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.focused {
            theme.border_focused_style()
        } else {
            theme.border_style()
        };

        let visible: Vec<Line> = self
            .content
            .iter()
            .skip(self.scroll)
            .take(usize::from(area.height.saturating_sub(2)))
            .cloned()
            .collect();

        let paragraph = Paragraph::new(visible)
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .style(theme.text_style())
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }
}

/// A status bar component.
#[derive(Default)]
pub struct StatusBar<'a> {
    left: Vec<Span<'a>>,
    right: Vec<Span<'a>>,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add left-aligned content.
    #[must_use]
    pub fn left(mut self, spans: Vec<Span<'a>>) -> Self {
        self.left = spans;
        self
    }

    /// Add right-aligned content.
    #[must_use]
    pub fn right(mut self, spans: Vec<Span<'a>>) -> Self {
        self.right = spans;
        self
    }

    /// Build the padded line for a bar `width` columns wide.
    pub fn line(self, width: u16) -> Line<'a> {
        let used: usize = self.left.iter().chain(&self.right).map(Span::width).sum();
        let padding = usize::from(width).saturating_sub(used).max(1);

        let mut spans = self.left;
        spans.push(Span::raw(" ".repeat(padding)));
        spans.extend(self.right);
        Line::from(spans)
    }

    /// Render the status bar.
    pub fn render(self, f: &mut Frame, area: Rect, style: Style) {
        let line = self.line(area.width);
        f.render_widget(Paragraph::new(line).style(style), area);
    }
}

/// First list row to draw so that `selected` stays within `height` rows.
#[must_use]
pub const fn list_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return selected;
    }
    selected.saturating_sub(height - 1)
}

/// Create a centered rectangle.
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
