//! Color themes shared by the CLI renderer and the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::model::FragmentKind;

/// Rendering theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Name of the theme.
    pub name: &'static str,
    /// Background color.
    pub background: Color,
    /// Foreground color.
    pub foreground: Color,
    /// Secondary text (timestamps, placeholders).
    pub muted: Color,
    /// Primary accent color.
    pub primary: Color,
    /// Border color (unfocused).
    pub border: Color,
    /// Border color (focused).
    pub border_focused: Color,
    /// Selection highlight.
    pub selection: Color,
    /// Request fragments.
    pub request: Color,
    /// Response fragments.
    pub response: Color,
    /// Reasoning fragments.
    pub think: Color,
    /// Search result fragments.
    pub search: Color,
    /// Model tag of reasoner messages.
    pub reasoner: Color,
    /// Model tag of chat messages.
    pub chat: Color,
    /// Search match foreground.
    pub highlight_fg: Color,
    /// Search match background.
    pub highlight_bg: Color,
    /// Links.
    pub link: Color,
    /// Error color.
    pub error: Color,
    /// Success color.
    pub success: Color,
    /// syntect theme for code blocks.
    pub syntax_theme: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// The default dark theme.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            primary: Color::Cyan,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selection: Color::DarkGray,
            request: Color::Green,
            response: Color::Blue,
            think: Color::Magenta,
            search: Color::Yellow,
            reasoner: Color::Magenta,
            chat: Color::Cyan,
            highlight_fg: Color::Black,
            highlight_bg: Color::Yellow,
            link: Color::LightBlue,
            error: Color::Red,
            success: Color::Green,
            syntax_theme: "base16-ocean.dark",
        }
    }

    /// A light theme.
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            primary: Color::Blue,
            border: Color::Gray,
            border_focused: Color::Blue,
            selection: Color::LightBlue,
            request: Color::Green,
            response: Color::Blue,
            think: Color::Magenta,
            search: Color::Rgb(160, 110, 0),
            reasoner: Color::Magenta,
            chat: Color::Blue,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
            link: Color::Blue,
            error: Color::Red,
            success: Color::Green,
            syntax_theme: "InspiredGitHub",
        }
    }

    /// A high contrast theme.
    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast",
            background: Color::Black,
            foreground: Color::White,
            muted: Color::Gray,
            primary: Color::Yellow,
            border: Color::White,
            border_focused: Color::Yellow,
            selection: Color::White,
            request: Color::Green,
            response: Color::Cyan,
            think: Color::Magenta,
            search: Color::Yellow,
            reasoner: Color::Magenta,
            chat: Color::Cyan,
            highlight_fg: Color::Black,
            highlight_bg: Color::Yellow,
            link: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            syntax_theme: "base16-eighties.dark",
        }
    }

    /// Get theme by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "high-contrast" | "highcontrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// The theme after this one in [`available_themes`].
    #[must_use]
    pub fn next(&self) -> Self {
        let themes = available_themes();
        let position = themes.iter().position(|name| *name == self.name).unwrap_or(0);
        let next = themes[(position + 1) % themes.len()];
        Self::from_name(next).unwrap_or_default()
    }

    /// Base text style.
    #[must_use]
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Style for secondary text.
    #[must_use]
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Get style for borders (unfocused).
    #[must_use]
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get style for focused borders.
    #[must_use]
    pub fn border_focused_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Get style for selected items.
    #[must_use]
    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for search matches.
    #[must_use]
    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a fragment header.
    #[must_use]
    pub fn fragment_style(&self, kind: &FragmentKind) -> Style {
        let color = match kind {
            FragmentKind::Request => self.request,
            FragmentKind::Response => self.response,
            FragmentKind::Think => self.think,
            FragmentKind::Search => self.search,
            FragmentKind::Other(_) => self.muted,
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if matches!(kind, FragmentKind::Think) {
            style.add_modifier(Modifier::ITALIC)
        } else {
            style
        }
    }

    /// Style for a message's model tag.
    #[must_use]
    pub fn model_style(&self, reasoner: bool) -> Style {
        let color = if reasoner { self.reasoner } else { self.chat };
        Style::default().fg(color).add_modifier(Modifier::REVERSED)
    }

    /// Style for links.
    #[must_use]
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Get style for errors.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for success.
    #[must_use]
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }
}

/// Available themes list.
#[must_use]
pub fn available_themes() -> Vec<&'static str> {
    vec!["dark", "light", "high-contrast"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("LIGHT").map(|t| t.name), Some("light"));
        assert_eq!(Theme::from_name("highcontrast").map(|t| t.name), Some("high-contrast"));
        assert!(Theme::from_name("solarized").is_none());
    }

    #[test]
    fn test_cycle_wraps() {
        let theme = Theme::dark();
        let names: Vec<_> = std::iter::successors(Some(theme), |t| Some(t.next()))
            .take(4)
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["dark", "light", "high-contrast", "dark"]);
    }
}
