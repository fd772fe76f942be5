//! Syntax highlighting for code blocks.
//!
//! Uses syntect with its bundled syntax and theme sets.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Global syntax set for highlighting.
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Global theme set for highlighting.
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Syntax highlighter for code blocks.
#[derive(Debug, Clone)]
pub struct SyntaxHighlighter {
    /// syntect theme name.
    theme_name: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter using a syntect theme.
    #[must_use]
    pub fn new(theme_name: impl Into<String>) -> Self {
        Self {
            theme_name: theme_name.into(),
        }
    }

    /// Whether syntect knows the language.
    #[must_use]
    pub fn supports(language: &str) -> bool {
        find_syntax(language).is_some()
    }

    /// Highlight a code block, one styled line per source line.
    ///
    /// Line endings are dropped. Unknown languages and themes fall back to
    /// unstyled lines.
    #[must_use]
    pub fn highlight_code(&self, code: &str, language: &str) -> Vec<Line<'static>> {
        let syntax = find_syntax(language).unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        let Some(theme) = THEME_SET
            .themes
            .get(&self.theme_name)
            .or_else(|| THEME_SET.themes.values().next())
        else {
            return code.lines().map(|line| Line::from(line.to_string())).collect();
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let Ok(ranges) = highlighter.highlight_line(line, &SYNTAX_SET) else {
                lines.push(Line::from(trim_line_ending(line).to_string()));
                continue;
            };

            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = trim_line_ending(text);
                    if text.is_empty() {
                        return None;
                    }
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    let mut ratatui_style = Style::default().fg(fg);

                    if style.font_style.contains(FontStyle::BOLD) {
                        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
                    }
                    if style.font_style.contains(FontStyle::ITALIC) {
                        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
                    }
                    if style.font_style.contains(FontStyle::UNDERLINE) {
                        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
                    }

                    Some(Span::styled(text.to_string(), ratatui_style))
                })
                .collect();

            lines.push(Line::from(spans));
        }

        lines
    }
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    SYNTAX_SET
        .find_syntax_by_token(language)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(language))
}

fn trim_line_ending(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_highlight_code_block() {
        let highlighter = SyntaxHighlighter::default();
        let code = "fn main() {\n    println!(\"Hello\");\n}\n";
        let lines = highlighter.highlight_code(code, "rust");

        assert_eq!(plain(&lines), ["fn main() {", "    println!(\"Hello\");", "}"]);
        assert!(lines[0].spans.len() > 1);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let highlighter = SyntaxHighlighter::default();
        let lines = highlighter.highlight_code("just text", "no-such-language");
        assert_eq!(plain(&lines), ["just text"]);
    }

    #[test]
    fn test_supports() {
        assert!(SyntaxHighlighter::supports("python"));
        assert!(SyntaxHighlighter::supports("rs"));
        assert!(!SyntaxHighlighter::supports("no-such-language"));
    }
}
