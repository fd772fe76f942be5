//! Styled lines to ANSI text for non-interactive output.

use console::{Color as AnsiColor, Style as AnsiStyle};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

/// Render one line as a string, with escape codes when `color` is set.
#[must_use]
pub fn line_to_ansi(line: &Line<'_>, color: bool) -> String {
    line.spans
        .iter()
        .map(|span| {
            if color {
                to_console(line.style.patch(span.style))
                    .force_styling(true)
                    .apply_to(span.content.as_ref())
                    .to_string()
            } else {
                span.content.to_string()
            }
        })
        .collect()
}

/// Render lines joined by newlines.
#[must_use]
pub fn lines_to_ansi(lines: &[Line<'_>], color: bool) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line_to_ansi(line, color));
        out.push('\n');
    }
    out
}

fn to_console(style: Style) -> AnsiStyle {
    let mut out = AnsiStyle::new();
    if let Some(fg) = style.fg.and_then(to_console_color) {
        out = out.fg(fg);
    }
    if let Some(bg) = style.bg.and_then(to_console_color) {
        out = out.bg(bg);
    }
    let modifiers = style.add_modifier.difference(style.sub_modifier);
    if modifiers.contains(Modifier::BOLD) {
        out = out.bold();
    }
    if modifiers.contains(Modifier::DIM) {
        out = out.dim();
    }
    if modifiers.contains(Modifier::ITALIC) {
        out = out.italic();
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        out = out.underlined();
    }
    if modifiers.contains(Modifier::CROSSED_OUT) {
        out = out.strikethrough();
    }
    if modifiers.contains(Modifier::REVERSED) {
        out = out.reverse();
    }
    out
}

fn to_console_color(color: Color) -> Option<AnsiColor> {
    Some(match color {
        Color::Reset => return None,
        Color::Black => AnsiColor::Black,
        Color::Red | Color::LightRed => AnsiColor::Red,
        Color::Green | Color::LightGreen => AnsiColor::Green,
        Color::Yellow | Color::LightYellow => AnsiColor::Yellow,
        Color::Blue | Color::LightBlue => AnsiColor::Blue,
        Color::Magenta | Color::LightMagenta => AnsiColor::Magenta,
        Color::Cyan | Color::LightCyan => AnsiColor::Cyan,
        Color::Gray | Color::White => AnsiColor::White,
        Color::DarkGray => AnsiColor::Color256(8),
        Color::Indexed(index) => AnsiColor::Color256(index),
        Color::Rgb(r, g, b) => AnsiColor::Color256(rgb_to_ansi256(r, g, b)),
    })
}

/// Nearest entry of the 6x6x6 color cube.
fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    #[test]
    fn test_plain_output_drops_styles() {
        let line = Line::from(vec![
            Span::styled("bold", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" text"),
        ]);
        assert_eq!(line_to_ansi(&line, false), "bold text");
        assert_eq!(lines_to_ansi(&[line.clone(), Line::default()], false), "bold text\n\n");
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let line = Line::from(Span::styled("x", Style::default().fg(Color::Red)));
        let out = line_to_ansi(&line, true);
        assert!(out.contains('\u{1b}'));
        assert!(out.contains('x'));
    }

    #[test]
    fn test_rgb_cube() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
    }
}
