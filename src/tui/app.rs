//! TUI application main loop.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::info;

use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::util::truncate;

use super::components::{centered_rect, list_offset, ScrollableText, StatusBar};
use super::events::{Event, EventHandler};
use super::state::{Action, AppState, Panel};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Rows taken by borders, the prompt line and the status bar.
const CHROME_HEIGHT: u16 = 4;

const HELP: &[(&str, &str)] = &[
    ("j / k", "Move selection or scroll"),
    ("PgUp / PgDn", "Page up / down"),
    ("Enter", "Open the selected conversation"),
    ("Tab / h / l", "Switch panel"),
    ("/", "Search titles and content"),
    ("f / t", "Date filter from / to"),
    ("s", "Cycle sort order"),
    ("[ / ]", "Focus previous / next branch point"),
    ("< / >  , / .", "Previous / next alternative"),
    ("g", "Go to alternative by number"),
    ("y", "Copy code block"),
    ("D", "Save code block to a file"),
    ("o", "Open a file"),
    ("R", "Reset"),
    ("T", "Cycle theme"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

/// Run the TUI application.
///
/// `file`, when given, is loaded in the background right after start.
pub fn run(config: Config, config_path: Option<PathBuf>, file: Option<&Path>) -> Result<()> {
    enable_raw_mode().map_err(|e| {
        ReaderError::io(
            "Cannot launch TUI - no interactive terminal available. \
             The TUI requires a terminal with keyboard input support",
            e,
        )
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| ReaderError::io("Failed to enter alternate screen", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| ReaderError::io("Failed to create terminal", e))?;

    let mut app = AppState::new(config, config_path);
    let events = EventHandler::new(TICK_RATE);
    if let Some(path) = file {
        app.start_loading(path.to_path_buf());
        events.spawn_load(path.to_path_buf());
    }

    let result = run_loop(&mut terminal, &mut app, &events);

    disable_raw_mode().map_err(|e| ReaderError::io("Failed to disable raw mode", e))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| ReaderError::io("Failed to leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| ReaderError::io("Failed to show cursor", e))?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    events: &EventHandler,
) -> Result<()> {
    loop {
        if let Ok(size) = terminal.size() {
            app.viewport = usize::from(size.height.saturating_sub(CHROME_HEIGHT));
        }
        terminal
            .draw(|f| draw_ui(f, app))
            .map_err(|e| ReaderError::io("Failed to draw TUI", e))?;

        let event = events.next().map_err(|_| ReaderError::TuiError {
            message: "Event channel closed".to_string(),
        })?;

        match event {
            Event::Tick => app.on_tick(Instant::now()),
            Event::Resize(..) => {}
            Event::Loaded { path, result } => app.on_loaded(path, result),
            Event::Key(key) => match app.handle_key(key, Instant::now()) {
                Action::None => {}
                Action::Quit => {
                    info!("Leaving TUI");
                    return Ok(());
                }
                Action::Load(path) => {
                    app.start_loading(path.clone());
                    events.spawn_load(path);
                }
                Action::Copy(text) => match copy_to_clipboard(&text) {
                    Ok(()) => app.set_status(format!(
                        "Copied {} lines to clipboard",
                        text.lines().count()
                    )),
                    Err(e) => app.set_error(e.to_string()),
                },
            },
        }
    }
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| ReaderError::ClipboardError {
        message: format!("Failed to access clipboard: {e}"),
    })?;
    clipboard
        .set_text(text)
        .map_err(|e| ReaderError::ClipboardError {
            message: format!("Failed to copy to clipboard: {e}"),
        })
}

fn draw_ui(f: &mut Frame, app: &AppState) {
    let prompt_height = u16::from(app.input.is_some());
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(prompt_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[0]);

    draw_list_panel(f, app, chunks[0]);
    draw_conversation_panel(f, app, chunks[1]);

    if app.input.is_some() {
        draw_prompt(f, app, main_chunks[1]);
    }
    draw_status_bar(f, app, main_chunks[2]);

    if app.show_help {
        draw_help_overlay(f, app);
    }
}

fn draw_list_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.theme();
    let border_style = if app.focus == Panel::List {
        theme.border_focused_style()
    } else {
        theme.border_style()
    };
    let block = Block::default()
        .title(format!(
            " Conversations ({}/{}) ",
            app.reader.visible_len(),
            app.reader.conversations().len()
        ))
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.reader.visible_len() == 0 {
        let message = if let Some(path) = &app.loading {
            format!("Loading {}...", path.display())
        } else if app.reader.conversations().is_empty() {
            "No file loaded. Press o to open a JSON export.".to_string()
        } else {
            "No conversations match the current filters.".to_string()
        };
        let paragraph = Paragraph::new(Line::styled(message, theme.muted_style()))
            .block(block)
            .style(theme.text_style())
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let height = usize::from(area.height.saturating_sub(2));
    let width = usize::from(area.width.saturating_sub(4));
    let offset = list_offset(app.selected, height);
    let active = app.reader.active_position();
    let options = app.render_options();

    let items: Vec<ListItem> = app
        .reader
        .visible()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, conversation)| {
            let marker = if Some(i) == active { "● " } else { "  " };
            let date = options.zone.format(&conversation.inserted_at, &options.date_format);
            let title_width = width.saturating_sub(date.chars().count() + 3);
            let line = Line::from(vec![
                Span::raw(marker),
                Span::styled(date, theme.muted_style()),
                Span::raw(" "),
                Span::raw(truncate(conversation.display_title(), title_width)),
            ]);
            let style = if i == app.selected && app.focus == Panel::List {
                theme.selection_style()
            } else if i == app.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block).style(theme.text_style()), area);
}

fn draw_conversation_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.theme();
    let Some(view) = app.reader.view() else {
        let paragraph = Paragraph::new(Line::styled(
            "Select a conversation on the left to read it.",
            theme.muted_style(),
        ))
        .block(
            Block::default()
                .title(" Conversation ")
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        )
        .style(theme.text_style());
        f.render_widget(paragraph, area);
        return;
    };

    let title_width = usize::from(area.width.saturating_sub(6));
    ScrollableText::new(
        format!(" {} ", truncate(view.conversation().display_title(), title_width)),
        &app.document.lines,
    )
    .scroll(app.scroll)
    .focused(app.focus == Panel::View)
    .render(f, area, theme);
}

fn draw_prompt(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(input) = &app.input else {
        return;
    };
    let theme = app.theme();
    let line = Line::from(vec![
        Span::styled(
            input.mode.prompt(),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw(input.buffer.as_str()),
        Span::styled("█", Style::default().fg(theme.primary)),
    ]);
    f.render_widget(Paragraph::new(line).style(theme.text_style()), area);
}

fn draw_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.theme();
    let mut left = vec![Span::raw(format!(
        " {} of {} conversations",
        app.reader.visible_len(),
        app.reader.conversations().len()
    ))];
    if !app.reader.query().is_empty() {
        left.push(Span::raw(format!(" | \"{}\": {}", app.reader.query(), app.stats())));
    }
    if let Some(status) = &app.status {
        let style = if status.error {
            theme.error_style()
        } else {
            theme.success_style()
        };
        left.push(Span::raw(" | "));
        left.push(Span::styled(status.text.clone(), style));
    }

    let dates = match app.reader.date_bounds() {
        (None, None) => "all dates".to_string(),
        (from, to) => format!(
            "{} → {}",
            from.map_or_else(|| "…".to_string(), |d| d.to_string()),
            to.map_or_else(|| "…".to_string(), |d| d.to_string())
        ),
    };
    let right = vec![Span::raw(format!(
        "sort: {} | {dates} | theme: {} | ? help ",
        app.reader.sort(),
        theme.name
    ))];

    StatusBar::new()
        .left(left)
        .right(right)
        .render(f, area, Style::default().bg(theme.border).fg(theme.foreground));
}

fn draw_help_overlay(f: &mut Frame, app: &AppState) {
    let theme = app.theme();
    let area = centered_rect(60, 70, f.area());

    let mut lines = vec![
        Line::styled(
            "Keyboard shortcuts",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
    ];
    lines.extend(HELP.iter().map(|(keys, description)| {
        Line::from(vec![
            Span::styled(format!("  {keys:<14}"), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(*description),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::styled("Press any key to close", theme.muted_style()));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(theme.border_focused_style()),
        )
        .style(theme.text_style());

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
