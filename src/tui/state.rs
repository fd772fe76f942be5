//! TUI application state.
//!
//! Everything on screen is derived from [`AppState`]. Key handling lives
//! here too so it can be driven without a terminal; the main loop only
//! performs the side effects returned as [`Action`]s.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::branch::PathIdentity;
use crate::config::Config;
use crate::error::Result;
use crate::model::Conversation;
use crate::reader::ReaderState;
use crate::render::{file_extension, CodeBlock, Document, DocumentRenderer, Theme};
use crate::search::SearchStats;
use crate::util::time::parse_date;
use crate::util::{atomic_write, unique_path};

use super::events::KeyBindings;

/// Lines moved by PageUp/PageDown when the viewport size is unknown.
const DEFAULT_PAGE: usize = 10;

/// Focused panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Conversation list.
    List,
    /// Open conversation.
    View,
}

/// What a line of text input is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Search query, applied after the debounce delay.
    Search,
    /// First day of the date filter.
    DateFrom,
    /// Last day of the date filter.
    DateTo,
    /// One-based alternative at the target branch point.
    Branch,
    /// Path of a file to load.
    OpenFile,
    /// Yes/no before dropping the loaded data.
    ConfirmReset,
}

impl InputMode {
    /// Prompt shown before the input buffer.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Search => "Search: ",
            Self::DateFrom => "From (YYYY-MM-DD, empty clears): ",
            Self::DateTo => "To (YYYY-MM-DD, empty clears): ",
            Self::Branch => "Branch number: ",
            Self::OpenFile => "Open file: ",
            Self::ConfirmReset => "Close the loaded file and clear all filters? (y/n) ",
        }
    }
}

/// Text being typed into the prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Purpose of the input.
    pub mode: InputMode,
    /// Typed text.
    pub buffer: String,
}

/// Message shown in the status bar until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Message text.
    pub text: String,
    /// Whether it reports a failure.
    pub error: bool,
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do.
    None,
    /// Leave the application.
    Quit,
    /// Load a file on the loader thread.
    Load(PathBuf),
    /// Put text on the system clipboard.
    Copy(String),
}

/// Application state.
pub struct AppState {
    /// Conversations, filters and the open conversation.
    pub reader: ReaderState,
    /// Rendered open conversation.
    pub document: Document,
    /// Focused panel.
    pub focus: Panel,
    /// Selected list position.
    pub selected: usize,
    /// First visible line of the document.
    pub scroll: usize,
    /// Height of the document viewport, used for paging.
    pub viewport: usize,
    /// Navigator targeted by branch keys.
    pub focused: Option<PathIdentity>,
    /// Active prompt.
    pub input: Option<Input>,
    /// Show help overlay.
    pub show_help: bool,
    /// Status bar message.
    pub status: Option<Status>,
    /// File being loaded in the background.
    pub loading: Option<PathBuf>,
    renderer: DocumentRenderer,
    config: Config,
    config_path: Option<PathBuf>,
    save_dir: PathBuf,
    bindings: KeyBindings,
}

impl AppState {
    /// Create the state from configuration.
    ///
    /// `config_path` is where theme changes are persisted; nothing is
    /// written unless that file already exists.
    #[must_use]
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            reader: ReaderState::new(
                config.display.default_sort,
                config.debounce(),
                config.display.timezone,
            ),
            document: Document::default(),
            focus: Panel::List,
            selected: 0,
            scroll: 0,
            viewport: DEFAULT_PAGE,
            focused: None,
            input: None,
            show_help: false,
            status: None,
            loading: None,
            renderer: DocumentRenderer::new(config.theme(), config.render_options()),
            config,
            config_path,
            save_dir: PathBuf::from("."),
            bindings: KeyBindings::default(),
        }
    }

    /// Directory saved code blocks are written to.
    #[must_use]
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Active theme.
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        self.renderer.theme()
    }

    /// Timestamp display options.
    #[must_use]
    pub const fn render_options(&self) -> &crate::render::RenderOptions {
        self.renderer.options()
    }

    /// Match statistics for the applied query.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.reader.stats(self.document.highlights)
    }

    /// Show an informational message.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: false,
        });
    }

    /// Show a failure message.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            error: true,
        });
    }

    /// Mark a file as loading.
    pub fn start_loading(&mut self, path: PathBuf) {
        self.set_status(format!("Loading {}...", path.display()));
        self.loading = Some(path);
    }

    /// Apply the outcome of a background load.
    ///
    /// A failed load reports the error and leaves the current data set alone.
    pub fn on_loaded(&mut self, path: PathBuf, result: Result<Vec<Conversation>>) {
        self.loading = None;
        match result {
            Ok(conversations) => {
                let count = conversations.len();
                self.reader.load(conversations, Some(path.clone()));
                // Node ids repeat across reloads of the same export.
                self.renderer.invalidate();
                self.selected = 0;
                self.scroll = 0;
                self.focused = None;
                self.focus = Panel::List;
                self.rerender();
                self.set_status(format!("Loaded {count} conversations from {}", path.display()));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load file");
                self.set_error(format!("Failed to load {}: {e}", path.display()));
            }
        }
    }

    /// Apply a debounced search query whose delay has passed.
    pub fn on_tick(&mut self, now: Instant) {
        if self.reader.poll(now) {
            self.after_query_change();
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && self.bindings.is_quit(&key) {
            return Action::Quit;
        }
        if let Some(input) = self.input.take() {
            return self.handle_input(input, key, now);
        }
        self.status = None;

        if self.show_help {
            self.show_help = false;
            return Action::None;
        }

        if self.bindings.is_quit(&key) {
            return Action::Quit;
        }
        if self.bindings.is_up(&key) {
            self.move_up(1);
        } else if self.bindings.is_down(&key) {
            self.move_down(1);
        } else if self.bindings.is_left(&key) {
            self.focus = Panel::List;
        } else if self.bindings.is_right(&key) {
            self.focus_view();
        } else if self.bindings.is_select(&key) {
            if self.focus == Panel::List {
                self.open_selected();
            }
        } else if self.bindings.is_previous_branch(&key) {
            self.switch_branch(false);
        } else if self.bindings.is_next_branch(&key) {
            self.switch_branch(true);
        } else if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return self.handle_command(key.code);
        }
        Action::None
    }

    fn handle_command(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Tab => match self.focus {
                Panel::List => self.focus_view(),
                Panel::View => self.focus = Panel::List,
            },
            KeyCode::PageUp => self.move_up(self.viewport.max(1)),
            KeyCode::PageDown => self.move_down(self.viewport.max(1)),
            KeyCode::Home => self.move_up(usize::MAX),
            KeyCode::End => self.move_down(usize::MAX),
            KeyCode::Char('/') => {
                let query = self.reader.query().to_string();
                self.begin_input(InputMode::Search, query);
            }
            KeyCode::Char('f') => {
                let from = self.reader.date_bounds().0;
                self.begin_input(InputMode::DateFrom, from.map(|d| d.to_string()).unwrap_or_default());
            }
            KeyCode::Char('t') => {
                let to = self.reader.date_bounds().1;
                self.begin_input(InputMode::DateTo, to.map(|d| d.to_string()).unwrap_or_default());
            }
            KeyCode::Char('s') => {
                let sort = self.reader.cycle_sort();
                self.after_filter_change();
                self.set_status(format!("Sorted by {sort}"));
            }
            KeyCode::Char('[') => self.focus_navigator(false),
            KeyCode::Char(']') => self.focus_navigator(true),
            KeyCode::Char('g') => {
                if self.target_navigator().is_some() {
                    self.begin_input(InputMode::Branch, String::new());
                } else {
                    self.set_error("No branch point on this path");
                }
            }
            KeyCode::Char('y') => return self.copy_code(),
            KeyCode::Char('D') => match self.save_code() {
                Ok(Some(path)) => self.set_status(format!("Saved code block to {}", path.display())),
                Ok(None) => self.set_error("No code block at this position"),
                Err(e) => self.set_error(format!("Failed to save code block: {e}")),
            },
            KeyCode::Char('o') => {
                let source = self
                    .reader
                    .source()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.begin_input(InputMode::OpenFile, source);
            }
            KeyCode::Char('R') => self.begin_input(InputMode::ConfirmReset, String::new()),
            KeyCode::Char('T') => self.cycle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        Action::None
    }

    fn begin_input(&mut self, mode: InputMode, buffer: String) {
        self.input = Some(Input { mode, buffer });
    }

    fn handle_input(&mut self, mut input: Input, key: KeyEvent, now: Instant) -> Action {
        if input.mode == InputMode::ConfirmReset {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('y' | 'Y')) {
                self.reset();
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Esc => {
                if input.mode == InputMode::Search {
                    // Drops the pending query and keeps the applied one.
                    let applied = self.reader.query().to_string();
                    self.reader.set_query(&applied);
                }
            }
            KeyCode::Enter => return self.submit(input),
            KeyCode::Backspace => {
                input.buffer.pop();
                self.edited(input, now);
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                input.buffer.push(c);
                self.edited(input, now);
            }
            _ => self.input = Some(input),
        }
        Action::None
    }

    fn edited(&mut self, input: Input, now: Instant) {
        if input.mode == InputMode::Search {
            self.reader.schedule_query(&input.buffer, now);
        }
        self.input = Some(input);
    }

    fn submit(&mut self, input: Input) -> Action {
        let text = input.buffer.trim();
        match input.mode {
            InputMode::Search => {
                self.reader.set_query(&input.buffer);
                self.after_query_change();
            }
            InputMode::DateFrom | InputMode::DateTo => {
                let date = if text.is_empty() {
                    None
                } else if let Some(date) = parse_date(text) {
                    Some(date)
                } else {
                    self.set_error(format!("Invalid date: {text} (expected YYYY-MM-DD)"));
                    return Action::None;
                };
                if input.mode == InputMode::DateFrom {
                    self.reader.set_date_from(date);
                } else {
                    self.reader.set_date_to(date);
                }
                self.after_filter_change();
            }
            InputMode::Branch => match text.parse::<usize>() {
                Ok(number) => self.select_branch(number),
                Err(_) => self.set_error(format!("Invalid branch number: {text}")),
            },
            InputMode::OpenFile => {
                if !text.is_empty() {
                    return Action::Load(PathBuf::from(text));
                }
            }
            InputMode::ConfirmReset => self.reset(),
        }
        Action::None
    }

    fn move_up(&mut self, amount: usize) {
        match self.focus {
            Panel::List => self.selected = self.selected.saturating_sub(amount),
            Panel::View => self.scroll = self.scroll.saturating_sub(amount),
        }
    }

    fn move_down(&mut self, amount: usize) {
        match self.focus {
            Panel::List => {
                let last = self.reader.visible_len().saturating_sub(1);
                self.selected = self.selected.saturating_add(amount).min(last);
            }
            Panel::View => {
                let last = self.document.lines.len().saturating_sub(1);
                self.scroll = self.scroll.saturating_add(amount).min(last);
            }
        }
    }

    fn focus_view(&mut self) {
        if self.reader.view().is_some() {
            self.focus = Panel::View;
        }
    }

    /// Open the selected list entry.
    ///
    /// Re-opening the conversation already on screen keeps its scroll
    /// position and branch choices.
    pub fn open_selected(&mut self) {
        let previous = self.reader.view().map(|view| view.conversation().id.clone());
        let position = self.selected;
        let Some(view) = self.reader.open(position) else {
            return;
        };
        if previous.as_deref() != Some(view.conversation().id.as_str()) {
            self.scroll = 0;
            self.focused = None;
        }
        self.focus = Panel::View;
        self.rerender();
    }

    fn focus_navigator(&mut self, forward: bool) {
        let navigators = &self.document.navigators;
        if navigators.is_empty() {
            self.set_error("No branch point on this path");
            return;
        }
        let last = navigators.len() - 1;
        let current = self
            .focused
            .as_ref()
            .and_then(|id| navigators.iter().position(|anchor| &anchor.identity == id));
        let index = match (current, forward) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        let anchor = &navigators[index];
        self.scroll = anchor.line;
        self.focused = Some(anchor.identity.clone());
        self.rerender();
    }

    /// Branch point the branch keys act on: the focused navigator, else the
    /// nearest one above the scroll position, else the first.
    #[must_use]
    pub fn target_navigator(&self) -> Option<PathIdentity> {
        let navigators = &self.document.navigators;
        self.focused
            .as_ref()
            .filter(|id| navigators.iter().any(|anchor| &anchor.identity == *id))
            .or_else(|| self.document.navigator_before(self.scroll).map(|a| &a.identity))
            .or_else(|| navigators.first().map(|a| &a.identity))
            .cloned()
    }

    fn switch_branch(&mut self, forward: bool) {
        let Some(identity) = self.target_navigator() else {
            return;
        };
        let Some(view) = self.reader.view_mut() else {
            return;
        };
        let changed = if forward {
            view.next_branch(&identity)
        } else {
            view.previous_branch(&identity)
        };
        if changed {
            self.focused = Some(identity);
            self.rerender();
        }
    }

    fn select_branch(&mut self, number: usize) {
        let Some(identity) = self.target_navigator() else {
            return;
        };
        let Some(view) = self.reader.view_mut() else {
            return;
        };
        if view.select_branch(&identity, number) {
            self.focused = Some(identity);
            self.rerender();
        }
    }

    /// Code block at the scroll position, or the first one below it.
    #[must_use]
    pub fn current_code_block(&self) -> Option<&CodeBlock> {
        self.document.code_block_before(self.scroll).or_else(|| {
            self.document
                .code_blocks
                .iter()
                .find(|(line, _)| *line >= self.scroll)
                .map(|(_, block)| block)
        })
    }

    fn copy_code(&mut self) -> Action {
        match self.current_code_block() {
            Some(block) => Action::Copy(block.code.clone()),
            None => {
                self.set_error("No code block at this position");
                Action::None
            }
        }
    }

    /// Save the current code block as `code.<ext>` in the save directory.
    ///
    /// An existing file is never overwritten; a numbered name is used
    /// instead.
    pub fn save_code(&self) -> Result<Option<PathBuf>> {
        let Some(block) = self.current_code_block() else {
            return Ok(None);
        };
        let path = unique_path(&self.save_dir, "code", file_extension(&block.language));
        let mut content = block.code.clone();
        content.push('\n');
        atomic_write(&path, content.as_bytes())?;
        info!(path = %path.display(), language = %block.language, "Saved code block");
        Ok(Some(path))
    }

    fn cycle_theme(&mut self) {
        let theme = self.renderer.theme().next();
        let name = theme.name;
        self.renderer.set_theme(theme);
        self.rerender();

        // Only the theme changes on disk; command line overrides stay out.
        if let Some(path) = self.config_path.as_deref().filter(|path| path.exists()) {
            let saved = Config::load_from(path).and_then(|mut stored| {
                stored.set("theme.name", name)?;
                stored.save_to(path)
            });
            if let Err(e) = saved {
                self.set_error(format!("Theme {name} not saved: {e}"));
                return;
            }
        }
        self.set_status(format!("Theme: {name}"));
    }

    /// Drop the data set and every filter.
    pub fn reset(&mut self) {
        self.reader.reset();
        self.reader.set_sort(self.config.display.default_sort);
        self.renderer.set_query("");
        self.renderer.invalidate();
        self.document = Document::default();
        self.focus = Panel::List;
        self.selected = 0;
        self.scroll = 0;
        self.focused = None;
        self.set_status("Reset");
    }

    fn after_filter_change(&mut self) {
        let last = self.reader.visible_len().saturating_sub(1);
        self.selected = self.selected.min(last);
    }

    fn after_query_change(&mut self) {
        self.after_filter_change();
        if self.renderer.set_query(self.reader.query()) {
            self.rerender();
        }
        debug!(query = %self.reader.query(), visible = self.reader.visible_len(), "Applied search");
    }

    /// Render the open conversation again.
    pub fn rerender(&mut self) {
        self.document = match self.reader.view() {
            Some(view) => {
                let on_path = self.focused.as_ref().map_or(true, |id| {
                    view.branch_points().iter().any(|bp| &bp.identity == id)
                });
                if !on_path {
                    self.focused = None;
                }
                self.renderer
                    .render(view.conversation(), view.path(), self.focused.as_ref())
            }
            None => Document::default(),
        };
        self.scroll = self.scroll.min(self.document.lines.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use crate::util::Zone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn conversations() -> Vec<Conversation> {
        conversations_asking("How do I sort?")
    }

    fn conversations_asking(question: &str) -> Vec<Conversation> {
        serde_json::from_value(json!([
            {
                "id": "c-1",
                "title": "Sorting in Python",
                "inserted_at": "2025-02-01T12:00:00Z",
                "updated_at": "2025-02-01T12:30:00Z",
                "mapping": {
                    "root": {"children": ["q"]},
                    "q": {"children": ["a1", "a2"], "message": {"fragments": [{"type": "REQUEST", "content": question}]}},
                    "a1": {"children": [], "message": {"model": "deepseek-chat", "fragments": [
                        {"type": "RESPONSE", "content": "Use sorted:\n\n```python\nprint(sorted(xs))\n```"}
                    ]}},
                    "a2": {"children": [], "message": {"fragments": [{"type": "RESPONSE", "content": "Call list.sort()."}]}}
                }
            },
            {
                "id": "c-2",
                "title": "Tokio runtime",
                "inserted_at": "2025-01-15T09:00:00Z",
                "updated_at": "2025-01-15T09:10:00Z",
                "mapping": {
                    "root": {"children": ["q"]},
                    "q": {"children": [], "message": {"fragments": [{"type": "REQUEST", "content": "What is a runtime?"}]}}
                }
            }
        ]))
        .unwrap()
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.display.timezone = Zone::Utc;
        config
    }

    fn loaded(dir: &std::path::Path) -> AppState {
        let mut app = AppState::new(config(), None).with_save_dir(dir);
        app.on_loaded(PathBuf::from("export.json"), Ok(conversations()));
        app
    }

    fn type_text(app: &mut AppState, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_key(key(c), now);
        }
    }

    #[test]
    fn test_load_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        assert_eq!(app.reader.visible_len(), 2);
        assert_eq!(app.status.as_ref().unwrap().text, "Loaded 2 conversations from export.json");

        app.handle_key(code(KeyCode::Enter), Instant::now());
        assert_eq!(app.focus, Panel::View);
        assert_eq!(app.reader.view().unwrap().conversation().id, "c-1");
        assert!(!app.document.lines.is_empty());
        assert_eq!(app.document.navigators.len(), 1);
    }

    #[test]
    fn test_reload_renders_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        app.handle_key(code(KeyCode::Enter), Instant::now());
        let lines = |app: &AppState| -> Vec<String> {
            app.document
                .lines
                .iter()
                .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
                .collect()
        };
        assert!(lines(&app).iter().any(|l| l.contains("How do I sort?")));

        let updated = conversations_asking("How do I reverse a list?");
        app.on_loaded(PathBuf::from("export.json"), Ok(updated));
        app.handle_key(code(KeyCode::Enter), Instant::now());

        let rendered = lines(&app);
        assert!(rendered.iter().any(|l| l.contains("How do I reverse a list?")));
        assert!(!rendered.iter().any(|l| l.contains("How do I sort?")));
    }

    #[test]
    fn test_failed_load_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        app.on_loaded(PathBuf::from("bad.json"), Err(ReaderError::parse("unexpected end")));

        assert_eq!(app.reader.visible_len(), 2);
        assert!(app.status.as_ref().unwrap().error);
        assert!(app.loading.is_none());
    }

    #[test]
    fn test_search_input_is_debounced() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let t0 = Instant::now();

        app.handle_key(key('/'), t0);
        type_text(&mut app, "tok", t0);
        // 'q' while typing is text, not quit.
        assert_eq!(app.handle_key(key('q'), t0), Action::None);
        app.handle_key(code(KeyCode::Backspace), t0 + Duration::from_millis(100));
        assert_eq!(app.reader.query(), "");

        app.on_tick(t0 + Duration::from_millis(350));
        assert_eq!(app.reader.query(), "");
        app.on_tick(t0 + Duration::from_millis(400));
        assert_eq!(app.reader.query(), "tok");
        assert_eq!(app.reader.visible_len(), 1);
        assert_eq!(app.stats().title_matches, 1);
    }

    #[test]
    fn test_search_enter_applies_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();

        app.handle_key(key('/'), now);
        type_text(&mut app, "sort", now);
        app.handle_key(code(KeyCode::Enter), now);
        assert_eq!(app.reader.query(), "sort");
        assert!(!app.reader.has_pending_query());
        assert!(app.input.is_none());

        app.handle_key(code(KeyCode::Enter), now);
        assert!(app.stats().content_matches > 0);
    }

    #[test]
    fn test_escape_discards_pending_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let t0 = Instant::now();

        app.handle_key(key('/'), t0);
        type_text(&mut app, "tokio", t0);
        app.handle_key(code(KeyCode::Esc), t0);
        app.on_tick(t0 + Duration::from_secs(1));
        assert_eq!(app.reader.query(), "");
        assert_eq!(app.reader.visible_len(), 2);
    }

    #[test]
    fn test_branch_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();
        app.handle_key(code(KeyCode::Enter), now);

        app.handle_key(key(']'), now);
        assert_eq!(app.focused.as_ref().unwrap().to_string(), "q");

        // Already at the first alternative.
        app.handle_key(key('<'), now);
        assert_eq!(app.reader.view().unwrap().path().node_ids(), ["q", "a1"]);

        app.handle_key(key('>'), now);
        assert_eq!(app.reader.view().unwrap().path().node_ids(), ["q", "a2"]);
        app.handle_key(key('.'), now);
        assert_eq!(app.reader.view().unwrap().path().node_ids(), ["q", "a2"]);

        app.handle_key(key('g'), now);
        type_text(&mut app, "1", now);
        app.handle_key(code(KeyCode::Enter), now);
        assert_eq!(app.reader.view().unwrap().path().node_ids(), ["q", "a1"]);
    }

    #[test]
    fn test_branch_number_without_branch_point() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        app.selected = 1;
        app.open_selected();

        app.handle_key(key('g'), Instant::now());
        assert!(app.input.is_none());
        assert!(app.status.as_ref().unwrap().error);
    }

    #[test]
    fn test_save_code_block_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();
        app.handle_key(code(KeyCode::Enter), now);

        app.handle_key(key('D'), now);
        app.handle_key(key('D'), now);

        let first = std::fs::read_to_string(dir.path().join("code.py")).unwrap();
        assert_eq!(first, "print(sorted(xs))\n");
        assert!(dir.path().join("code-2.py").exists());
    }

    #[test]
    fn test_copy_returns_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();
        assert_eq!(app.handle_key(key('y'), now), Action::None);

        app.handle_key(code(KeyCode::Enter), now);
        assert_eq!(
            app.handle_key(key('y'), now),
            Action::Copy("print(sorted(xs))".to_string())
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();

        app.handle_key(key('f'), now);
        type_text(&mut app, "yesterday", now);
        app.handle_key(code(KeyCode::Enter), now);
        assert!(app.status.as_ref().unwrap().error);
        assert_eq!(app.reader.date_bounds(), (None, None));

        app.handle_key(key('f'), now);
        type_text(&mut app, "2025-01-20", now);
        app.handle_key(code(KeyCode::Enter), now);
        assert_eq!(app.reader.visible_len(), 1);
    }

    #[test]
    fn test_reset_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();

        app.handle_key(key('R'), now);
        app.handle_key(key('n'), now);
        assert_eq!(app.reader.visible_len(), 2);

        app.handle_key(key('R'), now);
        app.handle_key(key('y'), now);
        assert_eq!(app.reader.visible_len(), 0);
        assert!(app.reader.source().is_none());
    }

    #[test]
    fn test_open_file_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded(dir.path());
        let now = Instant::now();

        app.handle_key(key('o'), now);
        app.input.as_mut().unwrap().buffer.clear();
        type_text(&mut app, "other.json", now);
        assert_eq!(
            app.handle_key(code(KeyCode::Enter), now),
            Action::Load(PathBuf::from("other.json"))
        );
        assert_eq!(app.handle_key(key('q'), now), Action::Quit);
    }

    #[test]
    fn test_theme_cycle_persists_to_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();

        let mut app = AppState::new(config(), Some(path.clone()));
        app.handle_key(key('T'), Instant::now());
        assert_eq!(app.theme().name, "light");
        assert_eq!(Config::load_from(&path).unwrap().theme.name, "light");
    }

    #[test]
    fn test_theme_cycle_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let mut app = AppState::new(config(), Some(path.clone()));
        app.handle_key(key('T'), Instant::now());
        assert_eq!(app.theme().name, "light");
        assert!(!path.exists());
    }
}
