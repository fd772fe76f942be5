//! TUI event handling.
//!
//! Terminal input and file loading both post into one channel so the main
//! loop has a single place to wait.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::error::Result;
use crate::model::Conversation;
use crate::parser;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Terminal tick, drives the search debounce.
    Tick,
    /// Key press event.
    Key(KeyEvent),
    /// Terminal resize.
    Resize(u16, u16),
    /// A file finished loading on the loader thread.
    Loaded {
        /// File that was read.
        path: PathBuf,
        /// Parsed conversations or the parse failure.
        result: Result<Vec<Conversation>>,
    },
}

/// Event handler using channels.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
}

impl EventHandler {
    /// Create a new event handler polling the terminal every `tick_rate`.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();

        thread::spawn(move || loop {
            if event::poll(tick_rate).unwrap_or(false) {
                let sent = match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                        event_tx.send(Event::Key(key))
                    }
                    Ok(CrosstermEvent::Resize(w, h)) => event_tx.send(Event::Resize(w, h)),
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }

            if event_tx.send(Event::Tick).is_err() {
                break;
            }
        });

        Self { rx, tx }
    }

    /// Get the next event.
    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    /// Parse `path` on a background thread and post the outcome as
    /// [`Event::Loaded`].
    pub fn spawn_load(&self, path: PathBuf) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            debug!(path = %path.display(), "Loading file");
            let result = parser::load_path(&path);
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(Event::Loaded { path, result });
        });
    }
}

/// Key binding configuration.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Quit keys.
    pub quit: Vec<KeyEvent>,
    /// Navigation up.
    pub up: Vec<KeyEvent>,
    /// Navigation down.
    pub down: Vec<KeyEvent>,
    /// Focus the conversation list.
    pub left: Vec<KeyEvent>,
    /// Focus the conversation view.
    pub right: Vec<KeyEvent>,
    /// Previous alternative at a branch point.
    pub previous_branch: Vec<KeyEvent>,
    /// Next alternative at a branch point.
    pub next_branch: Vec<KeyEvent>,
    /// Select/confirm.
    pub select: Vec<KeyEvent>,
    /// Back/cancel.
    pub back: Vec<KeyEvent>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        Self {
            quit: vec![
                key(KeyCode::Char('q')),
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            ],
            up: vec![key(KeyCode::Up), key(KeyCode::Char('k'))],
            down: vec![key(KeyCode::Down), key(KeyCode::Char('j'))],
            left: vec![key(KeyCode::Left), key(KeyCode::Char('h'))],
            right: vec![key(KeyCode::Right), key(KeyCode::Char('l'))],
            previous_branch: vec![key(KeyCode::Char('<')), key(KeyCode::Char(','))],
            next_branch: vec![key(KeyCode::Char('>')), key(KeyCode::Char('.'))],
            select: vec![key(KeyCode::Enter)],
            back: vec![key(KeyCode::Esc)],
        }
    }
}

/// Shifted characters arrive with or without SHIFT depending on the
/// terminal, so SHIFT is ignored for character keys.
fn matches(bindings: &[KeyEvent], key: &KeyEvent) -> bool {
    let modifiers = match key.code {
        KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
        _ => key.modifiers,
    };
    bindings
        .iter()
        .any(|k| k.code == key.code && k.modifiers == modifiers)
}

impl KeyBindings {
    /// Check if a key matches quit binding.
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        matches(&self.quit, key)
    }

    /// Check if a key matches up binding.
    pub fn is_up(&self, key: &KeyEvent) -> bool {
        matches(&self.up, key)
    }

    /// Check if a key matches down binding.
    pub fn is_down(&self, key: &KeyEvent) -> bool {
        matches(&self.down, key)
    }

    /// Check if a key matches left binding.
    pub fn is_left(&self, key: &KeyEvent) -> bool {
        matches(&self.left, key)
    }

    /// Check if a key matches right binding.
    pub fn is_right(&self, key: &KeyEvent) -> bool {
        matches(&self.right, key)
    }

    /// Check if a key matches previous branch binding.
    pub fn is_previous_branch(&self, key: &KeyEvent) -> bool {
        matches(&self.previous_branch, key)
    }

    /// Check if a key matches next branch binding.
    pub fn is_next_branch(&self, key: &KeyEvent) -> bool {
        matches(&self.next_branch, key)
    }

    /// Check if a key matches select binding.
    pub fn is_select(&self, key: &KeyEvent) -> bool {
        matches(&self.select, key)
    }

    /// Check if a key matches back binding.
    pub fn is_back(&self, key: &KeyEvent) -> bool {
        matches(&self.back, key)
    }
}
