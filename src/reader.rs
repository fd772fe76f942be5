//! Top-level reader state shared by the CLI and the TUI.
//!
//! Owns the loaded conversations, the filter and sort settings, the visible
//! list derived from them, and the open conversation. Every change goes
//! through here so the visible list is always consistent with the settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{ReaderError, Result};
use crate::model::Conversation;
use crate::parser;
use crate::search::{ConversationFilter, DateRange, SearchStats, SortOrder};
use crate::util::{Debounced, Zone};
use crate::view::ConversationView;

/// Reader state.
#[derive(Debug)]
pub struct ReaderState {
    conversations: Vec<Arc<Conversation>>,
    source: Option<PathBuf>,
    zone: Zone,
    query: String,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    sort: SortOrder,
    visible: Vec<usize>,
    view: Option<ConversationView>,
    pending_query: Debounced<String>,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new(SortOrder::default(), crate::util::debounce::DEFAULT_DELAY, Zone::default())
    }
}

impl ReaderState {
    /// Empty state.
    #[must_use]
    pub fn new(sort: SortOrder, debounce: Duration, zone: Zone) -> Self {
        Self {
            conversations: Vec::new(),
            source: None,
            zone,
            query: String::new(),
            from: None,
            to: None,
            sort,
            visible: Vec::new(),
            view: None,
            pending_query: Debounced::new(debounce),
        }
    }

    /// Replace the data set. Closes the open conversation.
    pub fn load(&mut self, conversations: Vec<Conversation>, source: Option<PathBuf>) {
        info!(count = conversations.len(), source = ?source, "Loaded conversations");
        self.conversations = conversations.into_iter().map(Arc::new).collect();
        self.source = source;
        self.view = None;
        self.refresh();
    }

    /// Parse a file and replace the data set.
    ///
    /// On error the current data set is left untouched.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let conversations = parser::load_path(path)?;
        let count = conversations.len();
        self.load(conversations, Some(path.to_path_buf()));
        Ok(count)
    }

    /// Where the data set came from.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Every loaded conversation, in file order.
    #[must_use]
    pub fn conversations(&self) -> &[Arc<Conversation>] {
        &self.conversations
    }

    /// Conversations passing the filter, in sort order.
    pub fn visible(&self) -> impl Iterator<Item = &Arc<Conversation>> {
        self.visible.iter().filter_map(|&index| self.conversations.get(index))
    }

    /// Number of visible conversations.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Visible conversation at a list position.
    #[must_use]
    pub fn visible_at(&self, position: usize) -> Option<&Arc<Conversation>> {
        self.visible.get(position).and_then(|&index| self.conversations.get(index))
    }

    /// List position of the open conversation, if it is visible.
    #[must_use]
    pub fn active_position(&self) -> Option<usize> {
        let id = &self.view.as_ref()?.conversation().id;
        self.visible().position(|conversation| &conversation.id == id)
    }

    /// Applied search query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Zone used for date filters.
    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    /// Date filter bounds.
    #[must_use]
    pub const fn date_bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.from, self.to)
    }

    /// Current sort order.
    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Apply a query now, dropping any pending one.
    pub fn set_query(&mut self, query: &str) {
        self.pending_query.cancel();
        if self.query != query {
            self.query = query.to_string();
            self.refresh();
        }
    }

    /// Schedule a query to apply after the debounce delay.
    pub fn schedule_query(&mut self, query: &str, now: Instant) {
        self.pending_query.schedule(query.to_string(), now);
    }

    /// Apply the pending query immediately, if any.
    pub fn flush_query(&mut self) -> bool {
        match self.pending_query.cancel() {
            Some(query) => {
                self.set_query(&query);
                true
            }
            None => false,
        }
    }

    /// Whether a query is waiting for the debounce delay.
    #[must_use]
    pub const fn has_pending_query(&self) -> bool {
        self.pending_query.is_pending()
    }

    /// Apply the pending query if its delay has passed. Returns `true` if a
    /// query was applied.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_query.poll(now) {
            Some(query) => {
                self.set_query(&query);
                true
            }
            None => false,
        }
    }

    /// Set the first day of the date filter.
    pub fn set_date_from(&mut self, from: Option<NaiveDate>) {
        self.from = from;
        self.refresh();
    }

    /// Set the last day of the date filter.
    pub fn set_date_to(&mut self, to: Option<NaiveDate>) {
        self.to = to;
        self.refresh();
    }

    /// Change the sort order.
    pub fn set_sort(&mut self, sort: SortOrder) {
        if self.sort != sort {
            self.sort = sort;
            self.refresh();
        }
    }

    /// Advance to the next sort order.
    pub fn cycle_sort(&mut self) -> SortOrder {
        self.set_sort(self.sort.next());
        self.sort
    }

    /// The filter built from the current settings.
    #[must_use]
    pub fn filter(&self) -> ConversationFilter {
        ConversationFilter::new(&self.query, DateRange::from_dates(self.zone, self.from, self.to))
    }

    /// Open the conversation at a list position.
    ///
    /// Re-opening the conversation that is already open keeps its branch
    /// choices; any other conversation starts from its default path.
    pub fn open(&mut self, position: usize) -> Option<&mut ConversationView> {
        let conversation = Arc::clone(self.visible_at(position)?);
        Some(self.open_conversation(conversation))
    }

    /// Open a conversation by id or unique id prefix.
    pub fn open_id(&mut self, id: &str) -> Result<&mut ConversationView> {
        let conversation = Arc::clone(self.find_by_prefix(id)?);
        Ok(self.open_conversation(conversation))
    }

    fn open_conversation(&mut self, conversation: Arc<Conversation>) -> &mut ConversationView {
        let view = match self.view.take() {
            Some(view) if Arc::ptr_eq(view.conversation(), &conversation) => view,
            _ => ConversationView::open(conversation),
        };
        self.view.insert(view)
    }

    /// Find a loaded conversation by id, or by a prefix matching only one.
    pub fn find_by_prefix(&self, id: &str) -> Result<&Arc<Conversation>> {
        if let Some(exact) = self.conversations.iter().find(|c| c.id == id) {
            return Ok(exact);
        }
        let mut matches = self.conversations.iter().filter(|c| c.id.starts_with(id));
        match (matches.next(), matches.count()) {
            (Some(found), 0) if !id.is_empty() => Ok(found),
            (Some(_), rest) if !id.is_empty() => Err(ReaderError::AmbiguousConversation {
                prefix: id.to_string(),
                count: rest + 1,
            }),
            _ => Err(ReaderError::ConversationNotFound { id: id.to_string() }),
        }
    }

    /// The open conversation.
    #[must_use]
    pub const fn view(&self) -> Option<&ConversationView> {
        self.view.as_ref()
    }

    /// Mutable access to the open conversation.
    pub fn view_mut(&mut self) -> Option<&mut ConversationView> {
        self.view.as_mut()
    }

    /// Close the open conversation.
    pub fn close(&mut self) {
        self.view = None;
    }

    /// Drop the data set and every setting except the sort order.
    pub fn reset(&mut self) {
        debug!("Resetting reader state");
        self.conversations.clear();
        self.source = None;
        self.query.clear();
        self.from = None;
        self.to = None;
        self.visible.clear();
        self.view = None;
        self.pending_query.cancel();
    }

    /// Match statistics for the applied query.
    ///
    /// `content_matches` is the highlight count of the rendered open
    /// conversation.
    #[must_use]
    pub fn stats(&self, content_matches: usize) -> SearchStats {
        SearchStats::compute(
            &self.query,
            self.visible().map(|conversation| conversation.as_ref()),
            content_matches,
        )
    }

    fn refresh(&mut self) {
        let mut visible = self.filter().apply(&self.conversations);
        let sort = self.sort;
        visible.sort_by(|&a, &b| sort.compare(&self.conversations[a], &self.conversations[b]));
        self.visible = visible;
    }
}
