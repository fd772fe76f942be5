//! Conversation list ordering.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Conversation;

/// Order of the conversation list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently started first.
    #[default]
    Newest,
    /// Least recently started first.
    Oldest,
    /// Alphabetical by title; untitled conversations sort as empty.
    Title,
}

impl SortOrder {
    /// The order after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Title,
            Self::Title => Self::Newest,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
        }
    }

    /// Compare two conversations.
    #[must_use]
    pub fn compare(self, a: &Conversation, b: &Conversation) -> Ordering {
        match self {
            Self::Newest => b.inserted_at.cmp(&a.inserted_at),
            Self::Oldest => a.inserted_at.cmp(&b.inserted_at),
            Self::Title => title_key(a).cmp(&title_key(b)),
        }
    }

    /// Sort in place. The sort is stable.
    pub fn sort<C: AsRef<Conversation>>(self, conversations: &mut [C]) {
        conversations.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn title_key(conversation: &Conversation) -> String {
    conversation.title.as_deref().unwrap_or_default().to_lowercase()
}
