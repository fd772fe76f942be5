//! Conversation search, filtering and ordering.
//!
//! Filtering looks at titles and at every fragment of every branch, not only
//! the selected path; highlighting in the open conversation only covers what
//! is rendered.

pub mod filter;
pub mod matcher;
pub mod sort;
pub mod stats;

pub use filter::{filter, ConversationFilter, DateRange};
pub use matcher::QueryMatcher;
pub use sort::SortOrder;
pub use stats::SearchStats;
