//! Branch-aware traversal of conversation trees.
//!
//! - [`store`]: read-only lookups over a node mapping
//! - [`selector`]: which child each branch point currently shows
//! - [`walker`]: the selected path as a chain of linear segments

pub mod selector;
pub mod store;
pub mod walker;

pub use selector::{BranchSelector, BranchStep, PathIdentity};
pub use store::NodeStore;
pub use walker::{rewalk_branch, walk, walk_conversation, BranchPoint, PathSegment, SelectedPath};
