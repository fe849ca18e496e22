//! Headless article listing: search, tag filters and pagination.

pub mod engine;
mod state;

pub use engine::{FilteredView, PageWindow, TagCount, filter_articles, results_label, tag_counts};
pub use state::QueryState;
