//! Listing state owned by the caller.
//!
//! Every filter change resets the page to 1.

use super::FilteredView;

/// Search text, active tags and page selection for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search: String,
    active_tags: Vec<String>,
    page: usize,
    per_page: usize,
}

impl QueryState {
    /// A state with no filters on page 1. `per_page` of 0 is treated as 1.
    pub fn new(per_page: usize) -> Self {
        Self {
            search: String::new(),
            active_tags: Vec::new(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Request a page before the first view is computed.
    ///
    /// The engine clamps it into range.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn active_tags(&self) -> &[String] {
        &self.active_tags
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Whether a search or tag filter is narrowing the listing.
    pub fn is_filtering(&self) -> bool {
        !self.search.trim().is_empty() || !self.active_tags.is_empty()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 1;
    }

    /// Toggle `tag` in the active set. Returns whether it is now active.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.page = 1;
        match self.active_tags.iter().position(|t| t == tag) {
            Some(i) => {
                self.active_tags.remove(i);
                false
            }
            None => {
                self.active_tags.push(tag.to_string());
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.active_tags.clear();
        self.page = 1;
    }

    /// Move to `page` if it exists in `view`. Returns whether the page changed.
    pub fn go_to_page(&mut self, page: usize, view: &FilteredView<'_>) -> bool {
        if page < 1 || page > view.total_pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(crate::config::defaults::blog::per_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter_articles;

    #[test]
    fn test_new_clamps_per_page() {
        assert_eq!(QueryState::new(0).per_page(), 1);
        assert_eq!(QueryState::default().per_page(), 5);
        assert_eq!(QueryState::default().page(), 1);
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut state = QueryState::new(5).with_page(3);
        state.set_search("rust");
        assert_eq!(state.page(), 1);

        state = state.with_page(4);
        assert!(state.toggle_tag("web"));
        assert_eq!(state.page(), 1);
        assert_eq!(state.active_tags(), ["web"]);

        state = state.with_page(2);
        assert!(!state.toggle_tag("web"));
        assert_eq!(state.page(), 1);
        assert!(state.active_tags().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut state = QueryState::new(5);
        state.set_search("x");
        state.toggle_tag("a");
        assert!(state.is_filtering());

        state.clear();
        assert!(!state.is_filtering());
        assert_eq!(state.search(), "");
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_blank_search_is_not_filtering() {
        let mut state = QueryState::new(5);
        state.set_search("   ");
        assert!(!state.is_filtering());
    }

    #[test]
    fn test_go_to_page_bounds() {
        let articles = crate::query::engine::tests::sample(12);
        let mut state = QueryState::new(5);
        let view = filter_articles(&articles, &state);
        assert_eq!(view.total_pages, 3);

        assert!(!state.go_to_page(0, &view));
        assert!(!state.go_to_page(4, &view));
        assert!(!state.go_to_page(1, &view));
        assert!(state.go_to_page(3, &view));
        assert_eq!(state.page(), 3);
    }
}
