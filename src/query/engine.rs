//! Article filtering and pagination.
//!
//! [`filter_articles`] is a pure function of the article list and a
//! [`QueryState`]: search, then tag intersection, then a stable
//! newest-first sort, then the page slice.

use super::QueryState;
use crate::post::ArticleSummary;
use std::{cmp::Reverse, collections::BTreeMap};

/// Maximum number of consecutive page numbers in a [`PageWindow`].
const MAX_VISIBLE_PAGES: usize = 5;

/// Filtered, sorted articles with the selected page.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    /// Every matching article, newest first.
    pub articles: Vec<&'a ArticleSummary>,
    /// Always within `1..=max(1, total_pages)`.
    pub current_page: usize,
    pub total_pages: usize,
    pub per_page: usize,
}

impl<'a> FilteredView<'a> {
    pub fn count(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Articles on the current page.
    pub fn page_articles(&self) -> &[&'a ArticleSummary] {
        let start = (self.current_page - 1) * self.per_page;
        let end = (start + self.per_page).min(self.articles.len());
        self.articles.get(start..end).unwrap_or_default()
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self)
    }
}

/// Compute the view of `articles` selected by `state`.
pub fn filter_articles<'a>(articles: &'a [ArticleSummary], state: &QueryState) -> FilteredView<'a> {
    let query = state.search().trim().to_lowercase();
    let tags = state.active_tags();

    let mut matched: Vec<&ArticleSummary> = articles
        .iter()
        .filter(|article| query.is_empty() || matches_search(article, &query))
        .filter(|article| tags.iter().all(|tag| article.has_tag(tag)))
        .collect();

    // stable: equal dates keep their index order, unparseable dates go last
    matched.sort_by_key(|article| Reverse(article.parsed_date()));

    let per_page = state.per_page().max(1);
    let total_pages = matched.len().div_ceil(per_page);
    let current_page = state.page().clamp(1, total_pages.max(1));

    FilteredView {
        articles: matched,
        current_page,
        total_pages,
        per_page,
    }
}

/// `query` must already be lower-cased.
fn matches_search(article: &ArticleSummary, query: &str) -> bool {
    article.title.to_lowercase().contains(query)
        || article.excerpt.to_lowercase().contains(query)
        || article
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

// ============================================================================
// Tag vocabulary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    /// Number of articles carrying the tag.
    pub count: usize,
}

/// Every tag in `articles`, alphabetically, with its article count.
pub fn tag_counts(articles: &[ArticleSummary]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for article in articles {
        let mut tags: Vec<&str> = article.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();
        for tag in tags {
            *counts.entry(tag).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}

// ============================================================================
// Pagination controls
// ============================================================================

/// Page-number controls for a [`FilteredView`].
///
/// ```text
/// total 10, current 6:   1 … 4 5 [6] 7 8 … 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Consecutive page numbers around the current page.
    pub pages: Vec<usize>,
    pub current: usize,
    pub total_pages: usize,
    /// Page 1 is shown before `pages`.
    pub show_first: bool,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
    /// The last page is shown after `pages`.
    pub show_last: bool,
    pub has_prev: bool,
    pub has_next: bool,
    /// 1-based index of the first article on the page, 0 when empty.
    pub start_item: usize,
    pub end_item: usize,
    pub count: usize,
}

impl PageWindow {
    fn new(view: &FilteredView<'_>) -> Self {
        let current = view.current_page;
        let total = view.total_pages;

        let (start, end) = if total == 0 {
            (1, 0)
        } else {
            let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
            let end = (start + MAX_VISIBLE_PAGES - 1).min(total);
            if end + 1 - start < MAX_VISIBLE_PAGES {
                start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
            }
            (start, end)
        };

        let count = view.count();
        let start_item = if count == 0 {
            0
        } else {
            (current - 1) * view.per_page + 1
        };

        Self {
            pages: (start..=end).collect(),
            current,
            total_pages: total,
            show_first: start > 1,
            leading_ellipsis: start > 2,
            trailing_ellipsis: end + 1 < total,
            show_last: end < total,
            has_prev: current > 1,
            has_next: current < total,
            start_item,
            end_item: (current * view.per_page).min(count),
            count,
        }
    }

    /// Whether the controls are worth showing at all.
    pub const fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    /// `"{start}-{end} of {count}"`.
    pub fn range_label(&self) -> String {
        format!("{}-{} of {}", self.start_item, self.end_item, self.count)
    }
}

/// `"Showing X of Y articles"` while a search or tag filter is active.
pub fn results_label(total: usize, view: &FilteredView<'_>, state: &QueryState) -> Option<String> {
    state
        .is_filtering()
        .then(|| format!("Showing {} of {} articles", view.count(), total))
}
