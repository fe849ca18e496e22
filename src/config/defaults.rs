//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "My Blog".into()
    }

    pub fn author() -> String {
        "Anonymous".into()
    }

    pub fn url() -> Option<String> {
        None
    }
}

// ============================================================================
// [blog] Section Defaults
// ============================================================================

pub mod blog {
    use super::super::MarkdownChoice;
    use std::path::PathBuf;

    pub fn drafts() -> PathBuf {
        "blog/drafts".into()
    }

    pub fn posts() -> PathBuf {
        "blog/data/posts".into()
    }

    pub fn data() -> PathBuf {
        "blog/data".into()
    }

    pub fn index_json() -> PathBuf {
        "articles.json".into()
    }

    pub fn index_script() -> PathBuf {
        "articles.js".into()
    }

    pub fn script_global() -> String {
        "articlesData".into()
    }

    pub fn per_page() -> usize {
        5
    }

    pub fn default_read_time() -> String {
        "5 min read".into()
    }

    pub fn words_per_minute() -> usize {
        200
    }

    pub fn markdown() -> MarkdownChoice {
        MarkdownChoice::default()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }
}
