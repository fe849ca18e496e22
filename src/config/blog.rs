//! `[blog]` section configuration.
//!
//! Store locations, index artifact names and listing/publishing knobs.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which markdown renderer to use for `folio show`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownChoice {
    /// Full renderer when compiled in, basic otherwise (default).
    #[default]
    Auto,
    /// Require the full renderer.
    Full,
    /// Always use the basic regex renderer.
    Basic,
}

/// `[blog]` section in folio.toml.
///
/// # Example
/// ```toml
/// [blog]
/// drafts = "blog/drafts"
/// posts = "blog/data/posts"
/// data = "blog/data"
/// per_page = 5
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Markdown drafts directory.
    #[serde(default = "defaults::blog::drafts")]
    #[educe(Default = defaults::blog::drafts())]
    pub drafts: PathBuf,

    /// One `{id}.json` file per post.
    #[serde(default = "defaults::blog::posts")]
    #[educe(Default = defaults::blog::posts())]
    pub posts: PathBuf,

    /// Directory receiving the index artifacts.
    #[serde(default = "defaults::blog::data")]
    #[educe(Default = defaults::blog::data())]
    pub data: PathBuf,

    /// File name of the JSON index, relative to `data`.
    #[serde(default = "defaults::blog::index_json")]
    #[educe(Default = defaults::blog::index_json())]
    pub index_json: PathBuf,

    /// File name of the script index, relative to `data`.
    #[serde(default = "defaults::blog::index_script")]
    #[educe(Default = defaults::blog::index_script())]
    pub index_script: PathBuf,

    /// Global the script index assigns to (`window.<name>`).
    #[serde(default = "defaults::blog::script_global")]
    #[educe(Default = defaults::blog::script_global())]
    pub script_global: String,

    /// Articles per listing page.
    #[serde(default = "defaults::blog::per_page")]
    #[educe(Default = defaults::blog::per_page())]
    pub per_page: usize,

    /// `readTime` given to drafts that do not set one.
    #[serde(default = "defaults::blog::default_read_time")]
    #[educe(Default = defaults::blog::default_read_time())]
    pub default_read_time: String,

    /// Reading speed used to estimate a missing `readTime`.
    #[serde(default = "defaults::blog::words_per_minute")]
    #[educe(Default = defaults::blog::words_per_minute())]
    pub words_per_minute: usize,

    #[serde(default = "defaults::blog::markdown")]
    #[educe(Default = defaults::blog::markdown())]
    pub markdown: MarkdownChoice,
}

impl BlogConfig {
    /// Absolute path of the JSON index (after root normalization).
    pub fn index_json_path(&self) -> PathBuf {
        self.data.join(&self.index_json)
    }

    /// Absolute path of the script index (after root normalization).
    pub fn index_script_path(&self) -> PathBuf {
        self.data.join(&self.index_script)
    }

    /// Path of a post artifact inside the post store.
    pub fn post_path(&self, id: &str) -> PathBuf {
        self.posts.join(format!("{id}.json"))
    }
}
