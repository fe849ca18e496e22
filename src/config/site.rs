//! `[site]` section configuration.
//!
//! Identity of the blog: title, default author, description and public URL.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in folio.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "My Blog"
/// author = "Alice"
/// description = "Thoughts on technology"
/// url = "https://alice.dev"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteInfo {
    /// Site title, shown by the terminal renderer.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Author applied to posts that do not name one.
    #[serde(default = "defaults::site::author")]
    #[educe(Default = defaults::site::author())]
    pub author: String,

    /// Short site description.
    #[serde(default)]
    pub description: String,

    /// Public base URL of the site.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,
}
