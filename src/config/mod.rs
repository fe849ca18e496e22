//! Site configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[site]`    | Site metadata (title, default author, url)       |
//! | `[blog]`    | Store paths, index artifacts, listing settings   |
//! | `[serve]`   | Local authoring API (interface, port)            |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! author = "Alice"
//!
//! [blog]
//! drafts = "blog/drafts"
//! posts = "blog/data/posts"
//! per_page = 5
//!
//! [serve]
//! port = 3000
//! ```

mod blog;
pub mod defaults;
mod error;
mod serve;
mod site;

pub use blog::{BlogConfig, MarkdownChoice};
pub use error::ConfigError;
pub use serve::ServeConfig;
pub use site::SiteInfo;

use crate::cli::{Cli, Commands};
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root directory (set from CLI)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub site: SiteInfo,

    /// Blog store and listing settings
    #[serde(default)]
    pub blog: BlogConfig,

    /// Authoring API settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path and resolve every store path against it
    pub fn set_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.blog.drafts = Self::normalize_path(&root.join(&self.blog.drafts));
        self.blog.posts = Self::normalize_path(&root.join(&self.blog.posts));
        self.blog.data = Self::normalize_path(&root.join(&self.blog.data));
        self.root = root;
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let base = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name),
            _ => base,
        };

        Self::update_option(&mut self.blog.drafts, cli.drafts.as_ref());
        Self::update_option(&mut self.blog.posts, cli.posts.as_ref());
        Self::update_option(&mut self.blog.data, cli.data.as_ref());

        self.set_root(&root);
        self.config_path = Self::normalize_path(&self.root.join(&cli.config));

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        if self.blog.per_page == 0 {
            return Err(ConfigError::Validation(
                "[blog.per_page] must be at least 1".into(),
            ));
        }

        if self.blog.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "[blog.words_per_minute] must be at least 1".into(),
            ));
        }

        if !is_js_identifier(&self.blog.script_global) {
            return Err(ConfigError::Validation(format!(
                "[blog.script_global] `{}` is not a valid identifier",
                self.blog.script_global
            )));
        }

        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            return Err(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into(),
            ));
        }

        Ok(())
    }
}

/// Whether `name` can be used as `window.<name>` without quoting.
fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// Tests
// ============================================================================
