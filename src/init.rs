//! Site initialization module.
//!
//! Creates the blog directory layout and a default `folio.toml`.

use crate::config::SiteConfig;
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Create a new blog skeleton at the configured root.
pub fn new_site(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: without a name (init in current dir) the directory must be empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `folio init <SITE_NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(config)?;
    init_default_config(config)?;
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(config: &SiteConfig) -> Result<()> {
    if config.config_path.exists() {
        bail!("`{}` already exists", config.config_path.display());
    }
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(&config.config_path, content)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    Ok(())
}

/// Create drafts, posts and data directories
fn init_site_structure(config: &SiteConfig) -> Result<()> {
    let blog = &config.blog;
    for path in [&blog.drafts, &blog.posts, &blog.data] {
        if path.exists() && !path.is_dir() {
            bail!(
                "Path `{}` already exists. Try `folio init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}
