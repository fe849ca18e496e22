//! Draft publishing pipeline.
//!
//! ```text
//! drafts/*.md ──parse──▶ frontmatter ──build──▶ Post ──write──▶ posts/{id}.json
//!                                                                    │
//!                                            articles.json/.js ◀──index
//! ```

use crate::{
    config::SiteConfig,
    index::{IndexReport, generate_index},
    log,
    post::{PostDefaults, PostError, build_post, builder, frontmatter},
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Outcome of a batch publish.
#[derive(Debug)]
pub struct PublishReport {
    pub converted: usize,
    pub skipped: usize,
    /// `None` when regenerating the index failed (already logged).
    pub index: Option<IndexReport>,
}

/// Whether `path` names a markdown draft.
pub fn is_draft(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Convert one draft into `posts/{id}.json`.
///
/// Returns `Ok(None)` for files that are not markdown drafts.
pub fn publish_draft(path: &Path, config: &SiteConfig) -> Result<Option<PathBuf>, PostError> {
    if !is_draft(path) {
        return Ok(None);
    }

    let text = fs::read_to_string(path).map_err(|err| PostError::Io(path.to_path_buf(), err))?;
    let draft = frontmatter::parse(&text);
    let post = build_post(&draft, &PostDefaults::from_config(config), builder::today())?;

    let out = config.blog.post_path(&post.id);
    let json = serde_json::to_string_pretty(&post).map_err(|err| PostError::Json(out.clone(), err))?;
    fs::create_dir_all(&config.blog.posts)
        .map_err(|err| PostError::Io(config.blog.posts.clone(), err))?;
    fs::write(&out, json).map_err(|err| PostError::Io(out.clone(), err))?;

    Ok(Some(out))
}

/// Publish every draft, then regenerate the index once.
pub fn publish_all(config: &SiteConfig) -> Result<PublishReport> {
    log!("publish"; "building articles from drafts...");
    let drafts = list_drafts(&config.blog.drafts)?;
    fs::create_dir_all(&config.blog.posts).with_context(|| {
        format!("failed to create posts directory `{}`", config.blog.posts.display())
    })?;

    let mut converted = 0;
    let mut skipped = 0;
    for path in &drafts {
        match publish_draft(path, config) {
            Ok(Some(out)) => {
                converted += 1;
                log!("publish"; "{} -> {}", file_name(path), file_name(&out));
            }
            Ok(None) => {}
            Err(err) => {
                skipped += 1;
                log!("warn"; "skipping {}: {}", file_name(path), err);
            }
        }
    }

    let index = reindex(config);
    log!("publish"; "converted {}, skipped {}", converted, skipped);
    Ok(PublishReport {
        converted,
        skipped,
        index,
    })
}

/// Run the index generator, logging instead of propagating a failure.
pub fn reindex(config: &SiteConfig) -> Option<IndexReport> {
    match generate_index(config) {
        Ok(report) => Some(report),
        Err(err) => {
            log!("error"; "failed to update index: {:#}", anyhow::Error::from(err));
            None
        }
    }
}

/// Markdown drafts in file-name order.
pub fn list_drafts(drafts_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(drafts_dir)
        .with_context(|| format!("failed to read drafts directory `{}`", drafts_dir.display()))?;

    let mut drafts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_draft(path))
        .collect();
    drafts.sort();
    Ok(drafts)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::Post;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());
        fs::create_dir_all(&config.blog.drafts).unwrap();
        (dir, config)
    }

    fn write_draft(config: &SiteConfig, name: &str, text: &str) -> PathBuf {
        let path = config.blog.drafts.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_publish_draft_round_trip() {
        let (_dir, config) = setup();
        let path = write_draft(
            &config,
            "x.md",
            "---\ntitle: X\ndate: 2025-01-01\ntags: [a, b]\n---\n\nHello.",
        );

        let out = publish_draft(&path, &config).unwrap().unwrap();
        assert_eq!(out, config.blog.posts.join("2025-01-01-x.json"));

        let post: Post = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(post.id, "2025-01-01-x");
        assert_eq!(post.tags, vec!["a", "b"]);
        assert!(post.published);
        assert_eq!(post.content, "Hello.");
    }

    #[test]
    fn test_publish_draft_ignores_non_markdown() {
        let (_dir, config) = setup();
        let path = write_draft(&config, "notes.txt", "---\ntitle: X\n---\n");
        assert!(publish_draft(&path, &config).unwrap().is_none());
    }

    #[test]
    fn test_publish_draft_missing_title() {
        let (_dir, config) = setup();
        let path = write_draft(&config, "bad.md", "---\ndate: 2025-01-01\n---\nbody");
        let err = publish_draft(&path, &config).unwrap_err();
        assert!(matches!(err, PostError::MissingTitle));
    }

    #[test]
    fn test_publish_draft_rejects_escaping_id() {
        let (_dir, config) = setup();
        let path = write_draft(&config, "evil.md", "---\ntitle: X\nid: ../../../escaped\n---\nbody");

        let err = publish_draft(&path, &config).unwrap_err();
        assert!(matches!(err, PostError::InvalidId(_)));
        assert!(!config.blog.posts.join("../../../escaped.json").exists());

        let report = publish_all(&config).unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_publish_all_creates_posts_dir() {
        let (_dir, config) = setup();
        assert!(!config.blog.posts.exists());

        let report = publish_all(&config).unwrap();
        assert_eq!(report.converted, 0);
        assert!(config.blog.posts.is_dir());
        assert_eq!(report.index.unwrap().indexed, 0);
    }

    #[test]
    fn test_publish_all_partial_failure() {
        let (_dir, config) = setup();
        write_draft(&config, "a.md", "---\ntitle: A\ndate: 2025-01-01\n---\na");
        write_draft(&config, "b.md", "---\ntitle: B\ndate: 2025-01-02\n---\nb");
        write_draft(&config, "c.md", "---\ntitle: C\ndate: 2025-01-03\n---\nc");
        write_draft(&config, "d.md", "---\ndate: 2025-01-04\n---\nno title");
        write_draft(&config, "readme.txt", "ignored");

        let report = publish_all(&config).unwrap();
        assert_eq!(report.converted, 3);
        assert_eq!(report.skipped, 1);

        let index = report.index.unwrap();
        assert_eq!(index.indexed, 3);
        assert!(index.json_path.exists());
        assert!(index.script_path.exists());
    }

    #[test]
    fn test_publish_all_missing_drafts_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());

        assert!(publish_all(&config).is_err());
    }

    #[test]
    fn test_republish_overwrites() {
        let (_dir, config) = setup();
        let path = write_draft(&config, "x.md", "---\ntitle: X\ndate: 2025-01-01\n---\nv1");
        publish_draft(&path, &config).unwrap();
        fs::write(&path, "---\ntitle: X\ndate: 2025-01-01\n---\nv2").unwrap();
        let out = publish_draft(&path, &config).unwrap().unwrap();

        let post: Post = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(post.content, "v2");
        assert_eq!(fs::read_dir(&config.blog.posts).unwrap().count(), 1);
    }

    #[test]
    fn test_list_drafts_sorted() {
        let (_dir, config) = setup();
        write_draft(&config, "b.md", "");
        write_draft(&config, "a.md", "");
        write_draft(&config, "c.markdown", "");

        let names: Vec<_> = list_drafts(&config.blog.drafts)
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }
}
