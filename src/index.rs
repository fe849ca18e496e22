//! Articles index generation.
//!
//! Aggregates every `posts/{id}.json` into one [`Index`] and writes it twice:
//!
//! - `articles.json`: the plain JSON document
//! - `articles.js`: the same JSON assigned to `window.<script_global>`
//!
//! Both artifacts embed the same serialized text, produced in one pass.

use crate::{
    config::SiteConfig,
    log,
    post::{
        ArticleSummary, Index, PostRecord, ReadTime,
        model::generator_name,
    },
};
use rustc_hash::FxHashSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Header line of the script artifact.
const SCRIPT_HEADER: &str = "// Articles data - generated automatically";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("posts directory not found: `{0}`")]
    MissingPostDir(PathBuf),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to serialize articles index")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of one index pass.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// Post files found.
    pub total: usize,
    /// Articles written to the index.
    pub indexed: usize,
    /// Files skipped as unreadable, invalid, unpublished or duplicate.
    pub skipped: usize,
    pub json_path: PathBuf,
    pub script_path: PathBuf,
}

/// Regenerate both index artifacts from the post store.
pub fn generate_index(config: &SiteConfig) -> Result<IndexReport, IndexError> {
    let blog = &config.blog;
    let files = list_post_files(&blog.posts)?;
    let total = files.len();
    log!("index"; "found {} post files", total);

    let mut seen = FxHashSet::default();
    let mut articles = Vec::with_capacity(total);
    for path in &files {
        if let Some(article) = load_summary(path, config, &mut seen) {
            articles.push(article);
        }
    }

    let index = Index {
        total_count: articles.len(),
        articles,
        last_updated: chrono::Utc::now().to_rfc3339(),
        generated_by: generator_name(),
    };
    let (json, script) = render_artifacts(&index, &blog.script_global)?;

    let json_path = blog.index_json_path();
    let script_path = blog.index_script_path();
    write_artifact(&json_path, &json)?;
    write_artifact(&script_path, &script)?;

    let report = IndexReport {
        total,
        indexed: index.total_count,
        skipped: total - index.total_count,
        json_path,
        script_path,
    };
    log!("index"; "indexed {} articles, skipped {}", report.indexed, report.skipped);
    Ok(report)
}

/// `*.json` files in the post store, newest file name first.
fn list_post_files(posts_dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    if !posts_dir.is_dir() {
        return Err(IndexError::MissingPostDir(posts_dir.to_path_buf()));
    }

    let entries =
        fs::read_dir(posts_dir).map_err(|err| IndexError::Io(posts_dir.to_path_buf(), err))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();

    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}

/// Read one post file, logging and returning `None` when it is skipped.
fn load_summary(
    path: &Path,
    config: &SiteConfig,
    seen: &mut FxHashSet<String>,
) -> Option<ArticleSummary> {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );

    let record = match read_record(path) {
        Ok(record) => record,
        Err(err) => {
            log!("error"; "{}: {}", name, err);
            return None;
        }
    };

    if let Some(field) = record.missing_field() {
        log!("warn"; "skipping {}: missing required field `{}`", name, field);
        return None;
    }
    if !record.is_published() {
        log!("index"; "skipping {}: not published", name);
        return None;
    }

    let article = summarize(
        record,
        &config.site.author,
        config.blog.words_per_minute,
    );
    if !seen.insert(article.id.clone()) {
        log!("warn"; "skipping {}: duplicate id `{}`", name, article.id);
        return None;
    }
    Some(article)
}

fn read_record(path: &Path) -> anyhow::Result<PostRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Project a stored record onto its listing entry.
///
/// Callers must have checked [`PostRecord::missing_field`].
fn summarize(record: PostRecord, default_author: &str, words_per_minute: usize) -> ArticleSummary {
    let non_blank = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

    let id = record.id.unwrap_or_default();
    let read_time = match record.read_time {
        Some(rt) if !rt.is_blank() => rt,
        _ => estimate_read_time(record.content.as_deref().unwrap_or_default(), words_per_minute),
    };

    ArticleSummary {
        excerpt: non_blank(record.excerpt)
            .or_else(|| non_blank(record.description))
            .unwrap_or_default(),
        author: non_blank(record.author).unwrap_or_else(|| default_author.to_string()),
        tags: record.tags.unwrap_or_default(),
        slug: non_blank(record.slug).unwrap_or_else(|| id.clone()),
        title: record.title.unwrap_or_default(),
        date: record.date.unwrap_or_default(),
        read_time,
        id,
    }
}

/// Estimate reading time from the word count of `content`.
pub fn estimate_read_time(content: &str, words_per_minute: usize) -> ReadTime {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(words_per_minute.max(1)).max(1);
    ReadTime::from_minutes(u32::try_from(minutes).unwrap_or(u32::MAX))
}

/// Serialize the index once and derive both artifact bodies from it.
fn render_artifacts(index: &Index, global: &str) -> Result<(String, String), IndexError> {
    let json = serde_json::to_string_pretty(index)?;
    let script = format!("{SCRIPT_HEADER}\nwindow.{global} = {json};");
    Ok((json, script))
}

fn write_artifact(path: &Path, content: &str) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| IndexError::Io(parent.to_path_buf(), err))?;
    }
    fs::write(path, content).map_err(|err| IndexError::Io(path.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());
        fs::create_dir_all(&config.blog.posts).unwrap();
        (dir, config)
    }

    fn write_post(config: &SiteConfig, file: &str, value: serde_json::Value) {
        fs::write(config.blog.posts.join(file), value.to_string()).unwrap();
    }

    fn post(id: &str, title: &str, date: &str) -> serde_json::Value {
        json!({ "id": id, "title": title, "date": date, "content": "hello world" })
    }

    fn read_index(config: &SiteConfig) -> Index {
        let text = fs::read_to_string(config.blog.index_json_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    // ------------------------------------------------------------------------
    // generate_index
    // ------------------------------------------------------------------------

    #[test]
    fn test_missing_post_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());

        let err = generate_index(&config).unwrap_err();
        assert!(matches!(err, IndexError::MissingPostDir(_)));
        assert!(!config.blog.index_json_path().exists());
    }

    #[test]
    fn test_partial_failure_skips_invalid() {
        let (_dir, config) = setup();
        write_post(&config, "2025-01-01-a.json", post("2025-01-01-a", "A", "2025-01-01"));
        write_post(&config, "2025-01-02-b.json", post("2025-01-02-b", "B", "2025-01-02"));
        write_post(&config, "2025-01-03-c.json", post("2025-01-03-c", "C", "2025-01-03"));
        write_post(
            &config,
            "2025-01-04-d.json",
            json!({ "id": "2025-01-04-d", "date": "2025-01-04" }),
        );

        let report = generate_index(&config).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.indexed, 3);
        assert_eq!(report.skipped, 1);

        let index = read_index(&config);
        assert_eq!(index.total_count, 3);
        assert_eq!(index.articles.len(), 3);
    }

    #[test]
    fn test_order_is_filename_descending() {
        let (_dir, config) = setup();
        // file name order deliberately disagrees with the dates
        write_post(&config, "a.json", post("a", "A", "2025-12-31"));
        write_post(&config, "c.json", post("c", "C", "2020-01-01"));
        write_post(&config, "b.json", post("b", "B", "2023-06-15"));

        generate_index(&config).unwrap();
        let ids: Vec<_> = read_index(&config)
            .articles
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_skips_invalid_json_and_other_files() {
        let (_dir, config) = setup();
        write_post(&config, "good.json", post("good", "Good", "2025-01-01"));
        fs::write(config.blog.posts.join("broken.json"), "{ not json").unwrap();
        fs::write(config.blog.posts.join("notes.txt"), "ignored").unwrap();

        let report = generate_index(&config).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.indexed, 1);
    }

    #[test]
    fn test_skips_unpublished_and_duplicates() {
        let (_dir, config) = setup();
        let mut hidden = post("hidden", "Hidden", "2025-01-01");
        hidden["published"] = json!(false);
        write_post(&config, "hidden.json", hidden);
        write_post(&config, "b-dup.json", post("same", "Second", "2025-01-02"));
        write_post(&config, "a-dup.json", post("same", "First", "2025-01-01"));

        let report = generate_index(&config).unwrap();
        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, 2);

        // filename-descending: b-dup.json wins
        let index = read_index(&config);
        assert_eq!(index.articles[0].title, "Second");
    }

    #[test]
    fn test_summary_defaults() {
        let (_dir, mut config) = setup();
        config.site.author = "Alice".into();
        write_post(
            &config,
            "x.json",
            json!({
                "id": "x",
                "title": "X",
                "date": "2025-01-01",
                "description": "from description",
                "content": "word ".repeat(401),
            }),
        );

        generate_index(&config).unwrap();
        let article = &read_index(&config).articles[0];

        assert_eq!(article.excerpt, "from description");
        assert_eq!(article.author, "Alice");
        assert_eq!(article.slug, "x");
        assert!(article.tags.is_empty());
        assert_eq!(article.read_time, ReadTime::Text("3 min read".into()));
    }

    #[test]
    fn test_summary_keeps_record_values() {
        let (_dir, config) = setup();
        write_post(
            &config,
            "y.json",
            json!({
                "id": "y",
                "title": "Y",
                "date": "2025-01-01",
                "excerpt": "E",
                "description": "D",
                "slug": "why",
                "tags": ["rust"],
                "readTime": 12,
                "content": "secret body",
            }),
        );

        generate_index(&config).unwrap();
        let text = fs::read_to_string(config.blog.index_json_path()).unwrap();
        assert!(!text.contains("secret body"));

        let article = &read_index(&config).articles[0];
        assert_eq!(article.excerpt, "E");
        assert_eq!(article.slug, "why");
        assert_eq!(article.tags, vec!["rust"]);
        assert_eq!(article.read_time, ReadTime::Minutes(12));
    }

    #[test]
    fn test_idempotent_apart_from_timestamp() {
        let (_dir, config) = setup();
        write_post(&config, "a.json", post("a", "A", "2025-01-01"));
        write_post(&config, "b.json", post("b", "B", "2025-01-02"));

        generate_index(&config).unwrap();
        let mut first = read_index(&config);
        generate_index(&config).unwrap();
        let mut second = read_index(&config);

        first.last_updated.clear();
        second.last_updated.clear();
        assert_eq!(first, second);
    }

    #[test]
    fn test_script_wraps_json() {
        let (_dir, config) = setup();
        write_post(&config, "a.json", post("a", "A", "2025-01-01"));

        let report = generate_index(&config).unwrap();
        let json = fs::read_to_string(&report.json_path).unwrap();
        let script = fs::read_to_string(&report.script_path).unwrap();

        assert_eq!(
            script,
            format!("// Articles data - generated automatically\nwindow.articlesData = {json};")
        );
    }

    #[test]
    fn test_empty_store() {
        let (_dir, config) = setup();
        let report = generate_index(&config).unwrap();

        assert_eq!(report.indexed, 0);
        let index = read_index(&config);
        assert_eq!(index.total_count, 0);
        assert!(index.generated_by.starts_with("folio"));
    }

    // ------------------------------------------------------------------------
    // estimate_read_time
    // ------------------------------------------------------------------------

    #[test]
    fn test_estimate_read_time() {
        assert_eq!(estimate_read_time("", 200).to_string(), "1 min read");
        assert_eq!(estimate_read_time("   ", 200).to_string(), "1 min read");
        assert_eq!(estimate_read_time(&"w ".repeat(200), 200).to_string(), "1 min read");
        assert_eq!(estimate_read_time(&"w ".repeat(201), 200).to_string(), "2 min read");
        assert_eq!(estimate_read_time("a b c", 0).to_string(), "3 min read");
    }
}
