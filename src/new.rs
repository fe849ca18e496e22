//! Interactive post creation (`folio new`).
//!
//! Asks for a title, an optional excerpt and optional tags, then writes a
//! post record with starter content straight into the post store.

use crate::{
    config::SiteConfig,
    log,
    post::{
        Post, ReadTime,
        builder::{format_date, post_template_content, today},
        slug::slugify,
    },
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

/// Answers collected by the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
}

/// Prompt on the terminal and create the post.
pub fn new_post(config: &SiteConfig) -> Result<PathBuf> {
    let stdin = io::stdin();
    let answers = ask(&mut stdin.lock(), &mut io::stderr())?;
    let path = write_post(&answers, config, today())?;

    log!("new"; "created {}", path.display());
    log!("new"; "edit the content, then run `folio index`");
    Ok(path)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<NewPost> {
    let title = prompt(input, out, "Post title")?;
    if title.is_empty() {
        bail!("Title is required");
    }
    let excerpt = prompt(input, out, "Short excerpt (optional)")?;
    let tags = prompt(input, out, "Tags (comma-separated, optional)")?
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(NewPost {
        title,
        excerpt,
        tags,
    })
}

/// Write `posts/{date}-{slug}.json`. Existing posts are never overwritten.
fn write_post(answers: &NewPost, config: &SiteConfig, date: NaiveDate) -> Result<PathBuf> {
    let slug = slugify(&answers.title);
    if slug.is_empty() {
        bail!("Title `{}` produces an empty slug", answers.title);
    }
    let date = format_date(date);
    let id = format!("{date}-{slug}");

    let post = Post {
        id: id.clone(),
        title: answers.title.clone(),
        slug,
        excerpt: answers.excerpt.clone(),
        description: answers.excerpt.clone(),
        date,
        author: config.site.author.clone(),
        tags: answers.tags.clone(),
        read_time: Some(ReadTime::Text(config.blog.default_read_time.clone())),
        published: true,
        allow_comments: true,
        content: post_template_content(&answers.title, &answers.excerpt),
    };

    let path = config.blog.post_path(&id);
    if path.exists() {
        bail!("Post `{}` already exists", path.display());
    }
    fs::create_dir_all(&config.blog.posts)
        .with_context(|| format!("Failed to create {}", config.blog.posts.display()))?;
    fs::write(&path, serde_json::to_string_pretty(&post)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn answers(input: &str) -> Result<NewPost> {
        let mut out = Vec::new();
        ask(&mut Cursor::new(input), &mut out)
    }

    #[test]
    fn test_ask_collects_answers() {
        let got = answers("  My Post \nA short intro\nrust, , web \n").unwrap();
        assert_eq!(got.title, "My Post");
        assert_eq!(got.excerpt, "A short intro");
        assert_eq!(got.tags, vec!["rust", "web"]);
    }

    #[test]
    fn test_ask_optional_fields() {
        let got = answers("Title only\n\n\n").unwrap();
        assert_eq!(got.excerpt, "");
        assert!(got.tags.is_empty());

        // EOF after the title
        assert!(answers("Title only\n").is_ok());
    }

    #[test]
    fn test_ask_requires_title() {
        assert!(answers("\nexcerpt\n").is_err());
        assert!(answers("").is_err());
    }

    #[test]
    fn test_ask_prints_prompts() {
        let mut out = Vec::new();
        ask(&mut Cursor::new("T\n\n\n"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Post title: "));
        assert!(text.contains("Tags (comma-separated, optional): "));
    }

    #[test]
    fn test_write_post() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());
        config.site.author = "Alice".into();

        let answers = NewPost {
            title: "Hello World".into(),
            excerpt: "Intro".into(),
            tags: vec!["rust".into()],
        };
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let path = write_post(&answers, &config, date).unwrap();
        assert_eq!(path, config.blog.post_path("2025-02-03-hello-world"));

        let post: Post = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(post.author, "Alice");
        assert_eq!(post.description, "Intro");
        assert!(post.content.starts_with("# Hello World\n\nIntro"));

        // second run with the same title on the same day
        assert!(write_post(&answers, &config, date).is_err());
    }
}
