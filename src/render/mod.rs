//! Listing and article views.
//!
//! - [`Renderer`]: output capability for listings, posts and load errors
//! - [`TerminalRenderer`]: colored text on any [`Write`]
//! - [`load_index`] / [`load_post`]: read the published artifacts
//! - [`markdown`]: post body conversion

pub mod markdown;

use self::markdown::escape_html;
use crate::{
    post::{Index, Post},
    query::{FilteredView, QueryState, TagCount, results_label},
};
use colored::Colorize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

// ============================================================================
// Loading
// ============================================================================

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read `{0}`")]
    Unreachable(PathBuf, #[source] io::Error),

    #[error("`{0}` is not a valid artifact")]
    Invalid(PathBuf, #[source] serde_json::Error),

    #[error("article `{0}` not found")]
    NotFound(String),

    #[error("article `{0}` is not published")]
    Unpublished(String),
}

impl LoadError {
    /// What the reader can do about it.
    pub const fn retry_hint(&self) -> &'static str {
        match self {
            Self::Unreachable(..) | Self::Invalid(..) => {
                "run `folio index` to regenerate the articles index, then try again"
            }
            Self::NotFound(_) => "check the id with `folio list`",
            Self::Unpublished(_) => "publish the article first, then try again",
        }
    }
}

/// Load the articles index artifact.
pub fn load_index(path: &Path) -> Result<Index, LoadError> {
    let text =
        fs::read_to_string(path).map_err(|err| LoadError::Unreachable(path.to_path_buf(), err))?;
    serde_json::from_str(&text).map_err(|err| LoadError::Invalid(path.to_path_buf(), err))
}

/// Load `posts_dir/{id}.json`, refusing unpublished records.
pub fn load_post(posts_dir: &Path, id: &str) -> Result<Post, LoadError> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(LoadError::NotFound(id.to_string()));
    }

    let path = posts_dir.join(format!("{id}.json"));
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(id.to_string()));
        }
        Err(err) => return Err(LoadError::Unreachable(path, err)),
    };

    let post: Post = serde_json::from_str(&text).map_err(|err| LoadError::Invalid(path, err))?;
    if !post.published {
        return Err(LoadError::Unpublished(post.id));
    }
    Ok(post)
}

// ============================================================================
// Renderer
// ============================================================================

pub trait Renderer {
    /// Render one page of a filtered listing. `total` is the unfiltered count.
    fn render_listing(
        &mut self,
        view: &FilteredView<'_>,
        tags: &[TagCount],
        state: &QueryState,
        total: usize,
    ) -> io::Result<()>;

    /// Render a single article whose body is already converted to HTML.
    fn render_post(&mut self, post: &Post, html: &str) -> io::Result<()>;

    /// Render a load failure with a retry hint, never partial data.
    fn render_error(&mut self, err: &LoadError) -> io::Result<()>;
}

/// Plain-text renderer for the command line.
pub struct TerminalRenderer<W: Write> {
    out: W,
    site_title: String,
    site_description: String,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, site_title: impl Into<String>) -> Self {
        Self {
            out,
            site_title: site_title.into(),
            site_description: String::new(),
        }
    }

    /// Subtitle printed under the site title in listings.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.site_description = description.into();
        self
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_tags(&mut self, tags: &[TagCount], state: &QueryState) -> io::Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let labels: Vec<String> = tags
            .iter()
            .map(|t| {
                let label = format!("{} ({})", t.tag, t.count);
                if state.active_tags().contains(&t.tag) {
                    format!("[{label}]").bright_green().bold().to_string()
                } else {
                    label
                }
            })
            .collect();
        writeln!(self.out, "{} {}", "Tags:".dimmed(), labels.join("  "))
    }

    fn write_pagination(&mut self, view: &FilteredView<'_>) -> io::Result<()> {
        let window = view.window();
        if !window.is_needed() {
            return Ok(());
        }

        let mut parts = Vec::new();
        parts.push(if window.has_prev { "‹ prev" } else { " " }.to_string());
        if window.show_first {
            parts.push("1".into());
        }
        if window.leading_ellipsis {
            parts.push("…".into());
        }
        for &page in &window.pages {
            if page == window.current {
                parts.push(format!("[{page}]").bold().to_string());
            } else {
                parts.push(page.to_string());
            }
        }
        if window.trailing_ellipsis {
            parts.push("…".into());
        }
        if window.show_last {
            parts.push(window.total_pages.to_string());
        }
        if window.has_next {
            parts.push("next ›".into());
        }

        writeln!(
            self.out,
            "{}  {}",
            parts.join(" ").trim(),
            format!("({})", window.range_label()).dimmed()
        )
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_listing(
        &mut self,
        view: &FilteredView<'_>,
        tags: &[TagCount],
        state: &QueryState,
        total: usize,
    ) -> io::Result<()> {
        writeln!(self.out, "{}", self.site_title.bold())?;
        if !self.site_description.is_empty() {
            writeln!(self.out, "{}", self.site_description.dimmed())?;
        }
        self.write_tags(tags, state)?;
        if let Some(label) = results_label(total, view, state) {
            writeln!(self.out, "{}", label.dimmed())?;
        }
        writeln!(self.out)?;

        if view.is_empty() {
            let hint = if state.is_filtering() {
                "No articles match. Try clearing the search or tag filters."
            } else {
                "No articles yet."
            };
            return writeln!(self.out, "{hint}");
        }

        for article in view.page_articles() {
            writeln!(
                self.out,
                "{}  {}",
                article.date.dimmed(),
                article.title.bright_yellow().bold()
            )?;
            if !article.excerpt.is_empty() {
                writeln!(self.out, "            {}", article.excerpt)?;
            }
            let mut meta = vec![article.read_time.to_string()];
            if !article.tags.is_empty() {
                meta.insert(0, article.tags.join(", "));
            }
            if !article.author.is_empty() {
                meta.push(format!("by {}", article.author));
            }
            writeln!(self.out, "            {}", meta.join(" · ").dimmed())?;
            writeln!(self.out, "            {}", format!("id: {}", article.id).dimmed())?;
        }

        writeln!(self.out)?;
        self.write_pagination(view)
    }

    fn render_post(&mut self, post: &Post, html: &str) -> io::Result<()> {
        writeln!(self.out, "<!-- {} -->", escape_html(&post.id))?;
        writeln!(self.out, "<article>")?;
        writeln!(self.out, "<h1>{}</h1>", escape_html(&post.title))?;

        let mut meta = vec![escape_html(&post.date)];
        if let Some(read_time) = &post.read_time {
            meta.push(escape_html(&read_time.to_string()));
        }
        if !post.author.is_empty() {
            meta.push(format!("by {}", escape_html(&post.author)));
        }
        writeln!(self.out, "<p class=\"meta\">{}</p>", meta.join(" · "))?;
        if !post.tags.is_empty() {
            let tags: Vec<String> = post.tags.iter().map(|t| escape_html(t)).collect();
            writeln!(self.out, "<p class=\"tags\">{}</p>", tags.join(", "))?;
        }

        self.out.write_all(html.as_bytes())?;
        if !html.ends_with('\n') {
            writeln!(self.out)?;
        }
        if post.allow_comments {
            writeln!(
                self.out,
                "<section class=\"comments\" data-post-id=\"{}\"></section>",
                escape_html(&post.id)
            )?;
        }
        writeln!(self.out, "</article>")?;
        self.out.flush()
    }

    fn render_error(&mut self, err: &LoadError) -> io::Result<()> {
        writeln!(self.out, "{} {}", "✗".red(), err.to_string().red())?;
        writeln!(self.out, "  {}", err.retry_hint().dimmed())?;
        self.out.flush()
    }
}
