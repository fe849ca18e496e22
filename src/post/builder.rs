//! Canonical post construction from parsed drafts.

use super::{
    PostError,
    frontmatter::{Frontmatter, MetaValue},
    model::{Post, ReadTime, parse_date},
    slug::{slugify, validate_id},
};
use crate::config::SiteConfig;
use chrono::NaiveDate;

/// Values applied to fields a draft leaves out.
#[derive(Debug, Clone)]
pub struct PostDefaults {
    pub author: String,
    pub read_time: String,
}

impl PostDefaults {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            author: config.site.author.clone(),
            read_time: config.blog.default_read_time.clone(),
        }
    }
}

/// Today's local date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date part of a derived id: `YYYY-MM-DD` when the date parses.
fn id_date(date: &str) -> String {
    parse_date(date).map_or_else(|| date.to_string(), format_date)
}

/// Build a [`Post`] from a parsed draft.
///
/// Only `title` is required. `id` defaults to `{date}-{slug}` and must be
/// lowercase kebab-case either way.
pub fn build_post(
    draft: &Frontmatter,
    defaults: &PostDefaults,
    today: NaiveDate,
) -> Result<Post, PostError> {
    let meta = &draft.metadata;
    let title = meta.text("title").ok_or(PostError::MissingTitle)?;

    let date = meta
        .text("date")
        .map_or_else(|| format_date(today), str::to_string);
    let slug = meta
        .text("slug")
        .map_or_else(|| slugify(title), str::to_string);
    let id = meta
        .text("id")
        .map_or_else(|| format!("{}-{slug}", id_date(&date)), str::to_string);
    validate_id(&id)?;

    let excerpt = meta.text("excerpt").unwrap_or_default().to_string();
    let description = meta
        .text("description")
        .map_or_else(|| excerpt.clone(), str::to_string);
    let author = meta.text("author").unwrap_or(defaults.author.as_str()).to_string();
    let tags = meta.get("tags").map(MetaValue::to_list).unwrap_or_default();
    let read_time = meta.text("readTime").unwrap_or(defaults.read_time.as_str());

    Ok(Post {
        id,
        title: title.to_string(),
        slug,
        excerpt,
        description,
        date,
        author,
        tags,
        read_time: Some(ReadTime::Text(read_time.to_string())),
        published: true,
        allow_comments: true,
        content: draft.body.clone(),
    })
}

/// Initial markdown for a draft created through the authoring API.
pub fn draft_template(title: &str, slug: &str, today: NaiveDate, read_time: &str) -> String {
    format!(
        "---\n\
         title: {title}\n\
         date: {date}\n\
         excerpt: \n\
         tags: []\n\
         readTime: {read_time}\n\
         slug: {slug}\n\
         ---\n\
         \n\
         # {title}\n\
         \n\
         Start writing here...\n",
        date = format_date(today),
    )
}

/// Starter body for a post created by `folio new`.
pub fn post_template_content(title: &str, excerpt: &str) -> String {
    let mut content = format!("# {title}\n\n");
    if !excerpt.is_empty() {
        content.push_str(excerpt);
        content.push_str("\n\n");
    }
    content.push_str(
        "Write your blog post content here using Markdown.\n\n\
         ## Getting Started\n\n\
         You can use:\n\
         - **Bold text**\n\
         - *Italic text*\n\
         - `inline code`\n\
         - [Links](https://example.com)\n\
         - Lists\n\
         - Code blocks\n\n\
         ```rust\n\
         println!(\"Hello, world!\");\n\
         ```\n\n\
         ## Conclusion\n\n\
         Wrap up your thoughts here.",
    );
    content
}
