//! Markdown to HTML conversion.
//!
//! Two implementations behind one [`MarkdownRenderer`] trait:
//!
//! | Renderer         | Backend              | Available             |
//! |------------------|----------------------|-----------------------|
//! | [`CmarkRenderer`]| pulldown-cmark (GFM) | `cmark` feature       |
//! | [`BasicRenderer`]| line scanner + regex | always                |
//!
//! [`markdown_renderer`] picks one at startup; callers only see the trait.

use crate::config::MarkdownChoice;
use anyhow::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Attributes added to links leaving the site.
const EXTERNAL_LINK_ATTRS: &str = r#" target="_blank" rel="noopener noreferrer""#;

pub trait MarkdownRenderer {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    fn render(&self, markdown: &str) -> String;
}

/// Select the markdown backend for this run.
///
/// `force_basic` comes from the command line and wins over `choice`.
pub fn markdown_renderer(
    choice: MarkdownChoice,
    force_basic: bool,
    site_url: Option<&str>,
) -> Result<Box<dyn MarkdownRenderer>> {
    let site_url = site_url.map(str::to_string);
    if force_basic {
        return Ok(Box::new(BasicRenderer::new(site_url)));
    }

    match choice {
        MarkdownChoice::Basic => Ok(Box::new(BasicRenderer::new(site_url))),
        #[cfg(feature = "cmark")]
        MarkdownChoice::Auto | MarkdownChoice::Full => Ok(Box::new(CmarkRenderer::new(site_url))),
        #[cfg(not(feature = "cmark"))]
        MarkdownChoice::Auto => Ok(Box::new(BasicRenderer::new(site_url))),
        #[cfg(not(feature = "cmark"))]
        MarkdownChoice::Full => {
            anyhow::bail!("[blog.markdown] = \"full\" requires folio built with the `cmark` feature")
        }
    }
}

/// Whether `href` points away from the site.
fn is_external(href: &str, site_url: Option<&str>) -> bool {
    let absolute = href.starts_with("http://") || href.starts_with("https://");
    absolute && site_url.is_none_or(|site| !href.starts_with(site.trim_end_matches('/')))
}

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// pulldown-cmark
// ============================================================================

#[cfg(feature = "cmark")]
pub use cmark::CmarkRenderer;

#[cfg(feature = "cmark")]
mod cmark {
    use super::{EXTERNAL_LINK_ATTRS, MarkdownRenderer, escape_html, is_external};
    use pulldown_cmark::{Event, Options, Parser, Tag, html};

    /// GFM renderer: tables, strikethrough, task lists.
    pub struct CmarkRenderer {
        site_url: Option<String>,
    }

    impl CmarkRenderer {
        pub const fn new(site_url: Option<String>) -> Self {
            Self { site_url }
        }

        fn options() -> Options {
            let mut opts = Options::empty();
            opts.insert(Options::ENABLE_TABLES);
            opts.insert(Options::ENABLE_STRIKETHROUGH);
            opts.insert(Options::ENABLE_TASKLISTS);
            opts
        }
    }

    impl MarkdownRenderer for CmarkRenderer {
        fn name(&self) -> &'static str {
            "cmark"
        }

        fn render(&self, markdown: &str) -> String {
            let site_url = self.site_url.as_deref();
            let events = Parser::new_ext(markdown, Self::options()).map(|event| match event {
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) if is_external(&dest_url, site_url) => {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    Event::Html(
                        format!(
                            r#"<a href="{}"{title_attr}{EXTERNAL_LINK_ATTRS}>"#,
                            escape_html(&dest_url)
                        )
                        .into(),
                    )
                }
                other => other,
            });

            let mut out = String::with_capacity(markdown.len() * 3 / 2);
            html::push_html(&mut out, events);
            out
        }
    }
}

// ============================================================================
// Basic fallback
// ============================================================================

static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").unwrap());
static RE_LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").unwrap());
static RE_CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_BOLD_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap());
static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*").unwrap());
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());

/// Dependency-free renderer for the common subset: headings, emphasis,
/// fenced and inline code, links, list items and paragraphs.
pub struct BasicRenderer {
    site_url: Option<String>,
}

/// Block being accumulated by [`BasicRenderer`].
enum Block {
    None,
    Paragraph(Vec<String>),
    List(Vec<String>),
    Code { lang: String, lines: Vec<String> },
}

impl BasicRenderer {
    pub const fn new(site_url: Option<String>) -> Self {
        Self { site_url }
    }

    fn flush(&self, block: &mut Block, out: &mut String) {
        match std::mem::replace(block, Block::None) {
            Block::None => {}
            Block::Paragraph(lines) => {
                let lines: Vec<_> = lines.iter().map(|l| self.inline(l)).collect();
                out.push_str(&format!("<p>{}</p>\n", lines.join("<br>\n")));
            }
            Block::List(items) => {
                out.push_str("<ul>\n");
                for item in items {
                    out.push_str(&format!("<li>{}</li>\n", self.inline(&item)));
                }
                out.push_str("</ul>\n");
            }
            Block::Code { lang, lines } => {
                let class = if lang.is_empty() {
                    String::new()
                } else {
                    format!(r#" class="language-{}""#, escape_html(&lang))
                };
                let mut code = escape_html(&lines.join("\n"));
                if !lines.is_empty() {
                    code.push('\n');
                }
                out.push_str(&format!("<pre><code{class}>{code}</code></pre>\n"));
            }
        }
    }

    /// Inline markup for one line. Code spans are protected from emphasis.
    fn inline(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for caps in RE_CODE_SPAN.captures_iter(line) {
            let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&self.emphasis(&line[last..whole.start()]));
            out.push_str(&format!(
                r#"<code class="inline-code">{}</code>"#,
                escape_html(code.as_str())
            ));
            last = whole.end();
        }
        out.push_str(&self.emphasis(&line[last..]));
        out
    }

    fn emphasis(&self, text: &str) -> String {
        let text = escape_html(text);
        let text = RE_BOLD_ITALIC.replace_all(&text, "<strong><em>$1</em></strong>");
        let text = RE_BOLD.replace_all(&text, "<strong>$1</strong>");
        let text = RE_ITALIC.replace_all(&text, "<em>$1</em>");
        RE_LINK
            .replace_all(&text, |caps: &Captures| {
                let href = &caps[2];
                let attrs = if is_external(href, self.site_url.as_deref()) {
                    EXTERNAL_LINK_ATTRS
                } else {
                    ""
                };
                format!(r#"<a href="{href}"{attrs}>{}</a>"#, &caps[1])
            })
            .into_owned()
    }
}

impl MarkdownRenderer for BasicRenderer {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn render(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        let mut block = Block::None;

        for line in markdown.lines() {
            let line = line.trim_end_matches('\r');

            if let Block::Code { lines, .. } = &mut block {
                if line.trim_start().starts_with("```") {
                    self.flush(&mut block, &mut out);
                } else {
                    lines.push(line.to_string());
                }
                continue;
            }

            if let Some(lang) = line.trim_start().strip_prefix("```") {
                self.flush(&mut block, &mut out);
                block = Block::Code {
                    lang: lang.trim().to_string(),
                    lines: Vec::new(),
                };
            } else if line.trim().is_empty() {
                self.flush(&mut block, &mut out);
            } else if let Some(caps) = RE_HEADING.captures(line) {
                self.flush(&mut block, &mut out);
                let level = caps[1].len();
                out.push_str(&format!("<h{level}>{}</h{level}>\n", self.inline(&caps[2])));
            } else if let Some(caps) = RE_LIST_ITEM.captures(line) {
                if !matches!(block, Block::List(_)) {
                    self.flush(&mut block, &mut out);
                    block = Block::List(Vec::new());
                }
                if let Block::List(items) = &mut block {
                    items.push(caps[1].to_string());
                }
            } else {
                if !matches!(block, Block::Paragraph(_)) {
                    self.flush(&mut block, &mut out);
                    block = Block::Paragraph(Vec::new());
                }
                if let Block::Paragraph(lines) = &mut block {
                    lines.push(line.trim().to_string());
                }
            }
        }

        // an unterminated fence runs to the end of the document
        self.flush(&mut block, &mut out);
        out
    }
}
