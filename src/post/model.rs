//! Serialized blog records.
//!
//! - [`Post`]: one `posts/{id}.json` artifact
//! - [`PostRecord`]: lenient view of a stored post, used while indexing
//! - [`ArticleSummary`] / [`Index`]: the denormalized listing artifact

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reading time, stored either as text (`"5 min read"`) or as minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadTime {
    Minutes(u32),
    Text(String),
}

impl ReadTime {
    pub fn from_minutes(minutes: u32) -> Self {
        Self::Text(format!("{minutes} min read"))
    }

    /// Whole minutes, parsed from the leading number of the text form.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            Self::Minutes(n) => Some(*n),
            Self::Text(text) => {
                let digits: String = text
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.minutes()) {
            (_, Some(n)) => write!(f, "{n} min read"),
            (Self::Text(text), None) => f.write_str(text),
            (Self::Minutes(n), None) => write!(f, "{n} min read"),
        }
    }
}

/// A published article, as written to `posts/{id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<ReadTime>,
    /// Records written by older tools omit this; absent means published.
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    #[serde(default)]
    pub content: String,
}

const fn default_true() -> bool {
    true
}

/// Lenient view of a stored post. Required fields are checked by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub read_time: Option<ReadTime>,
    pub published: Option<bool>,
    pub content: Option<String>,
}

impl PostRecord {
    /// Name of the first missing required field (`id`, `title`, `date`).
    pub fn missing_field(&self) -> Option<&'static str> {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&self.id) {
            Some("id")
        } else if blank(&self.title) {
            Some("title")
        } else if blank(&self.date) {
            Some("date")
        } else {
            None
        }
    }

    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(true)
    }
}

/// Listing entry: a post without its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub read_time: ReadTime,
    #[serde(default)]
    pub slug: String,
}

impl ArticleSummary {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The `articles.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub articles: Vec<ArticleSummary>,
    pub total_count: usize,
    pub last_updated: String,
    pub generated_by: String,
}

/// Tool identifier written to `generatedBy`.
pub fn generator_name() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Parse `YYYY-MM-DD`, also accepting a full RFC 3339 timestamp.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_time_accepts_both_forms() {
        let text: ReadTime = serde_json::from_str(r#""7 min read""#).unwrap();
        let minutes: ReadTime = serde_json::from_str("7").unwrap();

        assert_eq!(text.minutes(), Some(7));
        assert_eq!(minutes.minutes(), Some(7));
        assert_eq!(text.to_string(), "7 min read");
        assert_eq!(minutes.to_string(), "7 min read");
    }

    #[test]
    fn test_read_time_free_text() {
        let rt = ReadTime::Text("a long read".into());
        assert_eq!(rt.minutes(), None);
        assert_eq!(rt.to_string(), "a long read");
        assert!(ReadTime::Text("  ".into()).is_blank());
        assert!(!ReadTime::Minutes(0).is_blank());
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = Post {
            id: "2025-01-01-x".into(),
            title: "X".into(),
            slug: "x".into(),
            excerpt: String::new(),
            description: String::new(),
            date: "2025-01-01".into(),
            author: "Anonymous".into(),
            tags: vec!["a".into()],
            read_time: Some(ReadTime::from_minutes(5)),
            published: true,
            allow_comments: true,
            content: "# X".into(),
        };
        let json = serde_json::to_string(&post).unwrap();

        assert!(json.contains(r#""readTime":"5 min read""#));
        assert!(json.contains(r#""allowComments":true"#));
        // field order follows the struct
        assert!(json.starts_with(r#"{"id":"2025-01-01-x","title":"X","slug":"x""#));
    }

    #[test]
    fn test_post_published_defaults_to_true() {
        let json = r#"{"id":"a","title":"A","date":"2025-01-01","content":"hi"}"#;
        let post: Post = serde_json::from_str(json).unwrap();

        assert!(post.published);
        assert!(post.allow_comments);
        assert_eq!(post.read_time, None);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_post_record_missing_field() {
        let record: PostRecord = serde_json::from_str(r#"{"id":"a","date":"2025-01-01"}"#).unwrap();
        assert_eq!(record.missing_field(), Some("title"));

        let record: PostRecord = serde_json::from_str(r#"{"id":" ","title":"T"}"#).unwrap();
        assert_eq!(record.missing_field(), Some("id"));

        let record: PostRecord =
            serde_json::from_str(r#"{"id":"a","title":"T","date":"2025-01-01"}"#).unwrap();
        assert_eq!(record.missing_field(), None);
        assert!(record.is_published());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-01-31"), NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(
            parse_date("2025-01-31T10:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_generator_name() {
        assert!(generator_name().starts_with("folio "));
    }
}
