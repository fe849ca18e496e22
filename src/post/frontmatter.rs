//! Frontmatter parsing for markdown drafts.
//!
//! A draft may start with a metadata block:
//!
//! ```text
//! ---
//! title: Hello World
//! date: 2025-01-01
//! tags: [rust, blog]
//! ---
//!
//! # Hello World
//! ```
//!
//! Each metadata line is split at the first `:`. Values written as `[a, b]`
//! become lists. Input without a complete block is treated as pure body.

/// Frontmatter delimiter line.
const DELIMITER: &str = "---";

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Decode a trimmed raw value, recognizing the `[a, b]` list form.
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => Self::List(split_list(inner)),
            None => Self::Text(raw.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// View the value as a list. A text value is split on commas.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Text(s) => split_list(s),
            Self::List(items) => items.clone(),
        }
    }
}

/// Ordered key/value metadata. Later duplicate keys replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetaValue)>,
}

impl Metadata {
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text value of `key`, `None` when absent, a list, or blank.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(MetaValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A draft split into metadata and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub metadata: Metadata,
    pub body: String,
}

/// Split `text` into frontmatter metadata and a trimmed body.
///
/// Never fails: when no complete `---` block opens the document, the whole
/// input is returned as the body with empty metadata.
pub fn parse(text: &str) -> Frontmatter {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some((block, body)) = split_block(text) else {
        return Frontmatter {
            metadata: Metadata::default(),
            body: text.to_string(),
        };
    };

    let mut metadata = Metadata::default();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key, MetaValue::parse(value.trim()));
    }

    Frontmatter {
        metadata,
        body: body.trim().to_string(),
    }
}

/// Locate the metadata block. Returns `(block, rest)`.
fn split_block(text: &str) -> Option<(&str, &str)> {
    let (first, mut rest) = text.split_once('\n')?;
    if !is_delimiter(first) {
        return None;
    }

    let block_start = rest;
    let mut consumed = 0;
    loop {
        let (line, next) = match rest.split_once('\n') {
            Some((line, next)) => (line, next),
            None => (rest, ""),
        };
        if is_delimiter(line) {
            return Some((&block_start[..consumed], next));
        }
        if next.is_empty() && line.len() == rest.len() {
            return None;
        }
        consumed += line.len() + 1;
        rest = next;
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn split_list(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_frontmatter() {
        let draft = "---\ntitle: Hello World\ndate: 2025-01-01\n---\n\n# Hello\n\nBody text.\n";
        let fm = parse(draft);

        assert_eq!(fm.metadata.text("title"), Some("Hello World"));
        assert_eq!(fm.metadata.text("date"), Some("2025-01-01"));
        assert_eq!(fm.body, "# Hello\n\nBody text.");
    }

    #[test]
    fn test_parse_list_values() {
        let fm = parse("---\ntags: [a,  b , c]\nempty: []\n---\nbody");

        assert_eq!(
            fm.metadata.get("tags"),
            Some(&MetaValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(fm.metadata.get("empty"), Some(&MetaValue::List(vec![])));
    }

    #[test]
    fn test_parse_splits_at_first_colon() {
        let fm = parse("---\ntitle: Rust: the good parts\nurl: https://x.dev/a\n---\n");

        assert_eq!(fm.metadata.text("title"), Some("Rust: the good parts"));
        assert_eq!(fm.metadata.text("url"), Some("https://x.dev/a"));
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_parse_without_frontmatter() {
        let text = "# Just a heading\n\nNo metadata here.";
        let fm = parse(text);

        assert!(fm.metadata.is_empty());
        assert_eq!(fm.body, text);
    }

    #[test]
    fn test_parse_unclosed_block_is_body() {
        let text = "---\ntitle: Oops\nno closing delimiter";
        let fm = parse(text);

        assert!(fm.metadata.is_empty());
        assert_eq!(fm.body, text);
    }

    #[test]
    fn test_parse_delimiter_must_be_exact() {
        let text = "----\ntitle: x\n----\nbody";
        let fm = parse(text);
        assert!(fm.metadata.is_empty());

        let text = "--- title: x\n---\nbody";
        assert!(parse(text).metadata.is_empty());
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let fm = parse("\u{feff}---\r\ntitle: Windows\r\n---\r\nbody\r\n");

        assert_eq!(fm.metadata.text("title"), Some("Windows"));
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn test_parse_ignores_lines_without_colon() {
        let fm = parse("---\njust words\n: novalue\ntitle: Kept\n---\nbody");

        assert_eq!(fm.metadata.text("title"), Some("Kept"));
        assert_eq!(fm.metadata.get("just words"), None);
        assert_eq!(fm.metadata.get(""), None);
    }

    #[test]
    fn test_parse_duplicate_keys_last_wins() {
        let fm = parse("---\ntitle: First\ntitle: Second\n---\n");
        assert_eq!(fm.metadata, {
            let mut expected = Metadata::default();
            expected.insert("title", MetaValue::Text("Second".into()));
            expected
        });
    }

    #[test]
    fn test_parse_empty_block() {
        let fm = parse("---\n---\nbody");
        assert!(fm.metadata.is_empty());
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn test_parse_closing_delimiter_at_eof() {
        let fm = parse("---\ntitle: End\n---");
        assert_eq!(fm.metadata.text("title"), Some("End"));
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_text_skips_blank_and_list() {
        let fm = parse("---\nexcerpt:\ntags: [x]\n---\n");
        assert_eq!(fm.metadata.text("excerpt"), None);
        assert_eq!(fm.metadata.text("tags"), None);
        assert!(fm.metadata.get("excerpt").is_some());
    }

    #[test]
    fn test_meta_value_to_list() {
        assert_eq!(
            MetaValue::Text("rust, web".into()).to_list(),
            vec!["rust".to_string(), "web".to_string()]
        );
        assert_eq!(MetaValue::Text(String::new()).to_list(), Vec::<String>::new());
    }
}
