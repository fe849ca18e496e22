//! Title slugification.
//!
//! Converts post titles to URL-safe lowercase kebab-case tokens.

use super::PostError;

/// Characters removed outright instead of becoming a separator.
const ELIDED_CHARS: &[char] = &['\'', '"', '`'];

/// Convert a title to a URL-safe slug.
///
/// Non-ASCII text is transliterated first, so `"Café Notes"` becomes
/// `"cafe-notes"`. Apostrophes and quotes are dropped so contractions stay
/// one word; every other run of non-alphanumeric characters collapses into a
/// single `-`.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode::deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if ELIDED_CHARS.contains(&c) {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Check that `slug` is lowercase kebab-case.
pub fn validate_slug(slug: &str) -> Result<(), PostError> {
    if is_kebab(slug) {
        Ok(())
    } else {
        Err(PostError::InvalidSlug(slug.to_string()))
    }
}

/// Check that a post id is safe to use as `posts/{id}.json`.
///
/// Ids follow the slug rule, so separators and `..` never reach the path.
pub fn validate_id(id: &str) -> Result<(), PostError> {
    if is_kebab(id) {
        Ok(())
    } else {
        Err(PostError::InvalidId(id.to_string()))
    }
}

fn is_kebab(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
