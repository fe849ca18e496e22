//! Post building and storage errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("missing title in frontmatter")]
    MissingTitle,

    #[error("invalid slug `{0}`: must be lowercase kebab-case")]
    InvalidSlug(String),

    #[error("invalid post id `{0}`: must be lowercase kebab-case")]
    InvalidId(String),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid post JSON in `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_post_error_display() {
        assert_eq!(
            PostError::MissingTitle.to_string(),
            "missing title in frontmatter"
        );

        let err = PostError::Io(
            PathBuf::from("drafts/a.md"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("drafts/a.md"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
