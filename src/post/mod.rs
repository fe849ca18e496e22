//! Post domain: drafts in, canonical post records out.
//!
//! | Module        | Role                                        |
//! |---------------|---------------------------------------------|
//! | `frontmatter` | split a draft into metadata and body        |
//! | `slug`        | title → URL-safe token                      |
//! | `builder`     | metadata + body → [`Post`] with defaults    |
//! | `model`       | serialized records (post, summary, index)   |

pub mod builder;
mod error;
pub mod frontmatter;
pub mod model;
pub mod slug;

pub use builder::{PostDefaults, build_post};
pub use error::PostError;
pub use model::{ArticleSummary, Index, Post, PostRecord, ReadTime};
