//! Canonical post and media representations.
//!
//! Both the live-API normalizer and the export normalizer converge on the
//! types in this module. A `Post` is immutable after construction except for
//! `slug` (assigned once by the archival writer) and the per-media
//! `local_path`/`filename` fields (set on a successful download).

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Classification of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    /// A regular text/media post.
    Original,
    /// A reshare of someone else's post.
    Repost,
    /// A post sharing a published article.
    Article,
    /// A poll post.
    Poll,
}

impl PostKind {
    /// Label used in frontmatter and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Original => "original",
            PostKind::Repost => "repost",
            PostKind::Article => "article",
            PostKind::Poll => "poll",
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    /// File name prefix for downloaded assets ("image-1.jpg" etc).
    pub fn file_prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    /// Default file extension (without dot) when none can be derived.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Document => "pdf",
        }
    }

    /// Parse a kind label from source data.
    ///
    /// Unknown labels are an error so that a `Media` can never be
    /// constructed with an out-of-range kind.
    pub fn parse(label: &str) -> Result<Self> {
        match label.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "document" => Ok(MediaKind::Document),
            other => Err(Error::Media(format!("unknown media kind: '{}'", other))),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_prefix())
    }
}

/// A media attachment referenced by a post.
#[derive(Debug, Clone)]
pub struct Media {
    /// Kind of the attachment.
    pub kind: MediaKind,

    /// Remote URL the asset can be fetched from.
    pub remote_url: String,

    /// Path relative to the post directory, set after a successful download.
    pub local_path: Option<PathBuf>,

    /// File name of the downloaded asset.
    pub filename: Option<String>,
}

impl Media {
    /// Create a media reference that has not been downloaded yet.
    pub fn new(kind: MediaKind, remote_url: impl Into<String>) -> Self {
        Self {
            kind,
            remote_url: remote_url.into(),
            local_path: None,
            filename: None,
        }
    }

    /// Whether the asset has been resolved to a local file.
    pub fn is_resolved(&self) -> bool {
        self.local_path.is_some()
    }
}

/// A normalized post, independent of which source shape it came from.
#[derive(Debug, Clone)]
pub struct Post {
    /// Stable identifier. Never empty for API records; synthesized
    /// deterministically for export records lacking one.
    pub id: String,

    /// Canonical address of the original post.
    pub source_url: String,

    /// Post body text. May be empty.
    pub content: String,

    /// Creation time. Falls back to ingestion time when unparseable.
    pub created_at: DateTime<Utc>,

    /// Post classification.
    pub kind: PostKind,

    /// Media attachments, in source order.
    pub media: Vec<Media>,

    /// Deduplicated hashtags extracted from the content.
    pub hashtags: Vec<String>,

    /// URL of the reshared post. Only set when `kind` is `Repost`.
    pub repost_source_url: Option<String>,

    /// The user's own commentary on a repost.
    pub repost_commentary: Option<String>,

    /// Archive directory key. Unset until the archival writer assigns it.
    pub slug: Option<String>,
}

impl Post {
    pub fn is_repost(&self) -> bool {
        self.kind == PostKind::Repost
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }

    /// The slug, or an error if the writer has not assigned one yet.
    pub fn slug(&self) -> Result<&str> {
        self.slug
            .as_deref()
            .ok_or_else(|| Error::PostArchival {
                id: self.id.clone(),
                message: "slug not assigned".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_post(kind: PostKind) -> Post {
        Post {
            id: "urn:li:share:123".to_string(),
            source_url: "https://example.com/post/123".to_string(),
            content: "hello".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            kind,
            media: Vec::new(),
            hashtags: Vec::new(),
            repost_source_url: None,
            repost_commentary: None,
            slug: None,
        }
    }

    #[test]
    fn test_media_kind_parse() {
        assert_eq!(MediaKind::parse("image").unwrap(), MediaKind::Image);
        assert_eq!(MediaKind::parse("Video").unwrap(), MediaKind::Video);
        assert_eq!(MediaKind::parse("DOCUMENT").unwrap(), MediaKind::Document);
        assert!(MediaKind::parse("gif").is_err());
        assert!(MediaKind::parse("").is_err());
    }

    #[test]
    fn test_media_starts_unresolved() {
        let media = Media::new(MediaKind::Image, "https://cdn.example.com/a.jpg");
        assert!(!media.is_resolved());
        assert!(media.filename.is_none());
    }

    #[test]
    fn test_post_kind_labels() {
        assert_eq!(PostKind::Original.as_str(), "original");
        assert_eq!(PostKind::Repost.as_str(), "repost");
        assert_eq!(PostKind::Article.as_str(), "article");
        assert_eq!(PostKind::Poll.as_str(), "poll");
    }

    #[test]
    fn test_is_repost() {
        assert!(make_post(PostKind::Repost).is_repost());
        assert!(!make_post(PostKind::Original).is_repost());
    }

    #[test]
    fn test_slug_unassigned_is_error() {
        let post = make_post(PostKind::Original);
        assert!(post.slug().is_err());
    }
}
