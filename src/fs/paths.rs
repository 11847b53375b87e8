//! Archive layout on disk.
//!
//! One directory per post at `<base>/<date-bucket>/<slug>/`. The
//! document file inside it doubles as the idempotency check for re-runs;
//! downloaded assets live in a `media/` subdirectory next to it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Fixed document file name inside a post directory.
pub const DOCUMENT_FILE: &str = "post.md";

/// Media subdirectory name inside a post directory.
pub const MEDIA_DIR: &str = "media";

/// Top-level index file name.
pub const INDEX_FILE: &str = "INDEX.md";

/// Directory for a post: `<base>/<date-bucket>/<slug>`.
pub fn post_dir(
    base_dir: &Path,
    date_format: &str,
    created_at: &DateTime<Utc>,
    slug: &str,
) -> PathBuf {
    let bucket = created_at.format(date_format).to_string();
    base_dir.join(bucket).join(slug)
}

/// The document file whose existence marks a post as archived.
pub fn document_path(post_dir: &Path) -> PathBuf {
    post_dir.join(DOCUMENT_FILE)
}

/// The media subdirectory of a post.
pub fn media_dir(post_dir: &Path) -> PathBuf {
    post_dir.join(MEDIA_DIR)
}

/// The top-level index document.
pub fn index_path(base_dir: &Path) -> PathBuf {
    base_dir.join(INDEX_FILE)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_post_dir_layout() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let dir = post_dir(Path::new("/archive"), "%Y/%m", &created, "2024-03-01-hello");
        assert_eq!(dir, PathBuf::from("/archive/2024/03/2024-03-01-hello"));
    }

    #[test]
    fn test_document_and_media_paths() {
        let dir = Path::new("/archive/2024/03/slug");
        assert_eq!(
            document_path(dir),
            PathBuf::from("/archive/2024/03/slug/post.md")
        );
        assert_eq!(media_dir(dir), PathBuf::from("/archive/2024/03/slug/media"));
    }

    #[test]
    fn test_index_path() {
        assert_eq!(
            index_path(Path::new("/archive")),
            PathBuf::from("/archive/INDEX.md")
        );
    }
}
