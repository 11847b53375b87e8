//! The archival writer: slugs, directories, media, rendering, stats.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::markdown::MarkdownRenderer;
use crate::archive::media::{media_filename, MediaSink};
use crate::archive::state::ArchiveStats;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::naming::{slugify_post, unique_slug};
use crate::fs::paths::{document_path, ensure_dir, media_dir, post_dir, MEDIA_DIR};
use crate::post::item::Post;

/// Outcome of archiving a single post.
struct PostOutcome {
    media_downloaded: u64,
    already_archived: bool,
}

/// Writes posts to the archive tree.
///
/// Posts are processed one at a time in source order so directory layout
/// and slug-collision numbering are reproducible. One post's failure
/// never aborts the batch.
pub struct Archiver<S: MediaSink> {
    base_dir: PathBuf,
    date_format: String,
    media_sink: S,
    renderer: MarkdownRenderer,
    assigned_slugs: HashSet<String>,
}

impl<S: MediaSink> Archiver<S> {
    pub fn new(config: &Config, media_sink: S) -> Self {
        Self {
            base_dir: config.output.base_dir.clone(),
            date_format: config.output.date_format.clone(),
            media_sink,
            renderer: MarkdownRenderer::new(),
            assigned_slugs: HashSet::new(),
        }
    }

    /// Archive a batch of posts and rewrite the index.
    pub async fn archive_posts(&mut self, posts: &mut [Post]) -> ArchiveStats {
        let mut stats = ArchiveStats {
            total: posts.len() as u64,
            ..Default::default()
        };

        let bar = ProgressBar::new(posts.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Archiving posts [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );

        for post in posts.iter_mut() {
            match self.archive_one(post).await {
                Ok(outcome) => {
                    stats.record_success();
                    stats.add_media(outcome.media_downloaded);
                    if outcome.already_archived {
                        tracing::debug!(
                            "Post already archived: {}",
                            post.slug.as_deref().unwrap_or(&post.id)
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to archive post {}: {}", post.id, e);
                    stats.record_failure();
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();

        // The index is rewritten wholesale from the complete post set so
        // it always reflects the current archive contents.
        if let Err(e) = self
            .renderer
            .write_index(posts, &self.base_dir, &self.date_format)
        {
            tracing::error!("Failed to generate index: {}", e);
        }

        stats
    }

    /// Run one post through the archival state machine.
    async fn archive_one(&mut self, post: &mut Post) -> Result<PostOutcome> {
        // Slug assignment happens exactly once, before any disk work, so
        // collision numbering follows source order.
        let base_slug = slugify_post(&post.content, &post.created_at);
        let slug = unique_slug(&base_slug, &self.assigned_slugs);
        self.assigned_slugs.insert(slug.clone());
        post.slug = Some(slug.clone());

        let dir = post_dir(&self.base_dir, &self.date_format, &post.created_at, &slug);
        ensure_dir(&dir)?;

        // The document's existence is the idempotency signal: a post
        // archived by a previous run costs no network or write work.
        let doc_path = document_path(&dir);
        if doc_path.exists() {
            return Ok(PostOutcome {
                media_downloaded: 0,
                already_archived: true,
            });
        }

        let media_downloaded = if post.has_media() {
            self.download_media(post, &dir).await
        } else {
            0
        };

        self.renderer
            .save(post, &doc_path)
            .map_err(|e| Error::PostArchival {
                id: post.id.clone(),
                message: e.to_string(),
            })?;

        Ok(PostOutcome {
            media_downloaded,
            already_archived: false,
        })
    }

    /// Media phase: resolve each reference, tolerating per-item failure.
    async fn download_media(&self, post: &mut Post, dir: &Path) -> u64 {
        let media_dir = media_dir(dir);
        if let Err(e) = ensure_dir(&media_dir) {
            tracing::warn!("Could not create media directory for {}: {}", post.id, e);
            return 0;
        }

        let mut downloaded = 0u64;

        for (idx, media) in post.media.iter_mut().enumerate() {
            let ordinal = idx + 1;

            let filename = match media_filename(media, ordinal) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!("Unusable media {} on post {}: {}", ordinal, post.id, e);
                    continue;
                }
            };

            let dest = media_dir.join(&filename);

            // Idempotent at the file level too: an asset fetched by an
            // earlier (perhaps interrupted) run is not fetched again.
            if dest.exists() {
                tracing::debug!("Media already exists: {}", filename);
                media.local_path = Some(PathBuf::from(MEDIA_DIR).join(&filename));
                media.filename = Some(filename);
                continue;
            }

            match self.media_sink.download(media, &dest).await {
                Ok(true) => {
                    media.local_path = Some(PathBuf::from(MEDIA_DIR).join(&filename));
                    media.filename = Some(filename);
                    downloaded += 1;
                }
                Ok(false) => {
                    tracing::warn!("Media {} skipped for post {}", ordinal, post.id);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to download media {} for post {}: {}",
                        ordinal,
                        post.id,
                        e
                    );
                }
            }
        }

        downloaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::item::{Media, MediaKind, PostKind};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Sink that "downloads" by writing a marker file.
    #[derive(Default)]
    struct FakeSink {
        calls: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl MediaSink for FakeSink {
        async fn download(&self, _media: &Media, dest: &Path) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::MediaUnavailable("boom".to_string()));
            }
            std::fs::write(dest, b"data")?;
            Ok(true)
        }
    }

    fn make_post(id: &str, content: &str) -> Post {
        Post {
            id: id.to_string(),
            source_url: format!("https://example.com/p/{}", id),
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            kind: PostKind::Original,
            media: Vec::new(),
            hashtags: Vec::new(),
            repost_source_url: None,
            repost_commentary: None,
            slug: None,
        }
    }

    fn make_config(base: &Path) -> Config {
        let mut config = Config::default();
        config.output.base_dir = base.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_archive_and_idempotent_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path());

        let mut posts = vec![make_post("1", "First post"), make_post("2", "Second post")];
        posts[0]
            .media
            .push(Media::new(MediaKind::Image, "https://cdn.example.com/a.jpg"));

        let mut archiver = Archiver::new(&config, FakeSink::default());
        let stats = archiver.archive_posts(&mut posts).await;

        assert_eq!(stats.total, 2);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.media_downloaded, 1);

        let doc = dir
            .path()
            .join("2024/03/2024-03-01-first-post/post.md");
        assert!(doc.exists());
        assert!(dir
            .path()
            .join("2024/03/2024-03-01-first-post/media/image-1.jpg")
            .exists());
        assert!(dir.path().join("INDEX.md").exists());

        // Second run: same success count, no media re-downloaded.
        let sink = FakeSink::default();
        let mut posts2 = vec![make_post("1", "First post"), make_post("2", "Second post")];
        posts2[0]
            .media
            .push(Media::new(MediaKind::Image, "https://cdn.example.com/a.jpg"));

        let mut archiver2 = Archiver::new(&config, sink);
        let stats2 = archiver2.archive_posts(&mut posts2).await;

        assert_eq!(stats2.succeeded, 2);
        assert_eq!(stats2.media_downloaded, 0);
        assert_eq!(archiver2.media_sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slug_collision_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path());

        let mut posts = vec![
            make_post("1", "Same words here"),
            make_post("2", "Same words here"),
            make_post("3", "Same words here"),
        ];

        let mut archiver = Archiver::new(&config, FakeSink::default());
        archiver.archive_posts(&mut posts).await;

        assert_eq!(posts[0].slug.as_deref(), Some("2024-03-01-same-words-here"));
        assert_eq!(
            posts[1].slug.as_deref(),
            Some("2024-03-01-same-words-here-2")
        );
        assert_eq!(
            posts[2].slug.as_deref(),
            Some("2024-03-01-same-words-here-3")
        );
    }

    #[tokio::test]
    async fn test_media_failure_does_not_fail_post() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path());

        let mut posts = vec![make_post("1", "Post with broken media")];
        posts[0]
            .media
            .push(Media::new(MediaKind::Image, "https://cdn.example.com/a.jpg"));

        let sink = FakeSink {
            fail: true,
            ..Default::default()
        };
        let mut archiver = Archiver::new(&config, sink);
        let stats = archiver.archive_posts(&mut posts).await;

        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.media_downloaded, 0);
        assert!(!posts[0].media[0].is_resolved());

        let doc = std::fs::read_to_string(
            dir.path()
                .join("2024/03/2024-03-01-post-with-broken-media/post.md"),
        )
        .unwrap();
        assert!(doc.contains("_Media not available locally_"));
    }
}
