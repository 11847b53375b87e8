//! Media file downloading.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::MediaConfig;
use crate::error::{Error, Result};
use crate::fs::naming::sanitize_filename;
use crate::post::item::{Media, MediaKind};

/// Minimum declared size to show a progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Destination sink for media downloads.
///
/// `Ok(true)` means the asset was written to `dest`; `Ok(false)` means
/// it was deliberately skipped (disabled kind, oversized video, failed
/// validation). Errors are transport-level failures. The archival writer
/// treats every non-`Ok(true)` outcome as "reference stays unresolved"
/// and carries on with the post.
#[async_trait]
pub trait MediaSink: Send + Sync {
    async fn download(&self, media: &Media, dest: &Path) -> Result<bool>;
}

/// HTTP implementation of the media sink.
pub struct HttpMediaSink {
    client: Client,
    config: MediaConfig,
}

impl HttpMediaSink {
    pub fn new(config: MediaConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Media(format!("Failed to create media client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn download_image(&self, url: &str, dest: &Path) -> Result<bool> {
        self.stream_to_file(url, dest, None).await?;

        // Validate the artifact; a half-invalid file is never left behind.
        if let Err(e) = image::open(dest) {
            tracing::warn!("Image validation failed for {}: {}", dest.display(), e);
            let _ = tokio::fs::remove_file(dest).await;
            return Ok(false);
        }

        Ok(true)
    }

    async fn download_video(&self, url: &str, dest: &Path) -> Result<bool> {
        // Check the declared size before transferring anything.
        let declared_size = self.probe_size(url).await;

        if let Some(size) = declared_size {
            let size_mb = size / (1024 * 1024);
            if size_mb > self.config.max_video_size_mb {
                tracing::warn!(
                    "Video too large ({}MB > {}MB), skipping: {}",
                    size_mb,
                    self.config.max_video_size_mb,
                    url
                );
                return Ok(false);
            }
        }

        let progress = declared_size.filter(|s| *s > PROGRESS_THRESHOLD).map(|s| {
            let pb = ProgressBar::new(s);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        });

        match self.stream_to_file(url, dest, progress).await {
            Ok(()) => Ok(true),
            Err(e) => {
                // Do not leave a partial video behind.
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    async fn download_document(&self, url: &str, dest: &Path) -> Result<bool> {
        self.stream_to_file(url, dest, None).await?;
        Ok(true)
    }

    /// Declared content length from a HEAD request, if the server offers one.
    async fn probe_size(&self, url: &str) -> Option<u64> {
        let response = self.client.head(url).send().await.ok()?;
        response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }

    async fn stream_to_file(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<ProgressBar>,
    ) -> Result<()> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::MediaUnavailable(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::MediaUnavailable(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(written);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(())
    }
}

#[async_trait]
impl MediaSink for HttpMediaSink {
    async fn download(&self, media: &Media, dest: &Path) -> Result<bool> {
        let enabled = match media.kind {
            MediaKind::Image => self.config.download_images,
            MediaKind::Video => self.config.download_videos,
            MediaKind::Document => self.config.download_documents,
        };

        if !enabled {
            tracing::debug!("Downloads disabled for {} media, skipping", media.kind);
            return Ok(false);
        }

        match media.kind {
            MediaKind::Image => self.download_image(&media.remote_url, dest).await,
            MediaKind::Video => self.download_video(&media.remote_url, dest).await,
            MediaKind::Document => self.download_document(&media.remote_url, dest).await,
        }
    }
}

/// File name for a media reference: `<kind>-<ordinal>.<ext>`.
pub fn media_filename(media: &Media, ordinal: usize) -> Result<String> {
    let ext = extension_for(&media.remote_url, media.kind);
    sanitize_filename(&format!(
        "{}-{}.{}",
        media.kind.file_prefix(),
        ordinal,
        ext
    ))
}

/// Derive a file extension from the URL path, falling back to the kind's
/// default when the URL carries none (or one no known MIME type maps to).
fn extension_for(remote_url: &str, kind: MediaKind) -> String {
    let from_url = Url::parse(remote_url)
        .ok()
        .and_then(|u| {
            u.path()
                .rsplit('/')
                .next()
                .and_then(|f| f.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase())
        })
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && mime_guess::from_ext(ext).first().is_some()
        });

    from_url.unwrap_or_else(|| kind.default_extension().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_for("https://cdn.example.com/a/b/photo.JPG?x=1", MediaKind::Image),
            "jpg"
        );
        assert_eq!(
            extension_for("https://cdn.example.com/clip.mp4", MediaKind::Video),
            "mp4"
        );
    }

    #[test]
    fn test_extension_default_fallback() {
        assert_eq!(
            extension_for("https://cdn.example.com/asset", MediaKind::Image),
            "jpg"
        );
        assert_eq!(
            extension_for("https://cdn.example.com/asset.xyzqq", MediaKind::Video),
            "mp4"
        );
        assert_eq!(extension_for("not a url", MediaKind::Document), "pdf");
    }

    #[test]
    fn test_media_filename() {
        let media = Media::new(MediaKind::Image, "https://cdn.example.com/pic.png");
        assert_eq!(media_filename(&media, 1).unwrap(), "image-1.png");

        let media = Media::new(MediaKind::Document, "https://cdn.example.com/slides");
        assert_eq!(media_filename(&media, 3).unwrap(), "document-3.pdf");
    }
}
