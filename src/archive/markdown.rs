//! Markdown rendering for posts and the archive index.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Datelike;

use crate::error::Result;
use crate::fs::paths::{index_path, DOCUMENT_FILE};
use crate::post::item::{Media, MediaKind, Post};

/// Content preview length for index entries.
const PREVIEW_CHARS: usize = 100;

/// Renders posts into markdown documents.
///
/// Output depends only on the post itself, so rendering the same post
/// twice yields the same bytes.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Generate the complete markdown document for a post.
    pub fn render(&self, post: &Post) -> String {
        let mut sections = Vec::new();

        sections.push(self.render_frontmatter(post));

        let date_heading = post.created_at.format("%B %d, %Y").to_string();
        sections.push(format!("# {}\n", date_heading));

        if post.is_repost() {
            sections.push(self.render_repost(post));
        } else {
            sections.push(render_content(&post.content));
        }

        if !post.hashtags.is_empty() {
            let tags = post
                .hashtags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ");
            sections.push(format!("\n**Hashtags:** {}\n", tags));
        }

        if post.has_media() {
            sections.push(self.render_media(&post.media));
        }

        sections.push(format!(
            "\n---\n\n[View original post]({})",
            post.source_url
        ));

        sections.join("\n")
    }

    fn render_frontmatter(&self, post: &Post) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("date: {}", post.created_at.format("%Y-%m-%d")),
            format!("source_url: {}", post.source_url),
            format!("kind: {}", post.kind),
        ];

        if !post.hashtags.is_empty() {
            lines.push(format!("tags: [{}]", post.hashtags.join(", ")));
        }

        lines.push("---\n".to_string());
        lines.join("\n")
    }

    fn render_repost(&self, post: &Post) -> String {
        let mut sections = vec!["## Repost\n".to_string()];

        if let Some(url) = &post.repost_source_url {
            sections.push(format!("**Original post:** {}\n", url));
        }

        if let Some(commentary) = &post.repost_commentary {
            sections.push("**Commentary:**\n".to_string());
            sections.push(render_content(commentary));
        }

        sections.join("\n")
    }

    fn render_media(&self, media: &[Media]) -> String {
        let mut sections = vec!["\n---\n".to_string(), "## Media\n".to_string()];

        for item in media {
            match (&item.local_path, &item.filename) {
                (Some(path), Some(name)) => {
                    let path = path.display();
                    let line = match item.kind {
                        MediaKind::Image => format!("![{}]({})\n", name, path),
                        MediaKind::Video | MediaKind::Document => {
                            format!("[{}]({})\n", name, path)
                        }
                    };
                    sections.push(line);
                }
                // Unresolved reference: the asset was skipped or failed.
                _ => sections.push("_Media not available locally_\n".to_string()),
            }
        }

        sections.join("\n")
    }

    /// Render and save the document for a post.
    pub fn save(&self, post: &Post, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(post))?;
        tracing::info!("Saved markdown: {}", path.display());
        Ok(())
    }

    /// Generate the archive index: all posts grouped by year, most
    /// recent first.
    pub fn render_index(&self, posts: &[Post], date_format: &str) -> String {
        let mut sections = vec![
            "# Post Archive\n".to_string(),
            format!("**Total posts:** {}\n", posts.len()),
            "---\n".to_string(),
            "## Posts by Year\n".to_string(),
        ];

        // BTreeMap keeps years sorted; iterate in reverse for newest first.
        let mut by_year: BTreeMap<i32, Vec<&Post>> = BTreeMap::new();
        for post in posts {
            by_year.entry(post.created_at.year()).or_default().push(post);
        }

        for (year, mut year_posts) in by_year.into_iter().rev() {
            year_posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            sections.push(format!("### {}\n", year));

            for post in year_posts {
                let date_str = post.created_at.format("%B %d");
                let preview = content_preview(&post.content);

                let entry = match &post.slug {
                    Some(slug) => {
                        let bucket = post.created_at.format(date_format);
                        format!(
                            "- **{}**: [{}]({}/{}/{})",
                            date_str, preview, bucket, slug, DOCUMENT_FILE
                        )
                    }
                    None => format!("- **{}**: {}", date_str, preview),
                };
                sections.push(entry);
            }

            sections.push(String::new());
        }

        sections.join("\n")
    }

    /// Rewrite the index wholesale from the complete post set.
    pub fn write_index(&self, posts: &[Post], base_dir: &Path, date_format: &str) -> Result<()> {
        let path = index_path(base_dir);
        fs::write(&path, self.render_index(posts, date_format))?;
        tracing::info!("Generated index: {}", path.display());
        Ok(())
    }
}

fn render_content(text: &str) -> String {
    if text.is_empty() {
        return "_[No text content]_\n".to_string();
    }

    format!("{}\n", text.trim().replace("\n\n\n", "\n\n"))
}

fn content_preview(content: &str) -> String {
    if content.is_empty() {
        return "[No content]".to_string();
    }

    let preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::item::PostKind;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn make_post() -> Post {
        Post {
            id: "urn:li:share:1".to_string(),
            source_url: "https://example.com/p/1".to_string(),
            content: "Hello #world".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            kind: PostKind::Original,
            media: Vec::new(),
            hashtags: vec!["world".to_string()],
            repost_source_url: None,
            repost_commentary: None,
            slug: Some("2024-03-01-hello".to_string()),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = MarkdownRenderer::new();
        let post = make_post();
        assert_eq!(renderer.render(&post), renderer.render(&post));
    }

    #[test]
    fn test_render_frontmatter_and_footer() {
        let out = MarkdownRenderer::new().render(&make_post());
        assert!(out.starts_with("---\ndate: 2024-03-01\n"));
        assert!(out.contains("kind: original"));
        assert!(out.contains("tags: [world]"));
        assert!(out.contains("# March 01, 2024"));
        assert!(out.contains("[View original post](https://example.com/p/1)"));
    }

    #[test]
    fn test_render_repost_section() {
        let mut post = make_post();
        post.kind = PostKind::Repost;
        post.repost_source_url = Some("https://example.com/p/0".to_string());
        post.repost_commentary = Some("My take".to_string());

        let out = MarkdownRenderer::new().render(&post);
        assert!(out.contains("## Repost"));
        assert!(out.contains("**Original post:** https://example.com/p/0"));
        assert!(out.contains("My take"));
    }

    #[test]
    fn test_render_unresolved_media_marker() {
        let mut post = make_post();
        post.media = vec![
            Media {
                kind: MediaKind::Image,
                remote_url: "https://cdn.example.com/a.jpg".to_string(),
                local_path: Some(PathBuf::from("media/image-1.jpg")),
                filename: Some("image-1.jpg".to_string()),
            },
            Media::new(MediaKind::Video, "https://cdn.example.com/b.mp4"),
        ];

        let out = MarkdownRenderer::new().render(&post);
        assert!(out.contains("![image-1.jpg](media/image-1.jpg)"));
        assert!(out.contains("_Media not available locally_"));
    }

    #[test]
    fn test_render_empty_content_marker() {
        let mut post = make_post();
        post.content = String::new();
        post.hashtags = Vec::new();

        let out = MarkdownRenderer::new().render(&post);
        assert!(out.contains("_[No text content]_"));
    }

    #[test]
    fn test_index_groups_by_year_newest_first() {
        let mut older = make_post();
        older.created_at = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        older.slug = Some("2023-06-01-older".to_string());
        older.content = "Older post".to_string();

        let index = MarkdownRenderer::new().render_index(&[older, make_post()], "%Y/%m");

        let pos_2024 = index.find("### 2024").unwrap();
        let pos_2023 = index.find("### 2023").unwrap();
        assert!(pos_2024 < pos_2023);
        assert!(index.contains("(2024/03/2024-03-01-hello/post.md)"));
        assert!(index.contains("(2023/06/2023-06-01-older/post.md)"));
        assert!(index.contains("**Total posts:** 2"));
    }

    #[test]
    fn test_index_preview_truncation() {
        let mut post = make_post();
        post.content = "x".repeat(150);

        let index = MarkdownRenderer::new().render_index(&[post], "%Y/%m");
        assert!(index.contains(&format!("{}...", "x".repeat(100))));
    }
}
