//! Slug generation and filename sanitizing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::post::text::strip_markup;

/// Maximum overall slug length, date prefix included.
const MAX_SLUG_LENGTH: usize = 60;

/// How many content words feed the slug summary.
const SLUG_WORDS: usize = 8;

/// Generate a URL- and filesystem-safe slug from post content and date.
///
/// Format: `YYYY-MM-DD-first-words-of-post`. URLs, hashtags, and
/// mentions are stripped before summarizing. Content-free posts get a
/// bare date slug.
pub fn slugify_post(content: &str, date: &DateTime<Utc>) -> String {
    let date_prefix = date.format("%Y-%m-%d").to_string();

    let clean = strip_markup(content);
    let summary = clean
        .split_whitespace()
        .take(SLUG_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    let budget = MAX_SLUG_LENGTH.saturating_sub(date_prefix.len() + 1);
    let slug = slugify(&summary, budget);

    if slug.is_empty() {
        date_prefix
    } else {
        format!("{}-{}", date_prefix, slug)
    }
}

/// Lowercase, replace non-alphanumeric runs with single hyphens, and
/// truncate at a word boundary where possible.
fn slugify(text: &str, max_length: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_hyphen = true;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    let slug = slug.trim_matches('-');

    if slug.len() <= max_length {
        return slug.to_string();
    }

    // Cut at the last hyphen inside the budget to avoid split words.
    let truncated = &slug[..max_length];
    match truncated.rfind('-') {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}

/// Make a slug unique against the slugs already assigned this run.
///
/// Collisions get `-2`, `-3`, ... suffixes. Uniqueness is scoped to the
/// current run's slug set; directory existence on disk is a separate,
/// deliberate idempotency signal handled by the archival writer.
pub fn unique_slug(base_slug: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base_slug) {
        return base_slug.to_string();
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{}-{}", base_slug, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Validate and sanitize a filename by replacing unsafe characters.
///
/// Returns an error for path traversal patterns, path separators, and
/// null bytes rather than trying to repair them.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_slugify_post_basic() {
        let slug = slugify_post("Excited to announce our new release", &date());
        assert_eq!(slug, "2024-03-01-excited-to-announce-our-new-release");
    }

    #[test]
    fn test_slugify_post_strips_markup() {
        let slug = slugify_post("Check https://example.com/x #launch @alice done", &date());
        assert_eq!(slug, "2024-03-01-check-done");
    }

    #[test]
    fn test_slugify_post_word_cap() {
        let slug = slugify_post("one two three four five six seven eight nine ten", &date());
        // Only the first eight words contribute.
        assert!(slug.ends_with("eight"));
        assert!(!slug.contains("nine"));
    }

    #[test]
    fn test_slugify_post_length_cap() {
        let slug = slugify_post(
            "extraordinarily lengthy compound terminology stretching onward relentlessly today",
            &date(),
        );
        assert!(slug.len() <= 60);
        // Truncation lands on a word boundary, not mid-word.
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slugify_post_empty_content() {
        assert_eq!(slugify_post("", &date()), "2024-03-01");
        assert_eq!(slugify_post("#only #tags", &date()), "2024-03-01");
    }

    #[test]
    fn test_unique_slug_numbering() {
        let mut taken = HashSet::new();
        assert_eq!(unique_slug("2024-03-01-hello", &taken), "2024-03-01-hello");

        taken.insert("2024-03-01-hello".to_string());
        assert_eq!(unique_slug("2024-03-01-hello", &taken), "2024-03-01-hello-2");

        taken.insert("2024-03-01-hello-2".to_string());
        assert_eq!(unique_slug("2024-03-01-hello", &taken), "2024-03-01-hello-3");
    }

    #[test]
    fn test_sanitize_filename_valid() {
        assert_eq!(sanitize_filename("image-1.jpg").unwrap(), "image-1.jpg");
        assert_eq!(sanitize_filename("file:name.txt").unwrap(), "file_name.txt");
    }

    #[test]
    fn test_sanitize_filename_rejections() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("path/to/file").is_err());
        assert!(sanitize_filename("file\0name").is_err());
        assert!(sanitize_filename("   ").is_err());
    }
}
