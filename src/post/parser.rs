//! Normalizer for live-API activity records.
//!
//! The API returns one JSON object per activity. Schemas drift between
//! API versions, so records are walked as loose JSON and any single
//! malformed record is skipped rather than failing the batch.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::post::item::{Media, MediaKind, Post, PostKind};
use crate::post::text::extract_hashtags;

/// Key of the share-content section inside `specificContent`.
const SHARE_CONTENT_KEY: &str = "com.linkedin.ugc.ShareContent";

/// Parse a batch of raw activity records into posts.
///
/// Malformed records are logged and skipped; the rest of the batch is
/// unaffected.
pub fn parse_api_posts(records: &[Value]) -> Vec<Post> {
    let mut posts = Vec::with_capacity(records.len());

    for raw in records {
        match parse_api_post(raw) {
            Ok(post) => posts.push(post),
            Err(e) => {
                let id = raw.get("id").and_then(Value::as_str).unwrap_or("unknown");
                tracing::warn!("Skipping post {}: {}", id, e);
            }
        }
    }

    tracing::info!("Parsed {} of {} raw records", posts.len(), records.len());
    posts
}

/// Parse a single raw activity record into a post.
pub fn parse_api_post(raw: &Value) -> Result<Post> {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MalformedRecord("missing post id".to_string()))?
        .to_string();

    let content = share_content(raw)
        .and_then(|sc| sc.get("shareCommentary"))
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let created_at = parse_created_at(raw, &id);
    let source_url = activity_url(&id);
    let kind = classify(raw);
    let media = extract_media(raw);
    let hashtags = extract_hashtags(&content);

    // Reposts carry a pointer to the reshared post and keep the user's own
    // text as commentary.
    let (repost_source_url, repost_commentary) = if kind == PostKind::Repost {
        let parent_url = raw
            .get("reshareContext")
            .and_then(|ctx| ctx.get("parent"))
            .and_then(Value::as_str)
            .map(activity_url);
        let commentary = if content.is_empty() {
            None
        } else {
            Some(content.clone())
        };
        (parent_url, commentary)
    } else {
        (None, None)
    };

    Ok(Post {
        id,
        source_url,
        content,
        created_at,
        kind,
        media,
        hashtags,
        repost_source_url,
        repost_commentary,
        slug: None,
    })
}

/// Classify a raw record. First match wins.
fn classify(raw: &Value) -> PostKind {
    // A non-empty reshare context always marks a repost, regardless of what
    // else the record carries.
    if raw
        .get("reshareContext")
        .map(|ctx| !ctx.is_null() && ctx.as_object().map_or(true, |o| !o.is_empty()))
        .unwrap_or(false)
    {
        return PostKind::Repost;
    }

    if let Some(sc) = share_content(raw) {
        let category = sc
            .get("shareMediaCategory")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if category == "ARTICLE" {
            return PostKind::Article;
        }

        if sc.get("poll").is_some() {
            return PostKind::Poll;
        }
    }

    PostKind::Original
}

/// Walk the nested media array, yielding one reference per usable entry.
///
/// Prefers the explicit download URL, falling back to the first thumbnail.
/// Entries with neither are skipped silently.
fn extract_media(raw: &Value) -> Vec<Media> {
    let Some(entries) = share_content(raw)
        .and_then(|sc| sc.get("media"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut media = Vec::new();

    for entry in entries {
        if entry.get("media").map_or(true, Value::is_null) {
            continue;
        }

        let url = entry
            .get("originalUrl")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .or_else(|| {
                entry
                    .get("thumbnails")
                    .and_then(Value::as_array)
                    .and_then(|t| t.first())
                    .and_then(|t| t.get("url"))
                    .and_then(Value::as_str)
            });

        if let Some(url) = url {
            media.push(Media::new(MediaKind::Image, url));
        }
    }

    media
}

/// Parse `created.time` (milliseconds since epoch), falling back to now.
fn parse_created_at(raw: &Value, id: &str) -> DateTime<Utc> {
    let millis = raw
        .get("created")
        .and_then(|c| c.get("time"))
        .and_then(|t| {
            t.as_i64()
                .or_else(|| t.as_str().and_then(|s| s.parse::<i64>().ok()))
        });

    let parsed = millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single());

    parsed.unwrap_or_else(|| {
        tracing::warn!("Post {} has no parsable creation time, using now", id);
        Utc::now()
    })
}

/// Rebuild the canonical viewing URL from a post or parent URN.
///
/// URNs look like `urn:li:share:7012345678901234567`; the trailing segment
/// is the activity ID.
fn activity_url(urn: &str) -> String {
    let activity_id = urn.rsplit(':').next().unwrap_or(urn);
    format!(
        "https://www.linkedin.com/feed/update/urn:li:activity:{}/",
        activity_id
    )
}

fn share_content(raw: &Value) -> Option<&Value> {
    raw.get("specificContent").and_then(|c| c.get(SHARE_CONTENT_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn original_record() -> Value {
        json!({
            "id": "urn:li:share:7012345678901234567",
            "created": { "time": 1709294400000i64 },
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": "Launch day! #rust #cli" },
                    "shareMediaCategory": "IMAGE",
                    "media": [
                        {
                            "media": "urn:li:digitalmediaAsset:abc",
                            "originalUrl": "https://cdn.example.com/a.jpg"
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_parse_original_post() {
        let post = parse_api_post(&original_record()).unwrap();
        assert_eq!(post.id, "urn:li:share:7012345678901234567");
        assert_eq!(post.kind, PostKind::Original);
        assert_eq!(post.content, "Launch day! #rust #cli");
        assert_eq!(post.hashtags, vec!["rust", "cli"]);
        assert_eq!(post.media.len(), 1);
        assert_eq!(post.media[0].remote_url, "https://cdn.example.com/a.jpg");
        assert_eq!(
            post.source_url,
            "https://www.linkedin.com/feed/update/urn:li:activity:7012345678901234567/"
        );
        assert_eq!(post.created_at.timestamp_millis(), 1709294400000);
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let raw = json!({ "created": { "time": 0 } });
        assert!(matches!(
            parse_api_post(&raw),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_reshare_context_always_wins() {
        // Article markers present, but the reshare context takes precedence.
        let raw = json!({
            "id": "urn:li:share:111",
            "reshareContext": { "parent": "urn:li:ugcPost:222" },
            "created": { "time": 1709294400000i64 },
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": "worth a read" },
                    "shareMediaCategory": "ARTICLE"
                }
            }
        });

        let post = parse_api_post(&raw).unwrap();
        assert_eq!(post.kind, PostKind::Repost);
        assert_eq!(
            post.repost_source_url.as_deref(),
            Some("https://www.linkedin.com/feed/update/urn:li:activity:222/")
        );
        assert_eq!(post.repost_commentary.as_deref(), Some("worth a read"));
    }

    #[test]
    fn test_empty_reshare_context_is_not_repost() {
        let raw = json!({
            "id": "urn:li:share:111",
            "reshareContext": {},
            "created": { "time": 1709294400000i64 }
        });
        assert_eq!(parse_api_post(&raw).unwrap().kind, PostKind::Original);
    }

    #[test]
    fn test_article_classification() {
        let raw = json!({
            "id": "urn:li:share:333",
            "created": { "time": 1709294400000i64 },
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": "" },
                    "shareMediaCategory": "ARTICLE"
                }
            }
        });
        assert_eq!(parse_api_post(&raw).unwrap().kind, PostKind::Article);
    }

    #[test]
    fn test_poll_classification() {
        let raw = json!({
            "id": "urn:li:share:444",
            "created": { "time": 1709294400000i64 },
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "poll": { "question": "tabs or spaces?" }
                }
            }
        });
        assert_eq!(parse_api_post(&raw).unwrap().kind, PostKind::Poll);
    }

    #[test]
    fn test_media_thumbnail_fallback_and_skip() {
        let raw = json!({
            "id": "urn:li:share:555",
            "created": { "time": 1709294400000i64 },
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "media": [
                        {
                            "media": "urn:li:digitalmediaAsset:a",
                            "thumbnails": [{ "url": "https://cdn.example.com/thumb.jpg" }]
                        },
                        { "media": "urn:li:digitalmediaAsset:b" },
                        { "thumbnails": [{ "url": "https://cdn.example.com/orphan.jpg" }] }
                    ]
                }
            }
        });

        let post = parse_api_post(&raw).unwrap();
        // Entry without any URL and entry without a media asset are skipped.
        assert_eq!(post.media.len(), 1);
        assert_eq!(post.media[0].remote_url, "https://cdn.example.com/thumb.jpg");
    }

    #[test]
    fn test_unparseable_date_falls_back() {
        let raw = json!({ "id": "urn:li:share:666" });
        let before = Utc::now();
        let post = parse_api_post(&raw).unwrap();
        assert!(post.created_at >= before);
    }

    #[test]
    fn test_batch_skips_bad_records() {
        let records = vec![original_record(), json!({ "no_id": true })];
        let posts = parse_api_posts(&records);
        assert_eq!(posts.len(), 1);
    }
}
