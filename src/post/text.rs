//! Text helpers for post content.

use std::sync::OnceLock;

use regex::Regex;

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").unwrap())
}

/// Extract hashtags from text, deduplicated, without the leading '#'.
///
/// Matching is case-sensitive; "#Rust" and "#rust" are distinct tags.
/// First-seen order is preserved so output is deterministic.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut tags = Vec::new();

    for capture in hashtag_regex().captures_iter(text) {
        let tag = capture[1].to_string();
        if seen.insert(tag.clone()) {
            tags.push(tag);
        }
    }

    tags
}

/// Strip URLs, hashtags, and @mentions from content and collapse whitespace.
///
/// Used to build slug summaries where only the prose words matter.
pub fn strip_markup(content: &str) -> String {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    static SPACE_RE: OnceLock<Regex> = OnceLock::new();

    let url_re = URL_RE.get_or_init(|| Regex::new(r"http\S+").unwrap());
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"#\w+").unwrap());
    let mention_re = MENTION_RE.get_or_init(|| Regex::new(r"@\w+").unwrap());
    let space_re = SPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let cleaned = url_re.replace_all(content, "");
    let cleaned = tag_re.replace_all(&cleaned, "");
    let cleaned = mention_re.replace_all(&cleaned, "");
    space_re.replace_all(&cleaned, " ").trim().to_string()
}
