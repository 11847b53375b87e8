//! API response type definitions.
//!
//! Post records themselves are kept as loose JSON (`serde_json::Value`)
//! so that one malformed element can be skipped without failing the whole
//! page; only the stable envelopes get typed structs.

use serde::Deserialize;
use serde_json::Value;

/// Authenticated user profile from the `userinfo` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// OpenID Connect subject; the person URN is derived from this.
    pub sub: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl Profile {
    /// Display name for logs and the run summary.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// One page of the posts collection.
#[derive(Debug, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub elements: Vec<Value>,

    #[serde(default)]
    pub paging: Paging,
}

impl PostsPage {
    /// Whether the pagination metadata advertises a further page.
    pub fn has_next(&self) -> bool {
        self.paging
            .links
            .iter()
            .any(|link| link.rel.as_deref() == Some("next"))
    }
}

/// Pagination metadata.
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub start: Option<u64>,
    pub count: Option<u64>,
    pub total: Option<u64>,

    #[serde(default)]
    pub links: Vec<PagingLink>,
}

/// A pagination link.
#[derive(Debug, Deserialize)]
pub struct PagingLink {
    pub rel: Option<String>,
    pub href: Option<String>,
}
