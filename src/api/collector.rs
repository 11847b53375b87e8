//! Paginated collection of raw post records.

use serde_json::Value;

use crate::api::client::{LinkedInApi, MAX_PAGE_SIZE};
use crate::error::Error;

/// Result of walking the paginated collection.
///
/// A fetch failure mid-walk does not discard the pages already
/// collected; the partial records are returned together with the
/// failure so the caller can archive what it has.
pub struct Collection {
    /// Raw records in source order.
    pub records: Vec<Value>,

    /// The failure that cut the walk short, if any.
    pub failure: Option<Error>,
}

impl Collection {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Walk the posts collection to exhaustion or `limit`.
///
/// Pages are fetched strictly sequentially; the cursor is a linear
/// offset and the remote rate budget assumes serialized access.
/// Terminates when a page comes back empty, a fetch fails, the limit is
/// reached, or the pagination metadata stops advertising a next page.
pub async fn collect_posts(
    api: &LinkedInApi,
    author_urn: &str,
    page_size: u32,
    limit: Option<usize>,
) -> Collection {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut records: Vec<Value> = Vec::new();
    let mut start = 0u64;

    loop {
        let page = match api.get_posts_page(author_urn, start, page_size).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    "Fetch failed at offset {} ({} records already collected): {}",
                    start,
                    records.len(),
                    e
                );
                return Collection {
                    records,
                    failure: Some(e),
                };
            }
        };

        if page.elements.is_empty() {
            break;
        }

        let has_next = page.has_next();
        records.extend(page.elements);

        if let Some(limit) = limit {
            if records.len() >= limit {
                records.truncate(limit);
                break;
            }
        }

        if !has_next {
            break;
        }

        start += u64::from(page_size);
        tracing::info!("Fetched {} posts so far...", records.len());
    }

    tracing::info!("Total posts fetched: {}", records.len());
    Collection {
        records,
        failure: None,
    }
}
