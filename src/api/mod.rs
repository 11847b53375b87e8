//! LinkedIn API module.
//!
//! This module provides:
//! - Rate-limited, retrying HTTP client
//! - Paginated collection walking
//! - Bearer-token resolution and caching
//! - API response types

pub mod auth;
pub mod client;
pub mod collector;
pub mod types;

pub use auth::{resolve_token, CachedToken, TokenCache};
pub use client::{LinkedInApi, MAX_PAGE_SIZE};
pub use collector::{collect_posts, Collection};
pub use types::{PostsPage, Profile};
