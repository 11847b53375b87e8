//! LinkedIn Post Archiver
//!
//! This library archives a user's LinkedIn posts to a local,
//! human-readable markdown tree.
//!
//! # Features
//!
//! - Rate-limited, retrying API client with a session call counter
//! - Paginated collection walking with partial-result preservation
//! - Normalization of live-API and data-export record shapes into one
//!   canonical post model
//! - Idempotent archival: re-runs never duplicate output or re-download
//!   existing files
//! - Media downloading with size ceilings and image validation
//!
//! # Example
//!
//! ```no_run
//! use linkedin_archiver::{
//!     api::{collect_posts, LinkedInApi},
//!     archive::{Archiver, HttpMediaSink},
//!     config::Config,
//!     post::parse_api_posts,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let api = LinkedInApi::new("token".to_string(), &config.api)?;
//!
//!     let profile = api.get_profile().await?;
//!     let urn = LinkedInApi::person_urn(&profile)?;
//!
//!     let collection = collect_posts(&api, &urn, config.api.page_size, None).await;
//!     let mut posts = parse_api_posts(&collection.records);
//!
//!     let sink = HttpMediaSink::new(config.media.clone(), config.api.timeout_secs)?;
//!     let mut archiver = Archiver::new(&config, sink);
//!     let stats = archiver.archive_posts(&mut posts).await;
//!
//!     println!("Archived {} posts", stats.succeeded);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fs;
pub mod output;
pub mod post;

// Re-exports for convenience
pub use api::{collect_posts, Collection, LinkedInApi, TokenCache};
pub use archive::{ArchiveStats, Archiver, HttpMediaSink, MarkdownRenderer, MediaSink};
pub use config::Config;
pub use error::{Error, Result};
pub use export::ExportParser;
pub use post::{Media, MediaKind, Post, PostKind};
