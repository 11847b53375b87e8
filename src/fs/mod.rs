//! Filesystem module.
//!
//! Provides:
//! - Archive directory layout
//! - Slug generation and filename sanitizing

pub mod naming;
pub mod paths;

pub use naming::{sanitize_filename, slugify_post, unique_slug};
pub use paths::{document_path, ensure_dir, index_path, media_dir, post_dir};
