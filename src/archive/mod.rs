//! Archival module.
//!
//! This module provides:
//! - The archival writer and its per-post state machine
//! - Media downloading
//! - Markdown rendering and index generation
//! - Run statistics

pub mod markdown;
pub mod media;
pub mod state;
pub mod writer;

pub use markdown::MarkdownRenderer;
pub use media::{media_filename, HttpMediaSink, MediaSink};
pub use state::ArchiveStats;
pub use writer::Archiver;
