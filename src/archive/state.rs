//! Run statistics for the archival writer.

/// Aggregated counts for one archival run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Posts handed to the writer.
    pub total: u64,

    /// Posts archived or already present on disk.
    pub succeeded: u64,

    /// Posts that failed in any phase.
    pub failed: u64,

    /// Media files actually downloaded this run.
    pub media_downloaded: u64,
}

impl ArchiveStats {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn add_media(&mut self, count: u64) {
        self.media_downloaded += count;
    }
}
