//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// LinkedIn post archiver CLI.
#[derive(Parser, Debug)]
#[command(
    name = "linkedin-archiver",
    version,
    about = "Archive your LinkedIn posts to a local markdown tree",
    long_about = "A CLI tool to archive your LinkedIn posts locally.\n\n\
                  Posts come from the LinkedIn API (requires an access token) or from a\n\
                  LinkedIn data export bundle (no API needed)."
)]
pub struct Args {
    /// Import from a data export bundle (ZIP file or extracted directory).
    #[arg(long = "import-export", value_name = "PATH")]
    pub import_export: Option<PathBuf>,

    /// Store the supplied token in the cache and exit.
    #[arg(long)]
    pub auth: bool,

    /// Fetch and archive all posts via the API.
    #[arg(long)]
    pub fetch: bool,

    /// Fetch only the most recent N posts.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Clear the cached token before authenticating.
    #[arg(long)]
    pub reauth: bool,

    /// OAuth access token.
    #[arg(short, long, env = "LINKEDIN_TOKEN")]
    pub token: Option<String>,

    /// Base directory for the archive.
    #[arg(short = 'd', long = "directory")]
    pub archive_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Don't download images.
    #[arg(long)]
    pub no_images: bool,

    /// Don't download videos.
    #[arg(long)]
    pub no_videos: bool,

    /// Don't download documents.
    #[arg(long)]
    pub no_documents: bool,

    /// Suppress the banner and configuration summary.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where
    /// specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.archive_directory {
            config.output.base_dir = dir.clone();
        }

        if self.no_images {
            config.media.download_images = false;
        }

        if self.no_videos {
            config.media.download_videos = false;
        }

        if self.no_documents {
            config.media.download_documents = false;
        }
    }

    /// Whether any action was requested.
    pub fn has_action(&self) -> bool {
        self.import_export.is_some() || self.auth || self.fetch || self.limit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let args = Args::parse_from([
            "linkedin-archiver",
            "--fetch",
            "--quiet",
            "--directory",
            "/data/posts",
            "--no-videos",
        ]);

        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.output.base_dir, PathBuf::from("/data/posts"));
        assert!(!config.media.download_videos);
        assert!(config.media.download_images);
        assert!(args.quiet);
        assert!(args.has_action());
    }

    #[test]
    fn test_no_action() {
        let args = Args::parse_from(["linkedin-archiver"]);
        assert!(!args.has_action());
    }

    #[test]
    fn test_limit_implies_action() {
        let args = Args::parse_from(["linkedin-archiver", "--limit", "50"]);
        assert!(args.has_action());
        assert_eq!(args.limit, Some(50));
    }
}
