//! Bearer-token resolution and the on-disk token cache.
//!
//! The interactive OAuth exchange lives outside this tool; what this
//! module manages is where an already-obtained token comes from: an
//! explicit CLI/env value, the config file, or the cache written by a
//! previous `--auth` run.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A cached OAuth access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,

    /// Expiry time, when the issuer reported one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// On-disk token cache.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache location under the platform cache directory.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "linkedin-archiver").ok_or_else(|| {
            Error::Config("could not determine a cache directory for the token".to_string())
        })?;
        Ok(Self::new(dirs.cache_dir().join("token.json")))
    }

    /// Load the cached token, if a readable one exists.
    pub fn load(&self) -> Option<CachedToken> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Persist a token for later runs.
    pub fn store(&self, token: &CachedToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(token)?)?;
        tracing::info!("Token cached at {}", self.path.display());
        Ok(())
    }

    /// Remove any cached token.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!("Cleared cached token");
        }
        Ok(())
    }
}

/// Resolve the bearer token to use for this session.
///
/// Priority: explicit value (CLI flag or environment), then the cache.
/// A missing token is fatal to the run.
pub fn resolve_token(explicit: Option<&str>, cache: &TokenCache) -> Result<String> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }

    if let Some(cached) = cache.load() {
        if cached.is_expired() {
            tracing::warn!("Cached token is expired; re-run with --auth to refresh it");
        } else {
            return Ok(cached.access_token);
        }
    }

    Err(Error::MissingConfig(
        "access token (pass --token, set LINKEDIN_TOKEN, or store one with --auth --token <TOKEN>)"
            .to_string(),
    ))
}
