//! LinkedIn REST API client with rate limiting and retry handling.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::api::types::{PostsPage, Profile};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// LinkedIn API v2 base URL.
const API_BASE: &str = "https://api.linkedin.com/v2";

/// Maximum records per page the API accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Extra multiplier (seconds) applied to throttling backoff.
const THROTTLE_BASE_WAIT: u64 = 2;

/// Mutable per-session request state. Kept behind one lock so the
/// inter-call delay stays meaningful even if callers overlap; the counter
/// is monotonic and never resets within a process.
#[derive(Debug, Default)]
struct RateState {
    last_call: Option<Instant>,
    request_count: u64,
}

/// Authenticated API client.
pub struct LinkedInApi {
    client: Client,
    token: String,
    base_url: String,
    rate_limit_delay: Duration,
    max_retries: u32,
    state: Mutex<RateState>,
}

impl LinkedInApi {
    /// Create a new API client.
    pub fn new(token: String, config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            base_url: API_BASE.to_string(),
            rate_limit_delay: Duration::from_secs_f64(config.rate_limit_delay_secs),
            max_retries: config.max_retries.max(1),
            state: Mutex::new(RateState::default()),
        })
    }

    /// Point the client at a different base URL (integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Number of API calls made in this session.
    pub async fn request_count(&self) -> u64 {
        self.state.lock().await.request_count
    }

    /// Standard headers for API requests.
    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();

        let auth = format!("Bearer {}", self.token)
            .parse()
            .map_err(|_| Error::Authentication("token contains invalid characters".to_string()))?;

        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert("X-Restli-Protocol-Version", "2.0.0".parse().unwrap());
        headers.insert("LinkedIn-Version", "202401".parse().unwrap());

        Ok(headers)
    }

    /// Suspend until the minimum inter-call spacing has elapsed.
    ///
    /// The spacing is measured from the end of the previous call.
    async fn wait_for_rate_limit(&self) {
        let wait = {
            let state = self.state.lock().await;
            state.last_call.and_then(|last| {
                self.rate_limit_delay.checked_sub(last.elapsed())
            })
        };

        if let Some(wait) = wait {
            sleep(wait).await;
        }
    }

    async fn mark_call_end(&self) {
        self.state.lock().await.last_call = Some(Instant::now());
    }

    /// Make an authenticated request with rate limiting and retries.
    ///
    /// Throttling (429) and transient failures (timeouts, connection
    /// errors, 5xx) are retried with exponential backoff, each against
    /// its own budget of `max_retries` attempts. Exhausting either budget
    /// yields `Error::ExhaustedRetries`, which callers treat as "no data
    /// for this call" rather than a fatal condition.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.build_headers()?;

        let mut throttle_attempts: u32 = 0;
        let mut error_attempts: u32 = 0;

        loop {
            self.wait_for_rate_limit().await;

            let result = self
                .client
                .request(method.clone(), &url)
                .headers(headers.clone())
                .query(params)
                .send()
                .await;

            self.mark_call_end().await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    error_attempts += 1;
                    if error_attempts >= self.max_retries {
                        tracing::error!("Max retries reached for {}: {}", url, e);
                        return Err(Error::ExhaustedRetries {
                            url,
                            attempts: error_attempts,
                        });
                    }
                    let wait = 2u64.pow(error_attempts - 1);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}s...",
                        error_attempts,
                        self.max_retries,
                        e,
                        wait
                    );
                    sleep(Duration::from_secs(wait)).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                throttle_attempts += 1;
                if throttle_attempts >= self.max_retries {
                    return Err(Error::ExhaustedRetries {
                        url,
                        attempts: throttle_attempts,
                    });
                }
                let wait = 2u64.pow(throttle_attempts - 1) * THROTTLE_BASE_WAIT;
                tracing::warn!("Rate limited (429). Waiting {}s before retry...", wait);
                sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Authentication(format!("HTTP {}: {}", status, body)));
            }

            if status.is_server_error() {
                error_attempts += 1;
                if error_attempts >= self.max_retries {
                    tracing::error!("Max retries reached for {}", url);
                    return Err(Error::ExhaustedRetries {
                        url,
                        attempts: error_attempts,
                    });
                }
                let wait = 2u64.pow(error_attempts - 1);
                tracing::warn!("HTTP {} from {}. Retrying in {}s...", status, url, wait);
                sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Api(format!("HTTP {} from {}: {}", status, url, body)));
            }

            {
                let mut state = self.state.lock().await;
                state.request_count += 1;
            }

            let text = response.text().await?;
            if text.is_empty() {
                return Ok(Value::Object(serde_json::Map::new()));
            }
            return Ok(serde_json::from_str(&text)?);
        }
    }

    /// Get the authenticated user's profile.
    pub async fn get_profile(&self) -> Result<Profile> {
        tracing::info!("Fetching user profile...");

        let value = self.request(Method::GET, "/userinfo", &[]).await?;
        let profile: Profile = serde_json::from_value(value)?;

        tracing::info!("Retrieved profile for: {}", profile.display_name());
        Ok(profile)
    }

    /// Derive the person URN from a profile.
    pub fn person_urn(profile: &Profile) -> Result<String> {
        profile
            .sub
            .as_deref()
            .filter(|sub| !sub.is_empty())
            .map(|sub| format!("urn:li:person:{}", sub))
            .ok_or_else(|| Error::Api("could not derive person URN from profile".to_string()))
    }

    /// Fetch one page of the user's posts.
    pub async fn get_posts_page(
        &self,
        author_urn: &str,
        start: u64,
        count: u32,
    ) -> Result<PostsPage> {
        let params = [
            ("q", "authors".to_string()),
            ("authors", format!("List({})", author_urn)),
            ("start", start.to_string()),
            ("count", count.min(MAX_PAGE_SIZE).to_string()),
        ];

        tracing::info!("Fetching posts (start={}, count={})...", start, count);
        let value = self.request(Method::GET, "/ugcPosts", &params).await?;
        let page: PostsPage = serde_json::from_value(value)?;

        if !page.elements.is_empty() {
            tracing::info!("Retrieved {} posts", page.elements.len());
        }

        Ok(page)
    }
}
