//! HTTP transport with bounded retry and per-source rate limiting
//!
//! **Retry policy:**
//! - Transport errors, 429 and 5xx are retried up to `max_attempts`
//! - Backoff is linear: `backoff * attempt`
//! - Other non-2xx statuses fail immediately
//! - A challenge page fails immediately as `blocked` (see [`super::challenge`])

use super::challenge::looks_like_challenge;
use super::{SourceFailure, SourceResult};
use polsnap_common::{Error, Result};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

/// Identifying User-Agent for JSON APIs
pub const API_USER_AGENT: &str = "polsnap/0.1.0 (political snapshot builder)";

/// Browser-like User-Agent for HTML pages
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Transport settings for one source
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Base backoff; attempt `n` waits `backoff * n`
    pub backoff: Duration,
    pub requests_per_second: u32,
    pub user_agent: String,
    /// Optional proxy URL for every request of this source
    pub proxy: Option<String>,
}

impl FetchPolicy {
    /// Defaults for JSON APIs
    pub fn api(requests_per_second: u32) -> Self {
        Self {
            timeout: Duration::from_secs(25),
            max_attempts: 3,
            backoff: Duration::from_millis(1500),
            requests_per_second,
            user_agent: API_USER_AGENT.to_string(),
            proxy: None,
        }
    }

    /// Defaults for scraped HTML pages
    pub fn browser(requests_per_second: u32) -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            ..Self::api(requests_per_second)
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// Retrying HTTP fetcher shared by all adapters
pub struct HttpFetcher {
    name: String,
    client: Client,
    policy: FetchPolicy,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl HttpFetcher {
    /// Build a fetcher; fails only if the HTTP client cannot be constructed
    pub fn new(name: impl Into<String>, policy: FetchPolicy) -> Result<Self> {
        let name = name.into();

        let mut builder = Client::builder()
            .user_agent(policy.user_agent.clone())
            .timeout(policy.timeout);

        if let Some(proxy_url) = &policy.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::Config(format!("Invalid proxy for {}: {}", name, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client for {}: {}", name, e)))?;

        let per_second = NonZeroU32::new(policy.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = governor::RateLimiter::direct(governor::Quota::per_second(per_second));

        Ok(Self {
            name,
            client,
            policy,
            rate_limiter,
        })
    }

    /// Source name used in logs and failure markers
    pub fn name(&self) -> &str {
        &self.name
    }

    /// GET a text body
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: Option<&str>,
    ) -> SourceResult<String> {
        self.send_with_retry(url, || {
            let request = self.client.get(url).query(query);
            match accept {
                Some(accept) => request.header(header::ACCEPT, accept),
                None => request,
            }
        })
        .await
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: Option<&str>,
    ) -> SourceResult<T> {
        let body = self.get_text(url, query, accept).await?;
        self.decode(&body)
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &B,
    ) -> SourceResult<T> {
        let body = self
            .send_with_retry(url, || self.client.post(url).json(payload))
            .await?;
        self.decode(&body)
    }

    fn decode<T: DeserializeOwned>(&self, body: &str) -> SourceResult<T> {
        if body.trim().is_empty() {
            return Err(SourceFailure::parse(&self.name, "empty response body"));
        }
        serde_json::from_str(body)
            .map_err(|e| SourceFailure::parse(&self.name, format!("invalid JSON: {}", e)))
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> SourceResult<String>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            self.rate_limiter.until_ready().await;
            debug!(source = %self.name, url = %url, attempt, "Sending request");

            let failure = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    match response.text().await {
                        Ok(body) => {
                            if looks_like_challenge(&body, is_refusal(status)) {
                                warn!(source = %self.name, url = %url, status = status.as_u16(), "Challenge page received");
                                return Err(SourceFailure::blocked(&self.name));
                            }
                            if status.is_success() {
                                return Ok(body);
                            }
                            let failure = SourceFailure::http(&self.name, status.as_u16());
                            if !is_retryable(status) {
                                return Err(failure);
                            }
                            failure
                        }
                        Err(e) => SourceFailure::transport(&self.name, format!("body read failed: {}", e)),
                    }
                }
                Err(e) => SourceFailure::transport(&self.name, e.to_string()),
            };

            if attempt < max_attempts {
                let wait = self.policy.backoff * attempt;
                warn!(
                    source = %self.name,
                    url = %url,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    failure = %failure,
                    "Request failed, backing off"
                );
                tokio::time::sleep(wait).await;
            }
            last_failure = Some(failure);
        }

        Err(last_failure
            .unwrap_or_else(|| SourceFailure::transport(&self.name, "no attempt was made")))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_refusal(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}
