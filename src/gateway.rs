//! Gateways to the recipes API.
//!
//! The engine talks to the outside world exclusively through the
//! [`RecipeGateway`] trait; [`HttpGateway`] is the production implementation
//! over the REST endpoints. Tests inject scripted implementations instead.

use crate::config::Config;
use crate::error::GatewayError;
use crate::types::{FeedPage, FetchMode, PageParams, RecipeRecord};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Maximum response body size accepted from the API (1 MB).
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Retries for transient failures on idempotent page fetches.
const MAX_FETCH_RETRIES: u32 = 2;

// ============================================================================
// Gateway Trait
// ============================================================================

/// Request/response seam to the recipes backend.
///
/// Fetches are read-only and idempotent; `like_recipe` toggles the caller's
/// like and returns the full updated record; `delete_recipe` succeeds with
/// `Ok(())` or surfaces the server's structured error string.
#[async_trait]
pub trait RecipeGateway: Send + Sync {
    async fn fetch_page(&self, params: &PageParams) -> Result<FeedPage, GatewayError>;
    async fn like_recipe(&self, id: &str) -> Result<RecipeRecord, GatewayError>;
    async fn delete_recipe(&self, id: &str) -> Result<(), GatewayError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP gateway over the recipes REST API.
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
    session_token: Option<SecretString>,
    timeout: Duration,
}

impl HttpGateway {
    /// Build a gateway from configuration.
    ///
    /// The base URL must be HTTPS; HTTP is allowed only for localhost so
    /// local dev servers and test mocks keep working. The session token is
    /// taken from the GRAZE_SESSION_TOKEN env var when set, otherwise from
    /// the config file.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let base = Url::parse(&config.api_base_url)
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;

        if base.scheme() != "https" {
            let is_localhost = matches!(base.host_str(), Some("localhost") | Some("127.0.0.1"));
            if !is_localhost {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL");
                return Err(GatewayError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
        }

        let session_token = std::env::var("GRAZE_SESSION_TOKEN")
            .ok()
            .or_else(|| config.session_token.clone())
            .map(SecretString::from);

        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));

        let client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            session_token,
            timeout,
        })
    }

    /// Build the request URL for a page fetch.
    fn page_url(&self, params: &PageParams) -> Result<Url, GatewayError> {
        let path = match params.mode {
            FetchMode::Listing => "api/get-recipes",
            FetchMode::Search => "api/search-recipes",
        };
        let mut url = self
            .base
            .join(path)
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &params.page.to_string());
            query.append_pair("limit", &params.limit.to_string());
            match params.mode {
                FetchMode::Listing => {
                    query.append_pair("sortOption", params.sort.as_str());
                }
                FetchMode::Search => {
                    query.append_pair("query", &params.query);
                    if let Some(tag) = &params.tag {
                        query.append_pair("tag", tag);
                    }
                }
            }
        }

        Ok(url)
    }

    /// Attach the session cookie. The token is only ever sent to the
    /// configured base host — request URLs are always derived from it.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request.header(
                reqwest::header::COOKIE,
                format!("token={}", token.expose_secret()),
            ),
            None => request,
        }
    }

    async fn send_and_read(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(GatewayError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, MAX_RESPONSE_SIZE).await
    }

    async fn fetch_page_once(&self, params: &PageParams) -> Result<FeedPage, GatewayError> {
        let url = self.page_url(params)?;
        let request = self.authorize(self.client.get(url));
        let bytes = self.send_and_read(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecipeGateway for HttpGateway {
    /// Fetch one page, retrying transient failures with a short backoff.
    ///
    /// Page fetches are read-only, so retrying cannot double-apply anything.
    async fn fetch_page(&self, params: &PageParams) -> Result<FeedPage, GatewayError> {
        let mut retry_count = 0;
        loop {
            match self.fetch_page_once(params).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && retry_count < MAX_FETCH_RETRIES => {
                    let delay = 1u64 << retry_count; // 1s, 2s
                    tracing::debug!(
                        error = %e,
                        retry = retry_count + 1,
                        delay_secs = delay,
                        "Retrying page fetch after transient error"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Toggle the caller's like on a recipe.
    ///
    /// Like is a toggle, not idempotent — never retried.
    async fn like_recipe(&self, id: &str) -> Result<RecipeRecord, GatewayError> {
        let url = self
            .base
            .join("api/like-recipe")
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;
        let request = self
            .authorize(self.client.put(url))
            .json(&serde_json::json!({ "recipeId": id }));

        let bytes = self.send_and_read(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), GatewayError> {
        let url = self
            .base
            .join("api/delete-recipe")
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;
        let request = self
            .authorize(self.client.delete(url))
            .json(&serde_json::json!({ "recipeId": id }));

        let bytes = self.send_and_read(request).await?;
        let body: DeleteResponse =
            serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse(e.to_string()))?;

        match body {
            DeleteResponse {
                error: Some(error), ..
            } => Err(GatewayError::Server(error)),
            DeleteResponse {
                message: Some(message),
                ..
            } => {
                tracing::debug!(recipe_id = id, message = %message, "Recipe deleted");
                Ok(())
            }
            _ => Err(GatewayError::Parse(
                "delete response had neither message nor error".to_string(),
            )),
        }
    }
}

/// Delete responses carry either a confirmation message or an error string.
#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, GatewayError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(GatewayError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(GatewayError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(GatewayError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
