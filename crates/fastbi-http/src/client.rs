//! HTTP client implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Method, Response,
};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Header carrying the console credential
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Base URL every API path is resolved against
    fn base_url(&self) -> &str;

    /// Execute a GET request
    async fn get(&self, url: &str) -> Result<Response>;

    /// Execute a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response>;

    /// Execute a custom HTTP request
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(default_headers(&config)?)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        // Configure proxy if provided
        if let Some(proxy_url) = &config.proxy {
            check_proxy_url(proxy_url)?;
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        // Configure connection pooling
        if config.pool_enabled {
            builder = builder.pool_idle_timeout(config.pool_idle_timeout);
        } else {
            builder = builder.pool_max_idle_per_host(0);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

/// Proxies must be absolute URLs with a scheme reqwest can tunnel through
fn check_proxy_url(proxy_url: &str) -> Result<()> {
    let parsed = url::Url::parse(proxy_url)
        .map_err(|e| HttpError::InvalidProxy(format!("{}: {}", proxy_url, e)))?;

    match parsed.scheme() {
        "http" | "https" | "socks5" | "socks5h" if parsed.host_str().is_some() => Ok(()),
        scheme => Err(HttpError::InvalidProxy(format!(
            "unsupported proxy '{}' (scheme '{}')",
            proxy_url, scheme
        ))),
    }
}

fn default_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = &config.api_key {
        let mut value =
            HeaderValue::from_str(key).map_err(|e| HttpError::InvalidApiKey(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
    }

    Ok(headers)
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!("HTTP GET: {}", url);
        self.request(Method::GET, url, None).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        debug!("HTTP POST: {}", url);
        self.request(Method::POST, url, Some(body)).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let url = url
            .parse::<url::Url>()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let mut request = self.inner.request(method, url);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(HttpError::RequestFailed)?;

        // Check for HTTP error status
        if !response.status().is_success() {
            return Err(HttpError::HttpStatus {
                status: response.status(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            });
        }

        Ok(response)
    }
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
