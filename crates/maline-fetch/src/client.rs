//! HTTP client for the OKX candle endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use maline_types::Candle;
use reqwest::{Client, Proxy};
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::url::{DEFAULT_BASE_URL, history_candles_url};
use crate::{CandleSource, PageRequest, ParseError, RetryPolicy, parse_candles};

/// Session-wide transport and retry configuration.
///
/// Built once per run and shared read-only by the page fetcher and the retry
/// wrapper.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST endpoint host, without a trailing path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Additional attempts after the first failed one.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Optional HTTP/HTTPS proxy URL.
    pub proxy: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(30),
            proxy: None,
            insecure: false,
            user_agent: format!("maline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Returns the retry policy described by this configuration.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            timeout: self.timeout,
            backoff_delay: self.base_delay,
            max_backoff: self.max_delay,
        }
    }
}

/// Errors from a single page request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection-level failure (refused, reset, DNS, proxy).
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("HTTP error: status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// The server certificate could not be verified.
    #[error("TLS certificate verification failed: {0} (rerun with --insecure to skip verification)")]
    Tls(String),

    /// The exchange rejected the request in its response envelope.
    #[error("API error {code}: {message}")]
    Api {
        /// Exchange error code.
        code: String,
        /// Exchange error message.
        message: String,
    },

    /// The response body did not match the expected schema.
    #[error("malformed response: {0}")]
    Parse(#[from] ParseError),

    /// The HTTP client could not be configured.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Returns true if the request may succeed when re-issued.
    ///
    /// Connection failures, timeouts and 5xx responses are retryable.
    /// Every 4xx, 429 included, is fatal.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status } => *status >= 500,
            Self::Tls(_) | Self::Api { .. } | Self::Parse(_) | Self::Config(_) => false,
        }
    }

    /// Returns a short name for the error kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout(_) => "transient network error",
            Self::Http { status } if *status >= 500 => "transient network error",
            Self::Http { .. } => "client request error",
            Self::Tls(_) => "TLS verification error",
            Self::Api { .. } => "exchange API error",
            Self::Parse(_) => "response parse error",
            Self::Config(_) => "configuration error",
        }
    }

    /// Classifies a transport error from the HTTP client.
    fn from_transport(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_builder() {
            return Self::Config(error.to_string());
        }
        if error.is_timeout() {
            return Self::Timeout(timeout);
        }
        if let Some(status) = error.status() {
            return Self::Http {
                status: status.as_u16(),
            };
        }

        // The TLS backend only surfaces certificate failures deep in the
        // source chain.
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let message = cause.to_string();
            if message.to_lowercase().contains("certificate") {
                return Self::Tls(message);
            }
            detail = message;
            source = cause.source();
        }
        Self::Network(detail)
    }
}

/// Page fetcher backed by the OKX REST API.
#[derive(Debug, Clone)]
pub struct OkxClient {
    client: Client,
    config: ClientConfig,
}

impl OkxClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .tcp_nodelay(true)
            .user_agent(&config.user_agent)
            .gzip(true);

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy).map_err(|e| FetchError::Config(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issues exactly one request and returns the raw body.
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(&e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(&e, self.config.timeout))
    }
}

#[async_trait]
impl CandleSource for OkxClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Candle>, FetchError> {
        let url = history_candles_url(&self.config.base_url, request);
        debug!(%url, "requesting candle page");
        let body = self.get(&url).await?;
        parse_candles(&body, request.bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://www.okx.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(1500));
        assert!(config.proxy.is_none());
        assert!(!config.insecure);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = ClientConfig {
            max_retries: 5,
            timeout: Duration::from_secs(3),
            ..Default::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.timeout, Duration::from_secs(3));
        assert_eq!(policy.backoff_delay, config.base_delay);
    }

    #[tokio::test]
    async fn test_client_creation() {
        assert!(OkxClient::with_defaults().is_ok());

        let insecure = ClientConfig {
            insecure: true,
            proxy: Some("http://127.0.0.1:7890".to_string()),
            ..Default::default()
        };
        assert!(OkxClient::new(insecure).is_ok());
    }

    #[test]
    fn test_invalid_proxy() {
        let config = ClientConfig {
            proxy: Some("::not a url::".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            OkxClient::new(config),
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(FetchError::Http { status: 502 }.is_retryable());
        assert!(!FetchError::Http { status: 429 }.is_retryable());
        assert!(!FetchError::Http { status: 400 }.is_retryable());
        assert!(!FetchError::Http { status: 404 }.is_retryable());
        assert!(!FetchError::Tls("UnknownIssuer".into()).is_retryable());
        assert!(!FetchError::Parse(ParseError::Body("eof".into())).is_retryable());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            FetchError::Http { status: 503 }.kind(),
            "transient network error"
        );
        assert_eq!(FetchError::Http { status: 403 }.kind(), "client request error");
        assert_eq!(FetchError::Http { status: 429 }.kind(), "client request error");
        assert_eq!(FetchError::Tls("x".into()).kind(), "TLS verification error");
    }
}
