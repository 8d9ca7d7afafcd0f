//! API client configuration
//!
//! Explicit context handed to [`crate::ApiClient`] and [`crate::RateLimiter`];
//! nothing in the core reads process-wide state.

use std::time::Duration;

/// Production intra API
pub const DEFAULT_BASE_URL: &str = "https://api.intra.42.fr";

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum calls admitted within one period
    pub max_calls: usize,
    /// Length of the trailing window
    pub period: Duration,
}

impl Default for RateLimitConfig {
    /// The intra API allows 2 requests per second per application
    fn default() -> Self {
        Self {
            max_calls: 2,
            period: Duration::from_secs(1),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self { max_calls, period }
    }
}

/// Configuration for [`crate::ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, endpoints are appended verbatim
    pub base_url: String,

    /// Value sent as `page[size]` on every request
    pub page_size: usize,

    /// Outbound call budget
    pub rate_limit: RateLimitConfig,

    /// Bearer token, obtained by the caller
    pub access_token: Option<String>,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit: RateLimitConfig::default(),
            access_token: None,
            user_agent: concat!("intraboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Page size is clamped to at least one record
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Full URL for an endpoint path such as `/v2/users/jdoe/locations`
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
