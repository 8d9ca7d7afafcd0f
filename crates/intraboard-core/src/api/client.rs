//! Rate-limited, pagination-complete HTTP client
//!
//! Every request goes through the shared [`RateLimiter`]. A query either
//! returns every item the server declared or fails; there is no retry here.

use super::pagination::{PageMeta, PageResponse, ResultSet, PAGE_NUMBER_PARAM, PAGE_SIZE_PARAM};
use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::rate_limit::RateLimiter;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the intra API
///
/// Cheap to share behind `Arc`; independent queries may run concurrently and
/// still respect one call budget through the injected limiter.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    limiter: Arc<RateLimiter>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, limiter: Arc<RateLimiter>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| FetchError::Client { source })?;

        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    /// Build a client with its own limiter sized from `config.rate_limit`
    pub fn with_own_limiter(config: ApiConfig) -> Result<Self, FetchError> {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self::new(config, limiter)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetch every page of `endpoint`
    ///
    /// Page 1 carries the `X-Total` / `X-Per-Page` headers that decide how
    /// many further pages are requested. An empty page ends the walk early;
    /// if that leaves fewer items than declared the query fails with
    /// [`FetchError::Incomplete`].
    pub async fn fetch_all<T>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<ResultSet<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let first = self.fetch_page::<T>(endpoint, params, 1).await?;
        let meta = PageMeta::from_headers(endpoint, &first.headers)?;
        let pages = meta.page_count();

        let mut items = first.items;
        let mut requests = 1;

        for page in 2..=pages {
            let next = self.fetch_page::<T>(endpoint, params, page).await?;
            requests += 1;

            if next.items.is_empty() {
                warn!(
                    endpoint,
                    page,
                    pages,
                    "Empty page before declared end, stopping"
                );
                break;
            }
            items.extend(next.items);
        }

        if items.len() < meta.total {
            return Err(FetchError::Incomplete {
                endpoint: endpoint.to_string(),
                expected: meta.total,
                received: items.len(),
            });
        }

        info!(
            endpoint,
            items = items.len(),
            requests,
            "Fetched paginated collection"
        );

        Ok(ResultSet {
            items,
            total: meta.total,
            requests,
        })
    }

    async fn fetch_page<T>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        page: usize,
    ) -> Result<PageResponse<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let query = self.page_query(params, page);
        let url = self.config.url(endpoint);

        let mut request = self.http.get(&url).query(&query);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        self.limiter.acquire().await;
        debug!(endpoint, page, "GET {}", url);

        let transport = |source| FetchError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?;
        let items: Vec<T> = serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            endpoint: endpoint.to_string(),
            page,
            source,
        })?;

        Ok(PageResponse { items, headers })
    }

    /// Caller filters plus the fixed page size and the page number
    fn page_query(&self, params: &[(&str, &str)], page: usize) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| *key != PAGE_SIZE_PARAM && *key != PAGE_NUMBER_PARAM)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        query.push((PAGE_SIZE_PARAM.to_string(), self.config.page_size.to_string()));
        query.push((PAGE_NUMBER_PARAM.to_string(), page.to_string()));
        query
    }
}
