//! intraboard-core - Core library for intraboard
//!
//! Provides the rate limiter, the pagination-complete API client, the intra
//! record models and the logtime splitter/aggregator.

pub mod api;
pub mod config;
pub mod error;
pub mod logtime;
pub mod models;
pub mod rate_limit;

pub use api::{ApiClient, PageMeta, ResultSet};
pub use config::{ApiConfig, RateLimitConfig};
pub use error::{EmptyLog, FetchError, MalformedSession};
pub use logtime::{aggregate, split, DayLog, DaySpan, DropReport, WeekTotal};
pub use models::Session;
pub use rate_limit::RateLimiter;
