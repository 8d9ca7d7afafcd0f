//! intra API access: pagination-complete fetching behind a shared rate limiter

mod client;
mod pagination;
pub mod queries;

pub use client::ApiClient;
pub use pagination::{
    PageMeta, ResultSet, PAGE_NUMBER_PARAM, PAGE_SIZE_PARAM, PER_PAGE_HEADER, TOTAL_HEADER,
};
