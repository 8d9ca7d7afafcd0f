//! Error types for intraboard-core
//!
//! Fetch failures abort a whole query, malformed sessions are dropped per
//! record, and an empty log is reported explicitly instead of as zero time.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of one logical API query
#[derive(Error, Debug)]
pub enum FetchError {
    // ===================
    // HTTP Errors
    // ===================
    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API response {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    // ===================
    // Pagination Errors
    // ===================
    #[error("Missing pagination header {header} in response from {endpoint}")]
    MissingHeader {
        endpoint: String,
        header: &'static str,
    },

    #[error("Invalid pagination header {header}={value:?} in response from {endpoint}")]
    InvalidHeader {
        endpoint: String,
        header: &'static str,
        value: String,
    },

    #[error("Incomplete result for {endpoint}: expected {expected} items, received {received}")]
    Incomplete {
        endpoint: String,
        expected: usize,
        received: usize,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to decode page {page} of {endpoint}")]
    Decode {
        endpoint: String,
        page: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// HTTP status carried by the failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Endpoint the failing query targeted
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::MissingHeader { endpoint, .. }
            | FetchError::InvalidHeader { endpoint, .. }
            | FetchError::Incomplete { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => Some(endpoint),
            FetchError::Client { .. } => None,
        }
    }
}

/// A location record that cannot be turned into a usable session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedSession {
    #[error("Location {id:?} has no begin_at")]
    MissingBegin { id: Option<u64> },

    #[error("Location {id:?} has unparseable {field}: {value:?}")]
    InvalidTimestamp {
        id: Option<u64>,
        field: &'static str,
        value: String,
    },

    #[error("Location {id:?} ends at {end} which is not after its begin {begin}")]
    EndNotAfterBegin {
        id: Option<u64>,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Location {id:?} does not have the location shape: {reason}")]
    InvalidRecord { id: Option<u64>, reason: String },
}

/// Week total requested on a log without any recorded day
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No logtime recorded")]
pub struct EmptyLog;
