//! OAuth client-credentials token handling
//!
//! Tokens are persisted to `<cache_dir>/intraboard/token.json` and reused
//! until `created_at + expires_in`.

use crate::settings::Credentials;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Token as returned by `POST /oauth/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Unix timestamp of issuance
    pub created_at: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Token {
    pub fn expires_at(&self) -> i64 {
        self.created_at.saturating_add(self.expires_in)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at()
    }
}

/// File-backed token storage
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("token.json"))
    }

    /// Stored token, `None` if missing or unreadable
    pub fn load(&self) -> Option<Token> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(token).context("Failed to serialize token")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write token: {}", self.path.display()))
    }

    /// Stored token if still valid at `now`
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<Token> {
        self.load().filter(|token| !token.is_expired(now))
    }
}

/// Request a new application token
pub async fn request_token(
    http: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<Token> {
    let url = format!("{}/oauth/token", base_url.trim_end_matches('/'));
    tracing::info!("Requesting access token from {}", url);

    let response = http
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await
        .context("Failed to reach token endpoint")?;

    let status = response.status();
    if !status.is_success() {
        bail!("Token request rejected: API response {}", status.as_u16());
    }

    response
        .json::<Token>()
        .await
        .context("Failed to parse token response")
}

/// Reuse the stored token or fetch and persist a new one
pub async fn obtain_token(
    store: &TokenStore,
    http: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<Token> {
    if let Some(token) = store.valid_token(Utc::now()) {
        tracing::debug!("Reusing stored token (expires at {})", token.expires_at());
        return Ok(token);
    }

    let token = request_token(http, base_url, credentials).await?;
    store.save(&token)?;
    Ok(token)
}
