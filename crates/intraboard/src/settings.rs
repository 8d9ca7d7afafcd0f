//! User settings for intraboard
//!
//! Stored in `<config_dir>/intraboard/config.json`. Every field may be
//! overridden from the command line or `INTRABOARD_*` environment variables.

use anyhow::{Context, Result};
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Amsterdam campus
pub const DEFAULT_CAMPUS_ID: u32 = 14;

/// Display color of a coalition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoalitionColor {
    Red,
    Magenta,
    Blue,
    Green,
    Cyan,
    Yellow,
    White,
}

impl CoalitionColor {
    pub fn to_table_color(self) -> Color {
        match self {
            CoalitionColor::Red => Color::Red,
            CoalitionColor::Magenta => Color::Magenta,
            CoalitionColor::Blue => Color::Blue,
            CoalitionColor::Green => Color::Green,
            CoalitionColor::Cyan => Color::Cyan,
            CoalitionColor::Yellow => Color::Yellow,
            CoalitionColor::White => Color::White,
        }
    }
}

/// One coalition as configured by the user
///
/// A coalition may be listed under several API slugs (e.g. one per cursus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalitionSpec {
    pub name: String,
    pub slugs: Vec<String>,
    pub color: CoalitionColor,
}

impl CoalitionSpec {
    fn new(name: &str, slugs: &[&str], color: CoalitionColor) -> Self {
        Self {
            name: name.to_string(),
            slugs: slugs.iter().map(|s| s.to_string()).collect(),
            color,
        }
    }
}

/// Persisted settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub campus_id: u32,
    pub api_url: Option<String>,
    pub coalitions: Vec<CoalitionSpec>,
    /// Color of users outside every configured coalition
    pub fallback_color: CoalitionColor,
    /// Lifetime of cached project lists and coalition members
    pub cache_ttl_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            campus_id: DEFAULT_CAMPUS_ID,
            api_url: None,
            coalitions: vec![
                CoalitionSpec::new(
                    "Vela",
                    &["42cursus-amsterdam-vela", "vela"],
                    CoalitionColor::Red,
                ),
                CoalitionSpec::new(
                    "Pyxis",
                    &["42cursus-amsterdam-pyxis", "pyxis"],
                    CoalitionColor::Magenta,
                ),
                CoalitionSpec::new(
                    "Cetus",
                    &["42cursus-amsterdam-cetus", "cetus"],
                    CoalitionColor::Blue,
                ),
            ],
            fallback_color: CoalitionColor::Yellow,
            cache_ttl_days: crate::cache::CACHE_TTL_DAYS,
        }
    }
}

/// OAuth application credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Settings {
    /// Default location: `<config_dir>/intraboard/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("intraboard").join("config.json"))
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Apply command-line / environment overrides
    pub fn with_overrides(
        mut self,
        client_id: Option<String>,
        client_secret: Option<String>,
        campus_id: Option<u32>,
        api_url: Option<String>,
    ) -> Self {
        if client_id.is_some() {
            self.client_id = client_id;
        }
        if client_secret.is_some() {
            self.client_secret = client_secret;
        }
        if let Some(campus_id) = campus_id {
            self.campus_id = campus_id;
        }
        if api_url.is_some() {
            self.api_url = api_url;
        }
        self
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let client_id = self
            .client_id
            .clone()
            .context("Missing client_id (set it in config.json or INTRABOARD_CLIENT_ID)")?;
        let client_secret = self
            .client_secret
            .clone()
            .context("Missing client_secret (set it in config.json or INTRABOARD_CLIENT_SECRET)")?;

        Ok(Credentials {
            client_id,
            client_secret,
        })
    }

    /// Cache lifetime; out-of-range or non-positive values fall back to the default
    pub fn cache_ttl(&self) -> chrono::Duration {
        let default = chrono::Duration::days(crate::cache::CACHE_TTL_DAYS);
        if self.cache_ttl_days <= 0 {
            tracing::warn!(
                "Ignoring cache_ttl_days = {}, using {} days",
                self.cache_ttl_days,
                crate::cache::CACHE_TTL_DAYS
            );
            return default;
        }

        chrono::Duration::try_days(self.cache_ttl_days).unwrap_or_else(|| {
            tracing::warn!(
                "cache_ttl_days = {} is out of range, using {} days",
                self.cache_ttl_days,
                crate::cache::CACHE_TTL_DAYS
            );
            default
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(intraboard_core::config::DEFAULT_BASE_URL)
    }
}
