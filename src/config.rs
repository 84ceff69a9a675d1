//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::trendyol::countries::Country;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Desktop Chrome on Windows, the most common storefront visitor profile.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront country answered in the geo prompt
    #[serde(default)]
    pub country: Country,

    /// Chromium executable; discovered automatically when unset
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User-Agent presented by the browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Browser locale / Accept-Language
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Attempts per product, each with a fresh browser session
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Per-step wait budgets
    #[serde(default)]
    pub timeouts: Timeouts,
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_max_attempts() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: Country::Ae,
            chrome_path: None,
            headless: default_headless(),
            user_agent: default_user_agent(),
            locale: default_locale(),
            max_attempts: default_max_attempts(),
            format: OutputFormat::Json,
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("trendyol-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(country) = std::env::var("TRENDYOL_COUNTRY") {
            if let Ok(c) = country.parse() {
                self.country = c;
            }
        }

        if let Ok(path) = std::env::var("TRENDYOL_CHROME_PATH") {
            self.chrome_path = Some(PathBuf::from(path));
        }

        if let Ok(attempts) = std::env::var("TRENDYOL_MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.max_attempts = n;
            }
        }

        self
    }
}

/// Wait budgets for each step of the page interaction, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Initial navigation until DOMContentLoaded
    pub navigation_ms: u64,
    /// Cookie consent banner
    pub consent_ms: u64,
    /// Country selector prompt
    pub country_ms: u64,
    /// Embedded product script
    pub data_ms: u64,
    /// Pause after each optional prompt
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 60_000,
            consent_ms: 10_000,
            country_ms: 10_000,
            data_ms: 20_000,
            settle_ms: 1_000,
        }
    }
}

impl Timeouts {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn consent(&self) -> Duration {
        Duration::from_millis(self.consent_ms)
    }

    pub fn country(&self) -> Duration {
        Duration::from_millis(self.country_ms)
    }

    pub fn data(&self) -> Duration {
        Duration::from_millis(self.data_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}. Use: json, table, markdown", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
