//! Error taxonomy for a product scrape.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    #[error("page {url} did not reach DOM readiness within {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("product data script was not attached within {timeout_ms}ms")]
    DataNotReady { timeout_ms: u64 },

    #[error("product data script not found in page")]
    ScriptNotFound,

    #[error("product data script is empty")]
    EmptyScript,

    #[error("failed to parse product payload: {0}")]
    PayloadParse(String),

    #[error("browser interaction '{action}' failed: {reason}")]
    Interaction { action: String, reason: String },

    #[error("scrape cancelled")]
    Cancelled,

    #[error("all {attempts} attempts failed, last error: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// Builds an [`ScrapeError::Interaction`] from any displayable failure.
    pub fn interaction(action: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Interaction { action: action.into(), reason: reason.to_string() }
    }

    /// Returns the innermost error, unwrapping [`ScrapeError::RetryExhausted`].
    pub fn root_cause(&self) -> &ScrapeError {
        match self {
            ScrapeError::RetryExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
