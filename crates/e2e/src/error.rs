//! Error types for the case runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Fixture(#[from] sheetcheck_fixture::FixtureError),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser driver error: {0}")]
    Browser(String),

    #[error("Timeout waiting for '{selector}' (last seen: {last_seen:?})")]
    Timeout { selector: String, last_seen: String },

    #[error("Target health check failed after {0} attempts")]
    TargetHealthCheck(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
