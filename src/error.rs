use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoginError>;

/// Failure taxonomy for the login workflow.
///
/// Nothing here is caught or retried internally; every variant unwinds to
/// `main`, which logs it and exits nonzero. Browser teardown still runs on
/// every path.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("timeout after {ms}ms waiting for: {condition}")]
    Timeout { ms: u64, condition: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
