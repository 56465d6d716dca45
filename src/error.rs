//! Error types for portal operations.

use thiserror::Error;

/// Exit code for handled domain errors (not logged in, search failures, bad input).
pub const EXIT_DOMAIN_ERROR: u8 = 2;
/// Exit code when a runtime dependency such as the browser is missing.
pub const EXIT_MISSING_DEPENDENCY: u8 = 3;

/// Top-level failure of a `login` or `search` operation.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Session missing or expired, or login could not be completed.
    #[error("{0}")]
    NotLoggedIn(String),

    #[error(transparent)]
    Search(#[from] SearchError),

    /// Rejected caller input, e.g. an empty query.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PortalError {
    pub fn not_logged_in(message: impl Into<String>) -> Self {
        Self::NotLoggedIn(message.into())
    }

    /// Process exit code for this error when surfaced by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotLoggedIn(_) | Self::Search(_) | Self::InvalidInput(_) => EXIT_DOMAIN_ERROR,
            Self::Browser(e) if e.is_missing_dependency() => EXIT_MISSING_DEPENDENCY,
            _ => 1,
        }
    }
}

/// Failures while interacting with the search UI.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("'{query}' returned 0 results (the site may be limiting queries or the search conditions are off)")]
    ZeroResults { query: String },

    #[error("No candidates found for '{query}'. Refresh the login session and try again.")]
    NoCandidates { query: String },

    #[error("Company '{0}' was not found among the candidates")]
    CompanyNotFound(String),

    #[error("Could not click the company link: {0}")]
    LinkNotClickable(String),

    #[error("Login input fields were not found")]
    LoginFieldsMissing,

    #[error("Page element not found: {0}")]
    ElementNotFound(String),
}

/// Failures reported by the browser driver.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No usable browser binary.
    #[error("Browser not available: {0}")]
    Unavailable(String),

    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Browser error: {0}")]
    Driver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::NotCompiled)
    }
}
