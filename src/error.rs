use thiserror::Error;

/// Errors reported by a page fetch adapter
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not connect to any WebDriver server (tried {0})")]
    Connect(String),

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },
}

/// Errors raised while talking to the decision oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("oracle returned no message content")]
    EmptyResponse,

    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Network(err.to_string())
    }
}

/// Oracle output that does not match one of the three verdict shapes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerdictError {
    #[error("response is not a JSON verdict object: {0}")]
    NotJson(String),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("action NEXT_LINK_TO_CRAWL requires a next_link")]
    MissingNextLink,

    #[error("action {0} must have a null next_link")]
    UnexpectedNextLink(String),

    #[error("next_link {link:?} is not a usable http(s) URL: {reason}")]
    InvalidNextLink { link: String, reason: String },
}

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
