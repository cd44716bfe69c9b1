use reqwest::StatusCode;
use thiserror::Error;

/// Failure while fetching one source. Never escapes the per-source boundary.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error! status: {status}")]
    Transport { status: StatusCode },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of a whole aggregation pass, outside any single source.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Invalid upstream endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },
}
