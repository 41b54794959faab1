use reqwest::StatusCode;
use thiserror::Error;

/// Failure to turn a free-text location into a provider location key.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("no locations matched '{0}'")]
    NoCandidates(String),

    #[error("location search failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("location search request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed location search response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure to read today's alternate side parking status.
#[derive(Error, Debug)]
pub enum ParkingError {
    #[error("parking calendar request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("parking calendar request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed parking calendar response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("parking calendar response has no {0} entry")]
    Missing(&'static str),
}
