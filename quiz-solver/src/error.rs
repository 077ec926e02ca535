//! Solver errors

use thiserror::Error;

use quiz_core::ParseError;
use quiz_net::FetchError;

/// Failure of a whole hop; recorded in the hop result, never propagated
#[derive(Debug, Error)]
pub enum HopError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid quiz URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure inside an extractor; degrades to that extractor's fallback
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No tabular link on page")]
    NoTabularLink,

    #[error("Cannot resolve link: {0}")]
    UnresolvableLink(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Download of {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Table parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("No encoded payload in page scripts")]
    NoPayload,

    #[error("Payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("No link reference in decoded payload")]
    NoLinkReference,

    #[error("No secret code on {0}")]
    NoSecretCode(String),
}
