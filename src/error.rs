use std::path::PathBuf;
use strum::Display;
use thiserror::Error;

/// The remote collaborator a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Text,
    Image,
    Download,
}

/// Failures of a request chain or a download.
///
/// None of these are shown to the user verbatim; the conversation collapses
/// them into a single generic message and logs the detail.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to {endpoint} endpoint failed: {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} response is not valid JSON: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} endpoint returned HTTP {status}")]
    Http {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
    },

    #[error("{endpoint} endpoint reported status {status:?}")]
    Status { endpoint: Endpoint, status: String },

    #[error("{endpoint} response is missing `{field}`")]
    MissingField {
        endpoint: Endpoint,
        field: &'static str,
    },

    #[error("failed to save image to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChatError {
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ChatError::Network { endpoint, .. }
            | ChatError::Decode { endpoint, .. }
            | ChatError::Http { endpoint, .. }
            | ChatError::Status { endpoint, .. }
            | ChatError::MissingField { endpoint, .. } => Some(*endpoint),
            ChatError::Save { .. } => None,
        }
    }
}
