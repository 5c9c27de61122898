use ocm_quota_collector::SourceError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcmError {
    #[error("failed to build OCM HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid OCM URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("OCM responded with {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode OCM response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("current account has no organization")]
    MissingOrganization,
}

impl From<OcmError> for SourceError {
    fn from(err: OcmError) -> Self {
        match err {
            OcmError::Request { url, source } => SourceError::Request {
                url,
                message: source.to_string(),
            },
            OcmError::Status { url, status, body } => SourceError::Status {
                url,
                status: status.as_u16(),
                body,
            },
            err @ OcmError::Decode { .. } => SourceError::Decode(err.to_string()),
            other => SourceError::Other(other.to_string()),
        }
    }
}
