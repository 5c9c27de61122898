use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::QuotaCostRecord;

/// Options for a quota cost list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// Ask upstream to embed the related resources of every quota.
    pub fetch_related_resources: bool,
}

impl ListOptions {
    pub fn with_related_resources() -> Self {
        Self {
            fetch_related_resources: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("upstream responded with {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

/// Client able to list the quota costs of the organization it is bound to.
///
/// Transport, authentication and pagination are the implementor's concern.
#[async_trait]
pub trait QuotaCostSource: Send + Sync {
    fn organization_id(&self) -> &str;

    async fn list(&self, options: ListOptions) -> Result<Vec<QuotaCostRecord>, SourceError>;
}

#[async_trait]
impl<T: QuotaCostSource + ?Sized> QuotaCostSource for Arc<T> {
    fn organization_id(&self) -> &str {
        (**self).organization_id()
    }

    async fn list(&self, options: ListOptions) -> Result<Vec<QuotaCostRecord>, SourceError> {
        (**self).list(options).await
    }
}
