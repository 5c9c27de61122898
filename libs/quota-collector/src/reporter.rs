use std::time::Duration;

use thiserror::Error;
use tracing::error;

use crate::descriptor::SampleKind;
use crate::sample::SampleError;
use crate::source::SourceError;

/// Recoverable failures raised while collecting. None of them abort a scrape.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to retrieve quota costs for organization {organization_id}: {source}")]
    Fetch {
        organization_id: String,
        #[source]
        source: SourceError,
    },
    #[error("quota cost request for organization {organization_id} did not finish within {timeout:?}")]
    Timeout {
        organization_id: String,
        timeout: Duration,
    },
    #[error("failed to create {kind} metric for quota {quota_id} of organization {organization_id}: {source}")]
    Sample {
        organization_id: String,
        quota_id: String,
        kind: SampleKind,
        #[source]
        source: SampleError,
    },
}

/// Receives the failures a collector recovers from.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &CollectError);
}

/// Reports collection failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &CollectError) {
        match err {
            CollectError::Fetch {
                organization_id,
                source,
            } => {
                error!(
                    organization_id = %organization_id,
                    error = %source,
                    "[quota cost] failed to retrieve quota costs"
                );
            }
            CollectError::Timeout {
                organization_id,
                timeout,
            } => {
                error!(
                    organization_id = %organization_id,
                    timeout_secs = timeout.as_secs_f64(),
                    "[quota cost] quota cost request timed out"
                );
            }
            CollectError::Sample {
                organization_id,
                quota_id,
                kind,
                source,
            } => {
                error!(
                    organization_id = %organization_id,
                    quota_id = %quota_id,
                    kind = %kind,
                    error = %source,
                    "[quota cost] failed to create metric"
                );
            }
        }
    }
}
