use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::descriptor::{MetricDescriptor, SampleKind};
use crate::record::QuotaCostRecord;
use crate::reporter::{CollectError, ErrorReporter};
use crate::sample::{MetricSample, SampleError};
use crate::sink::SampleSink;
use crate::source::{ListOptions, QuotaCostSource};

/// A source of metric samples that a [`Registry`](crate::Registry) polls on
/// every scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    /// The descriptors of every metric family this collector emits.
    fn describe(&self) -> Vec<Arc<MetricDescriptor>>;

    /// Streams the current samples into `sink`. Failures are handled inside
    /// the collector; a failed collection simply emits fewer samples.
    async fn collect(&self, sink: &mut dyn SampleSink);
}

/// Publishes the `ocm_quota_cost` gauge for one organization.
///
/// Every collection fetches the quota cost list once and emits a `consumed`
/// and an `allowed` sample per record. A failed fetch yields no samples; a
/// sample that cannot be built is skipped without affecting the others.
pub struct QuotaCostCollector<S> {
    source: S,
    descriptor: Arc<MetricDescriptor>,
    reporter: Arc<dyn ErrorReporter>,
    fetch_timeout: Option<Duration>,
}

impl<S: QuotaCostSource> QuotaCostCollector<S> {
    pub fn new(source: S, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            source,
            descriptor: Arc::new(MetricDescriptor::quota_cost()),
            reporter,
            fetch_timeout: None,
        }
    }

    /// Bounds the upstream request. A request still pending after `limit` is
    /// dropped and reported as [`CollectError::Timeout`].
    pub fn with_fetch_timeout(mut self, limit: Duration) -> Self {
        self.fetch_timeout = Some(limit);
        self
    }

    pub fn descriptor(&self) -> &Arc<MetricDescriptor> {
        &self.descriptor
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn fetch(&self) -> Result<Vec<QuotaCostRecord>, CollectError> {
        let request = self.source.list(ListOptions::with_related_resources());
        let result = match self.fetch_timeout {
            Some(limit) => match timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CollectError::Timeout {
                        organization_id: self.source.organization_id().to_string(),
                        timeout: limit,
                    })
                }
            },
            None => request.await,
        };

        result.map_err(|source| CollectError::Fetch {
            organization_id: self.source.organization_id().to_string(),
            source,
        })
    }

    fn sample(&self, record: &QuotaCostRecord, kind: SampleKind) -> Result<MetricSample, SampleError> {
        MetricSample::gauge(
            &self.descriptor,
            record.value(kind) as f64,
            &[
                record.organization_id.as_str(),
                record.quota_id.as_str(),
                kind.as_str(),
            ],
        )
    }
}

#[async_trait]
impl<S: QuotaCostSource> Collector for QuotaCostCollector<S> {
    fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        vec![Arc::clone(&self.descriptor)]
    }

    async fn collect(&self, sink: &mut dyn SampleSink) {
        let records = match self.fetch().await {
            Ok(records) => records,
            Err(err) => {
                self.reporter.report(&err);
                return;
            }
        };

        let mut emitted = 0usize;
        let mut skipped = 0usize;
        for record in &records {
            for kind in SampleKind::ALL {
                match self.sample(record, kind) {
                    Ok(sample) => {
                        sink.emit(sample);
                        emitted += 1;
                    }
                    Err(source) => {
                        skipped += 1;
                        self.reporter.report(&CollectError::Sample {
                            organization_id: record.organization_id.clone(),
                            quota_id: record.quota_id.clone(),
                            kind,
                            source,
                        });
                    }
                }
            }
        }

        debug!(
            organization_id = %self.source.organization_id(),
            records = records.len(),
            emitted,
            skipped,
            "quota cost collection finished"
        );
    }
}
