//! Quota cost collection for the OCM Prometheus exporter.
//!
//! This crate turns the quota cost records reported by the OpenShift Cluster
//! Manager account-management API into gauge samples. The
//! [`QuotaCostCollector`] fetches the records once per scrape through a
//! [`QuotaCostSource`], streams two samples per record into a [`SampleSink`],
//! and reports recoverable failures through an [`ErrorReporter`] instead of
//! failing the scrape. A [`Registry`] gathers the samples of every registered
//! collector into metric families and renders the text exposition format.

pub mod collector;
pub mod descriptor;
pub mod encoding;
pub mod record;
pub mod registry;
pub mod reporter;
pub mod sample;
pub mod sink;
pub mod source;

pub use collector::{Collector, QuotaCostCollector};
pub use descriptor::{
    MetricDescriptor, SampleKind, LABEL_ORGANIZATION_ID, LABEL_QUOTA_ID, LABEL_TYPE,
    QUOTA_COST_METRIC_HELP, QUOTA_COST_METRIC_NAME,
};
pub use encoding::{encode_text, TEXT_CONTENT_TYPE};
pub use record::QuotaCostRecord;
pub use registry::{Registry, RegistryError};
pub use reporter::{CollectError, ErrorReporter, TracingReporter};
pub use sample::{MetricSample, SampleError};
pub use sink::SampleSink;
pub use source::{ListOptions, QuotaCostSource, SourceError};
