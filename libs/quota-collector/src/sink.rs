use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::sample::MetricSample;

/// Destination for samples streamed out of a collection, one at a time.
pub trait SampleSink: Send {
    fn emit(&mut self, sample: MetricSample);
}

impl SampleSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}

impl SampleSink for UnboundedSender<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        if self.send(sample).is_err() {
            trace!("sample receiver dropped, discarding sample");
        }
    }
}
