use std::sync::Arc;

use prometheus::proto::{Gauge, LabelPair, Metric};
use thiserror::Error;

use crate::descriptor::MetricDescriptor;

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("metric {metric} expects {expected} label values, got {actual}")]
    LabelCountMismatch {
        metric: String,
        expected: usize,
        actual: usize,
    },
    #[error("label {label} of metric {metric} has an empty value")]
    EmptyLabelValue { metric: String, label: String },
    #[error("metric {metric} value {value} is not finite")]
    NonFiniteValue { metric: String, value: f64 },
}

/// A single gauge observation produced during one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    descriptor: Arc<MetricDescriptor>,
    value: f64,
    label_values: Vec<String>,
}

impl MetricSample {
    /// Builds a gauge sample. Label values are matched positionally against
    /// the descriptor's label names.
    pub fn gauge<S: AsRef<str>>(
        descriptor: &Arc<MetricDescriptor>,
        value: f64,
        label_values: &[S],
    ) -> Result<Self, SampleError> {
        let label_names = descriptor.label_names();
        if label_values.len() != label_names.len() {
            return Err(SampleError::LabelCountMismatch {
                metric: descriptor.name().to_string(),
                expected: label_names.len(),
                actual: label_values.len(),
            });
        }

        let label_values: Vec<String> = label_values
            .iter()
            .map(|value| {
                let value: &str = value.as_ref();
                value.to_string()
            })
            .collect();

        if let Some((label, _)) = label_names
            .iter()
            .zip(&label_values)
            .find(|(_, value)| value.is_empty())
        {
            return Err(SampleError::EmptyLabelValue {
                metric: descriptor.name().to_string(),
                label: label.clone(),
            });
        }

        if !value.is_finite() {
            return Err(SampleError::NonFiniteValue {
                metric: descriptor.name().to_string(),
                value,
            });
        }

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            value,
            label_values,
        })
    }

    pub fn descriptor(&self) -> &Arc<MetricDescriptor> {
        &self.descriptor
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value)
    }

    /// `(name, value)` pairs in descriptor order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.descriptor
            .label_names()
            .iter()
            .zip(&self.label_values)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn to_proto(&self) -> Metric {
        let mut metric = Metric::default();
        for (name, value) in self.labels() {
            let mut pair = LabelPair::default();
            pair.set_name(name.to_string());
            pair.set_value(value.to_string());
            metric.mut_label().push(pair);
        }

        let mut gauge = Gauge::default();
        gauge.set_value(self.value);
        metric.set_gauge(gauge);
        metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> Arc<MetricDescriptor> {
        Arc::new(MetricDescriptor::quota_cost())
    }

    #[test]
    fn gauge_keeps_labels_in_descriptor_order() {
        let sample = MetricSample::gauge(&descriptor(), 5.0, &["o1", "q1", "consumed"])
            .expect("sample should build");

        assert_eq!(sample.value(), 5.0);
        assert_eq!(sample.label("organization_id"), Some("o1"));
        assert_eq!(sample.label("quota_id"), Some("q1"));
        assert_eq!(sample.label("type"), Some("consumed"));
        assert_eq!(sample.label("missing"), None);
    }

    #[test]
    fn gauge_rejects_wrong_label_count() {
        let err = MetricSample::gauge(&descriptor(), 1.0, &["o1", "q1"]).unwrap_err();
        assert_eq!(
            err,
            SampleError::LabelCountMismatch {
                metric: "ocm_quota_cost".to_string(),
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn gauge_rejects_empty_label_value() {
        let err = MetricSample::gauge(&descriptor(), 1.0, &["o1", "", "allowed"]).unwrap_err();
        assert_eq!(
            err,
            SampleError::EmptyLabelValue {
                metric: "ocm_quota_cost".to_string(),
                label: "quota_id".to_string(),
            }
        );
    }

    #[test]
    fn gauge_rejects_nan() {
        let err = MetricSample::gauge(&descriptor(), f64::NAN, &["o1", "q1", "allowed"]);
        assert!(matches!(err, Err(SampleError::NonFiniteValue { .. })));
    }

    #[test]
    fn to_proto_carries_labels_and_value() {
        let sample = MetricSample::gauge(&descriptor(), 10.0, &["o1", "q1", "allowed"]).unwrap();
        let metric = sample.to_proto();

        let labels: Vec<(&str, &str)> = metric
            .get_label()
            .iter()
            .map(|pair| (pair.get_name(), pair.get_value()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("organization_id", "o1"),
                ("quota_id", "q1"),
                ("type", "allowed")
            ]
        );
        assert_eq!(metric.get_gauge().get_value(), 10.0);
    }
}
