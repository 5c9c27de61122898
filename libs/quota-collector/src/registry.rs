use std::collections::{HashMap, HashSet};
use std::string::FromUtf8Error;
use std::sync::Arc;

use prometheus::proto::{MetricFamily, MetricType};
use thiserror::Error;
use tracing::debug;

use crate::collector::Collector;
use crate::descriptor::MetricDescriptor;
use crate::sample::MetricSample;
use crate::sink::SampleSink;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("collector does not describe any metric")]
    NoDescriptors,
    #[error("metric {0} is already registered")]
    AlreadyRegistered(String),
    #[error("failed to encode metrics: {0}")]
    Encoding(#[from] prometheus::Error),
    #[error("encoded metrics are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Set of collectors polled together on every scrape.
///
/// A registry is an ordinary value: build one, register collectors, then
/// share it (usually behind an `Arc`) with whatever serves the scrapes.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collector. Each metric name may only be claimed once.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<(), RegistryError> {
        let descriptors = collector.describe();
        if descriptors.is_empty() {
            return Err(RegistryError::NoDescriptors);
        }

        let mut claimed = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let name = descriptor.name();
            if self.names.contains(name) || !claimed.insert(name.to_string()) {
                return Err(RegistryError::AlreadyRegistered(name.to_string()));
            }
        }

        debug!(metrics = ?claimed, "collector registered");
        self.names.extend(claimed);
        self.collectors.push(collector);
        Ok(())
    }

    pub fn descriptors(&self) -> Vec<Arc<MetricDescriptor>> {
        self.collectors
            .iter()
            .flat_map(|collector| collector.describe())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Runs every collector once and groups the emitted samples by metric
    /// family, in registration order. Families without samples are left out.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let mut families = FamilyBuilder::default();
        for collector in &self.collectors {
            for descriptor in collector.describe() {
                families.declare(&descriptor);
            }
            collector.collect(&mut families).await;
        }
        families.finish()
    }
}

#[derive(Default)]
struct FamilyBuilder {
    order: Vec<String>,
    families: HashMap<String, MetricFamily>,
}

impl FamilyBuilder {
    fn declare(&mut self, descriptor: &MetricDescriptor) {
        if self.families.contains_key(descriptor.name()) {
            return;
        }

        let mut family = MetricFamily::default();
        family.set_name(descriptor.name().to_string());
        family.set_help(descriptor.help().to_string());
        family.set_field_type(MetricType::GAUGE);

        self.order.push(descriptor.name().to_string());
        self.families.insert(descriptor.name().to_string(), family);
    }

    fn finish(mut self) -> Vec<MetricFamily> {
        self.order
            .iter()
            .filter_map(|name| self.families.remove(name))
            .filter(|family| !family.get_metric().is_empty())
            .collect()
    }
}

impl SampleSink for FamilyBuilder {
    fn emit(&mut self, sample: MetricSample) {
        self.declare(sample.descriptor());
        if let Some(family) = self.families.get_mut(sample.descriptor().name()) {
            family.mut_metric().push(sample.to_proto());
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FixedCollector {
        descriptor: Arc<MetricDescriptor>,
        values: Vec<f64>,
    }

    impl FixedCollector {
        fn new(name: &str, values: Vec<f64>) -> Self {
            Self {
                descriptor: Arc::new(MetricDescriptor::new(name, "test metric", ["id"])),
                values,
            }
        }
    }

    #[async_trait]
    impl Collector for FixedCollector {
        fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
            vec![Arc::clone(&self.descriptor)]
        }

        async fn collect(&self, sink: &mut dyn SampleSink) {
            for (index, value) in self.values.iter().enumerate() {
                let id = index.to_string();
                if let Ok(sample) = MetricSample::gauge(&self.descriptor, *value, &[id]) {
                    sink.emit(sample);
                }
            }
        }
    }

    struct SilentCollector;

    #[async_trait]
    impl Collector for SilentCollector {
        fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
            Vec::new()
        }

        async fn collect(&self, _sink: &mut dyn SampleSink) {}
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = Registry::new();
        registry
            .register(Arc::new(FixedCollector::new("first", vec![1.0])))
            .expect("first registration succeeds");

        let err = registry
            .register(Arc::new(FixedCollector::new("first", vec![2.0])))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_rejects_collectors_without_descriptors() {
        let mut registry = Registry::new();
        let err = registry.register(Arc::new(SilentCollector)).unwrap_err();
        assert!(matches!(err, RegistryError::NoDescriptors));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn gather_groups_samples_per_family_and_drops_empty_ones() {
        let mut registry = Registry::new();
        registry
            .register(Arc::new(FixedCollector::new("alpha", vec![1.0, 2.0])))
            .unwrap();
        registry
            .register(Arc::new(FixedCollector::new("empty", Vec::new())))
            .unwrap();
        registry
            .register(Arc::new(FixedCollector::new("beta", vec![3.0])))
            .unwrap();

        let names: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "empty", "beta"]);

        let families = registry.gather().await;
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].get_name(), "alpha");
        assert_eq!(families[0].get_field_type(), MetricType::GAUGE);
        assert_eq!(families[0].get_metric().len(), 2);
        assert_eq!(families[1].get_name(), "beta");
        assert_eq!(families[1].get_metric()[0].get_gauge().get_value(), 3.0);
    }
}
