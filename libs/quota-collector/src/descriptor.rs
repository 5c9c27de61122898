use std::fmt;

pub const QUOTA_COST_METRIC_NAME: &str = "ocm_quota_cost";
pub const QUOTA_COST_METRIC_HELP: &str = "Openshift Cluster Manager Quota Costs";

pub const LABEL_ORGANIZATION_ID: &str = "organization_id";
pub const LABEL_QUOTA_ID: &str = "quota_id";
pub const LABEL_TYPE: &str = "type";

/// Static name, help text and ordered label schema of a metric family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    label_names: Vec<String>,
}

impl MetricDescriptor {
    pub fn new<I, L>(name: impl Into<String>, help: impl Into<String>, label_names: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            name: name.into(),
            help: help.into(),
            label_names: label_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Descriptor of the `ocm_quota_cost` gauge family.
    pub fn quota_cost() -> Self {
        Self::new(
            QUOTA_COST_METRIC_NAME,
            QUOTA_COST_METRIC_HELP,
            [LABEL_ORGANIZATION_ID, LABEL_QUOTA_ID, LABEL_TYPE],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }
}

/// Value of the `type` label: which side of a quota record a sample carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Consumed,
    Allowed,
}

impl SampleKind {
    /// Emission order for every record.
    pub const ALL: [SampleKind; 2] = [SampleKind::Consumed, SampleKind::Allowed];

    pub fn as_str(self) -> &'static str {
        match self {
            SampleKind::Consumed => "consumed",
            SampleKind::Allowed => "allowed",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
