use serde::{Deserialize, Serialize};

use crate::descriptor::SampleKind;

/// One quota cost entry reported for an (organization, quota) pair.
///
/// Values are passed through as reported upstream, including zero or
/// negative counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCostRecord {
    pub organization_id: String,
    pub quota_id: String,
    pub consumed: i64,
    pub allowed: i64,
}

impl QuotaCostRecord {
    pub fn new(
        organization_id: impl Into<String>,
        quota_id: impl Into<String>,
        consumed: i64,
        allowed: i64,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            quota_id: quota_id.into(),
            consumed,
            allowed,
        }
    }

    pub fn value(&self, kind: SampleKind) -> i64 {
        match kind {
            SampleKind::Consumed => self.consumed,
            SampleKind::Allowed => self.allowed,
        }
    }
}
