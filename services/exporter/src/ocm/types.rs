use ocm_quota_collector::QuotaCostRecord;
use serde::{Deserialize, Serialize};

/// One page of `GET /organizations/{id}/quota_cost`.
///
/// Items stay as raw JSON so a single malformed entry can be skipped without
/// discarding the page.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaCostPage {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    pub total: Option<u32>,
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaCostItem {
    pub organization_id: String,
    pub quota_id: String,
    #[serde(default)]
    pub consumed: i64,
    #[serde(default)]
    pub allowed: i64,
    #[serde(default)]
    pub related_resources: Vec<RelatedResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedResource {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub billing_model: String,
    #[serde(default)]
    pub cost: i64,
}

impl From<QuotaCostItem> for QuotaCostRecord {
    fn from(item: QuotaCostItem) -> Self {
        QuotaCostRecord::new(item.organization_id, item.quota_id, item.consumed, item.allowed)
    }
}

/// Subset of `GET /current_account` needed to find the caller's organization.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationRef {
    #[serde(default)]
    pub id: String,
}
