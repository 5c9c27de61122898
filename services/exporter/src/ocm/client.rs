use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ocm_quota_collector::{ListOptions, QuotaCostRecord, QuotaCostSource, SourceError};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ExporterConfig;

use super::error::OcmError;
use super::types::{CurrentAccount, QuotaCostItem, QuotaCostPage};

pub const ACCOUNTS_MGMT_PATH: &str = "/api/accounts_mgmt/v1";

/// Authenticated handle on the OCM account-management API.
#[derive(Clone)]
pub struct OcmConnection {
    http_client: Client,
    base_url: String,
    token: String,
    page_size: u32,
}

impl fmt::Debug for OcmConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcmConnection")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl OcmConnection {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        request_timeout: Duration,
        page_size: u32,
    ) -> Result<Self, OcmError> {
        Url::parse(base_url).map_err(|err| OcmError::InvalidUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;

        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(OcmError::Client)?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: page_size.max(1),
        })
    }

    pub fn from_config(config: &ExporterConfig) -> Result<Self, OcmError> {
        Self::new(
            &config.ocm_url,
            config.token.clone(),
            config.request_timeout(),
            config.page_size,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Organization of the account the token belongs to.
    pub async fn current_organization_id(&self) -> Result<String, OcmError> {
        let url = format!("{}{}/current_account", self.base_url, ACCOUNTS_MGMT_PATH);
        let account: CurrentAccount = self.get_json(&url, &[]).await?;

        let organization_id = account
            .organization
            .map(|organization| organization.id)
            .filter(|id| !id.is_empty())
            .ok_or(OcmError::MissingOrganization)?;

        debug!(
            account_id = %account.id,
            username = %account.username,
            organization_id = %organization_id,
            "resolved organization from current account"
        );
        Ok(organization_id)
    }

    /// Uses `configured` when present, otherwise asks OCM for the current
    /// account's organization.
    pub async fn resolve_organization_id(&self, configured: Option<&str>) -> Result<String, OcmError> {
        match configured {
            Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => self.current_organization_id().await,
        }
    }

    /// Quota cost client bound to one organization.
    pub fn quota_costs(&self, organization_id: impl Into<String>) -> QuotaCostClient {
        QuotaCostClient {
            connection: self.clone(),
            organization_id: organization_id.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, OcmError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|source| OcmError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(OcmError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|source| OcmError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| OcmError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Lists the quota costs of a single organization, following pagination.
#[derive(Debug, Clone)]
pub struct QuotaCostClient {
    connection: OcmConnection,
    organization_id: String,
}

impl QuotaCostClient {
    pub fn url(&self) -> String {
        format!(
            "{}{}/organizations/{}/quota_cost",
            self.connection.base_url, ACCOUNTS_MGMT_PATH, self.organization_id
        )
    }

    /// Reads every page. Items that fail to decode are logged and skipped.
    pub async fn list_all(&self, options: ListOptions) -> Result<Vec<QuotaCostRecord>, OcmError> {
        let url = self.url();
        let page_size = self.connection.page_size;
        let mut records = Vec::new();
        let mut seen = 0usize;
        let mut page = 1u32;

        loop {
            let mut query = vec![("page", page.to_string()), ("size", page_size.to_string())];
            if options.fetch_related_resources {
                query.push(("fetchRelatedResources", "true".to_string()));
            }

            let body: QuotaCostPage = self.connection.get_json(&url, &query).await?;
            let count = body.items.len();
            seen += count;

            for item in body.items {
                match serde_json::from_value::<QuotaCostItem>(item) {
                    Ok(item) => records.push(QuotaCostRecord::from(item)),
                    Err(err) => warn!(
                        organization_id = %self.organization_id,
                        page,
                        error = %err,
                        "skipping malformed quota cost item"
                    ),
                }
            }

            debug!(
                organization_id = %self.organization_id,
                page,
                items = count,
                total = ?body.total,
                "fetched quota cost page"
            );

            let finished = match body.total {
                Some(total) => seen >= total as usize,
                None => count < page_size as usize,
            };
            if count == 0 || finished {
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}

#[async_trait]
impl QuotaCostSource for QuotaCostClient {
    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    async fn list(&self, options: ListOptions) -> Result<Vec<QuotaCostRecord>, SourceError> {
        self.list_all(options).await.map_err(SourceError::from)
    }
}
