use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;

pub const DEFAULT_PORT: u16 = 9090;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_OCM_URL: &str = "https://api.openshift.com";
pub const ENV_OCM_TOKEN: &str = "OCM_TOKEN";
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Command line of the exporter binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "ocm-exporter", version, about = "Starts the OCM metrics exporter")]
pub struct Cli {
    /// Port to listen on
    #[arg(short = 'p', long, env = "OCM_EXPORTER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to listen on
    #[arg(long, env = "OCM_EXPORTER_HOST", default_value = DEFAULT_HOST)]
    pub listen_host: String,

    /// Organization ID to query quotas for (defaults to the current account's organization)
    #[arg(short = 'o', long, env = "OCM_ORGANIZATION_ID")]
    pub organization_id: Option<String>,

    /// Path to file containing OCM token (takes precedence over OCM_TOKEN)
    #[arg(short = 't', long)]
    pub ocm_token_path: Option<PathBuf>,

    /// Base URL of the OCM API
    #[arg(long, env = "OCM_URL", default_value = DEFAULT_OCM_URL)]
    pub ocm_url: String,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Upper bound for one quota cost collection, in seconds
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Timeout of a single OCM API request, in seconds
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Number of quota cost items requested per page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,
}

#[derive(Clone)]
pub struct ExporterConfig {
    pub listen_host: String,
    pub port: u16,
    pub organization_id: Option<String>,
    pub ocm_url: String,
    pub token: String,
    pub debug: bool,
    pub fetch_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub page_size: u32,
}

impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("listen_host", &self.listen_host)
            .field("port", &self.port)
            .field("organization_id", &self.organization_id)
            .field("ocm_url", &self.ocm_url)
            .field("token", &"<redacted>")
            .field("debug", &self.debug)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl ExporterConfig {
    /// Resolves the token and validates the parsed command line.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let token = resolve_token(cli.ocm_token_path.as_deref(), env::var(ENV_OCM_TOKEN).ok())?;

        let config = Self {
            listen_host: cli.listen_host,
            port: cli.port,
            organization_id: cli
                .organization_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            ocm_url: cli.ocm_url,
            token,
            debug: cli.debug,
            fetch_timeout_secs: cli.fetch_timeout_secs,
            request_timeout_secs: cli.request_timeout_secs,
            page_size: cli.page_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            anyhow::bail!("no OCM token provided: set {ENV_OCM_TOKEN} or --ocm-token-path");
        }
        if self.listen_host.trim().is_empty() {
            anyhow::bail!("listen host cannot be empty");
        }
        if self.port == 0 {
            anyhow::bail!("port must be greater than zero");
        }
        Url::parse(&self.ocm_url)
            .with_context(|| format!("OCM URL is invalid: {}", self.ocm_url))?;
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch timeout must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be greater than zero");
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!("page size must be between 1 and {MAX_PAGE_SIZE}");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A token file wins over the environment. Surrounding whitespace is dropped.
pub fn resolve_token(token_path: Option<&Path>, env_token: Option<String>) -> Result<String> {
    if let Some(path) = token_path {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read OCM token file {}", path.display()))?;
        return Ok(raw.trim().to_string());
    }

    Ok(env_token
        .map(|token| token.trim().to_string())
        .unwrap_or_default())
}
