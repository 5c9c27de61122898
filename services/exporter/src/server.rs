use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use ocm_quota_collector::{QuotaCostCollector, Registry, TracingReporter};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{self, ApiState};
use crate::config::ExporterConfig;
use crate::ocm::OcmConnection;

/// The exporter process: one quota cost collector behind `/metrics`.
pub struct ExporterServer {
    config: Arc<ExporterConfig>,
    registry: Arc<Registry>,
    organization_id: String,
}

impl ExporterServer {
    /// Connects to OCM, resolves the organization and registers the quota
    /// cost collector.
    pub async fn build(config: ExporterConfig) -> Result<Self> {
        config.validate()?;

        let connection =
            OcmConnection::from_config(&config).context("failed to create ocm connection")?;
        let organization_id = connection
            .resolve_organization_id(config.organization_id.as_deref())
            .await
            .context("failed to retrieve current user information")?;

        let collector = QuotaCostCollector::new(
            connection.quota_costs(organization_id.clone()),
            Arc::new(TracingReporter),
        )
        .with_fetch_timeout(config.fetch_timeout());

        let mut registry = Registry::new();
        registry
            .register(Arc::new(collector))
            .context("failed to register quota cost collector")?;

        info!(
            organization_id = %organization_id,
            ocm_url = %connection.base_url(),
            "quota cost collector registered"
        );

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            organization_id,
        })
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(ApiState::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
        ));
        api::create_router(state)
    }

    /// Serves until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .context("Invalid listen address")?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        info!(%addr, "metrics endpoint listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("metrics server failed")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
