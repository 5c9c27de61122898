use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ocm_quota_exporter::{Cli, ExporterConfig, ExporterServer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let config = ExporterConfig::from_cli(cli)?;
    info!(
        host = %config.listen_host,
        port = config.port,
        ocm_url = %config.ocm_url,
        "starting ocm quota exporter"
    );

    let server = ExporterServer::build(config).await?;
    server.run().await?;

    info!("ocm quota exporter shutting down");
    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))?;
    Ok(())
}
