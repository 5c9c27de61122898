pub mod api;
pub mod config;
pub mod ocm;
pub mod server;

pub use config::{Cli, ExporterConfig};
pub use ocm::{OcmConnection, OcmError, QuotaCostClient};
pub use server::ExporterServer;
