use std::sync::Arc;

use ocm_quota_collector::Registry;

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::*;
pub use router::create_router;
pub use types::*;

use crate::config::ExporterConfig;

pub struct ApiState {
    pub registry: Arc<Registry>,
    pub config: Arc<ExporterConfig>,
}

impl ApiState {
    pub fn new(registry: Arc<Registry>, config: Arc<ExporterConfig>) -> Self {
        Self { registry, config }
    }
}
