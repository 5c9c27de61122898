use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};

use crate::registry::RegistryError;

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Renders gathered families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String, RegistryError> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
