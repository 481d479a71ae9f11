//! Readiness probe for the model endpoint.
//!
//! The probe lists models once; success marks the gateway ready and derives a
//! display name from the first model id. The result is a plain value the
//! server stores and hands to each run.

use dojo_core::Provider;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Display name used when the endpoint reports no usable model id.
pub const FALLBACK_MODEL_NAME: &str = "gpt-oss";

/// Readiness of the model endpoint, as last probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub ready: bool,
    #[serde(rename = "model")]
    pub model_name: String,
}

impl GatewayConfig {
    /// State before any probe has succeeded.
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            model_name: FALLBACK_MODEL_NAME.into(),
        }
    }

    /// A ready gateway with a fixed name (tests, in-process runs).
    pub fn ready(model_name: impl Into<String>) -> Self {
        Self {
            ready: true,
            model_name: model_name.into(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::not_ready()
    }
}

/// Derive a short display name from a model id such as
/// `lmstudio-community/gpt-oss-20b.gguf`.
pub fn display_model_name(model_id: Option<&str>) -> String {
    let name = model_id
        .and_then(|id| id.rsplit('/').next())
        .map(|last| last.replacen(".gguf", "", 1))
        .unwrap_or_default();
    if name.is_empty() {
        FALLBACK_MODEL_NAME.into()
    } else {
        name
    }
}

/// Probe the provider and report readiness.
pub async fn probe(provider: &dyn Provider) -> GatewayConfig {
    match provider.list_models().await {
        Ok(models) => {
            let model_name = display_model_name(models.first().map(String::as_str));
            info!(provider = provider.name(), model = %model_name, "Model endpoint connected");
            GatewayConfig::ready(model_name)
        }
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Model endpoint not available");
            GatewayConfig::not_ready()
        }
    }
}
