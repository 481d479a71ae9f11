//! Model gateway implementations for Dojo.
//!
//! The OpenAI-compatible provider implements `dojo_core::Provider`; the probe
//! and control-token sanitizer sit next to it because both are about what the
//! model endpoint returns.

pub mod control_tokens;
pub mod openai_compat;
pub mod probe;

pub use control_tokens::sanitize_content;
pub use openai_compat::OpenAiCompatProvider;
pub use probe::{GatewayConfig, display_model_name, probe};
