//! Built-in tool implementations for Dojo.
//!
//! Two tools, declared in this order on every model request:
//! `web_search` (SearXNG) and `fetch_url` (page text extraction).

pub mod fetch_url;
pub mod html;
pub mod web_search;

use dojo_config::AppConfig;
use dojo_core::error::ToolError;
use dojo_core::tool::ToolRegistry;

pub use fetch_url::FetchUrlTool;
pub use web_search::WebSearchTool;

/// Create the tool registry used by every run.
pub fn default_registry(config: &AppConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(&config.search)?));
    registry.register(Box::new(FetchUrlTool::new(&config.fetch)?));
    Ok(registry)
}
