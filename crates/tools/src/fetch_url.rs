//! fetch_url tool: HTTP GET with text extraction.

use crate::html::{html_to_text, preview, truncate_chars};
use async_trait::async_trait;
use dojo_config::FetchConfig;
use dojo_core::error::ToolError;
use dojo_core::event::ProgressEvent;
use dojo_core::tool::{Tool, ToolResult};
use std::time::Duration;
use tracing::debug;

pub const NO_CONTENT: &str = "No readable content found on page.";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub struct FetchUrlTool {
    client: reqwest::Client,
    max_chars: usize,
    preview_chars: usize,
}

impl FetchUrlTool {
    pub fn new(config: &FetchConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "fetch_url".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_chars: config.max_chars,
            preview_chars: config.preview_chars,
        })
    }

    /// Fetch a page and return its cleaned text. `Err` carries the error text.
    pub async fn fetch_page(&self, url: &str) -> Result<String, String> {
        debug!(url, "fetch_url");

        let resp = self
            .client
            .get(url)
            .header("Accept", ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| format!("Fetch failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch: {}", status.as_u16()));
        }

        let html = resp.text().await.map_err(|e| format!("Fetch failed: {e}"))?;
        let text = html_to_text(&html);
        if text.is_empty() {
            return Ok(NO_CONTENT.to_string());
        }
        Ok(truncate_chars(&text, self.max_chars))
    }
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its readable text. Use after web_search when the \
         snippets do not contain the detail you need."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch content from"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(
        &self,
        call_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let url = arguments["url"].as_str().unwrap_or_default();
        Ok(match self.fetch_page(url).await {
            Ok(text) => ToolResult::ok(call_id, text),
            Err(text) => ToolResult::failed(call_id, text),
        })
    }

    fn start_event(&self, arguments: &serde_json::Value) -> Option<ProgressEvent> {
        Some(ProgressEvent::FetchStart {
            url: arguments["url"].as_str().unwrap_or_default().to_string(),
        })
    }

    fn result_event(&self, result: &ToolResult) -> Option<ProgressEvent> {
        Some(ProgressEvent::FetchResults {
            content: preview(&result.output, self.preview_chars),
        })
    }
}
