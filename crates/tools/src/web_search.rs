//! web_search tool: SearXNG JSON API client.
//!
//! Queries with recency intent ("latest", "today", "weather", ...) ask for
//! news first, restrict to the past day, and put dated results newest-first.
//! Every failure is returned as text so the model can try another query.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use dojo_config::{MAX_SEARCH_RESULTS, SearchConfig};
use dojo_core::error::ToolError;
use dojo_core::event::ProgressEvent;
use dojo_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Words that mark a query as time-sensitive.
pub const RECENCY_WORDS: &[&str] = &[
    "latest",
    "recent",
    "today",
    "now",
    "current",
    "score",
    "news",
    "weather",
    "live",
    "tonight",
    "yesterday",
];

pub const NO_RESULTS: &str = "No search results found.";

pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(config: &SearchConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
            language: config.language.clone(),
            max_results: config.max_results,
        })
    }

    /// Run one search. `Ok` and `Err` both carry the text for the model.
    pub async fn search(&self, query: &str) -> Result<String, String> {
        let recent = needs_recent(query);
        let categories = if recent { "news,general" } else { "general,news" };

        let mut params = vec![
            ("q", query),
            ("format", "json"),
            ("categories", categories),
            ("language", self.language.as_str()),
        ];
        if recent {
            params.push(("time_range", "day"));
        }

        debug!(query, recent, "web_search");

        let resp = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|e| format!("Search failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Search backend returned error");
            return Err(format!("Search error: {}", status.as_u16()));
        }

        let body: SearxResponse = resp
            .json()
            .await
            .map_err(|e| format!("Search failed: {e}"))?;

        let mut results = body.results;
        if recent {
            sort_dated_newest_first(&mut results);
        }
        results.truncate(self.max_results.min(MAX_SEARCH_RESULTS));

        if results.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(format_results(&results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information such as news, scores, weather or facts. \
         Returns titles, snippets and source URLs; use fetch_url to read a specific page."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        call_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        Ok(match self.search(query).await {
            Ok(text) => ToolResult::ok(call_id, text),
            Err(text) => ToolResult::failed(call_id, text),
        })
    }

    fn start_event(&self, arguments: &serde_json::Value) -> Option<ProgressEvent> {
        Some(ProgressEvent::SearchStart {
            query: arguments["query"].as_str().unwrap_or_default().to_string(),
        })
    }

    fn result_event(&self, result: &ToolResult) -> Option<ProgressEvent> {
        Some(ProgressEvent::SearchResults {
            results: result.output.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "publishedDate")]
    published_date: Option<String>,
}

impl SearxResult {
    fn published(&self) -> Option<DateTime<Utc>> {
        self.published_date.as_deref().and_then(parse_date)
    }
}

/// Whole-word, case-insensitive check against [`RECENCY_WORDS`].
pub fn needs_recent(query: &str) -> bool {
    query
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| RECENCY_WORDS.contains(&word.to_lowercase().as_str()))
}

/// Parse the date formats SearXNG engines emit.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reorder dated results newest-first among themselves. Undated results keep
/// their exact positions.
fn sort_dated_newest_first(results: &mut [SearxResult]) {
    let slots: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.published().is_some())
        .map(|(idx, _)| idx)
        .collect();

    let mut dated: Vec<SearxResult> = slots.iter().map(|&idx| results[idx].clone()).collect();
    dated.sort_by(|a, b| b.published().cmp(&a.published()));

    for (slot, result) in slots.into_iter().zip(dated) {
        results[slot] = result;
    }
}

fn format_results(results: &[SearxResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut entry = format!("{}. {}", i + 1, r.title.as_deref().unwrap_or_default());
            if let Some(raw) = r.published_date.as_deref().filter(|d| !d.is_empty()) {
                let date = parse_date(raw)
                    .map(|d| d.format("%-m/%-d/%Y").to_string())
                    .unwrap_or_else(|| raw.to_string());
                entry.push_str(&format!(" ({date})"));
            }
            let snippet = r
                .content
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or("No description");
            entry.push_str(&format!("\n   {snippet}"));
            if let Some(url) = r.url.as_deref().filter(|u| !u.is_empty()) {
                entry.push_str(&format!("\n   Source: {url}"));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
