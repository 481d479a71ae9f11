//! Shared test helpers for orchestrator tests.

use async_trait::async_trait;
use dojo_core::error::{ProviderError, ToolError};
use dojo_core::event::ProgressEvent;
use dojo_core::message::{Message, MessageToolCall};
use dojo_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use dojo_core::tool::{Tool, ToolResult};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next step in the script. With
/// `repeat_last`, the final step is returned forever; otherwise running past
/// the end panics.
pub struct SequentialMockProvider {
    steps: Vec<Result<ProviderResponse, ProviderError>>,
    repeat_last: bool,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    pub fn scripted(steps: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            steps,
            repeat_last: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls),
            make_text_response(answer),
        ])
    }

    /// A provider that fails every call.
    pub fn failing(error: ProviderError) -> Self {
        Self::scripted(vec![Err(error)]).repeating()
    }

    pub fn repeating(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let idx = requests.len();
        requests.push(request);

        let step = match self.steps.get(idx) {
            Some(step) => step,
            None if self.repeat_last && !self.steps.is_empty() => &self.steps[self.steps.len() - 1],
            None => panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                idx,
                self.steps.len()
            ),
        };
        step.clone()
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response that requests tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools("", tool_calls),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with a given id.
pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A search-shaped tool with canned output.
pub struct CannedSearchTool {
    pub output: String,
    pub success: bool,
}

impl CannedSearchTool {
    pub fn ok(output: &str) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn failing(output: &str) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

#[async_trait]
impl Tool for CannedSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "canned search"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        call_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        let output = self.output.replace("{query}", query);
        Ok(if self.success {
            ToolResult::ok(call_id, output)
        } else {
            ToolResult::failed(call_id, output)
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
