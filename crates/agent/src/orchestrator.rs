//! The conversation orchestrator.
//!
//! A run is an explicit state machine:
//!
//! ```text
//! Seeded -> AwaitingModel -> (ToolDispatch -> AwaitingModel)* -> Terminal
//! ```
//!
//! The orchestrator owns the transcript for the duration of a run, executes
//! tool calls strictly in request order, and reports progress through a
//! [`ProgressRelay`]. Every run ends in exactly one terminal outcome; `done`
//! or `error` is the last event its subscriber sees.

use crate::prompt::{EXHAUSTED_ANSWER, NOT_READY_MESSAGE, SYSTEM_PROMPT};
use crate::relay::{EVENT_CHANNEL_CAPACITY, ProgressRelay};
use dojo_config::AppConfig;
use dojo_core::error::ToolError;
use dojo_core::event::ProgressEvent;
use dojo_core::message::{Message, MessageToolCall, RunId, Transcript};
use dojo_core::provider::{Provider, ProviderRequest, ToolDefinition};
use dojo_core::tool::{ToolCall, ToolRegistry, ToolResult, parse_arguments};
use dojo_providers::{GatewayConfig, sanitize_content};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced a final answer (already sanitized).
    Done(String),
    /// The round-trip budget ran out.
    Exhausted,
    /// Model endpoint unavailable or failed mid-run.
    Failed(String),
    /// The subscriber left before the next model round-trip.
    Cancelled,
}

#[derive(Debug)]
enum RunState {
    Seeded,
    AwaitingModel { iteration: usize },
    ToolDispatch {
        iteration: usize,
        calls: Vec<MessageToolCall>,
    },
    Terminal(Outcome),
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    pub outcome: Outcome,
    /// Model round-trips attempted
    pub iterations: usize,
    /// Tool calls dispatched (known or not)
    pub tool_calls: usize,
    pub transcript: Transcript,
}

struct RunContext<'a> {
    gateway: &'a GatewayConfig,
    relay: &'a mut ProgressRelay,
    transcript: Transcript,
    definitions: Vec<ToolDefinition>,
    iterations: usize,
    tool_calls: usize,
}

pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: usize,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tools,
            model: "local-model".into(),
            temperature: 0.3,
            max_tokens: Some(1000),
            max_iterations: 8,
            system_prompt: SYSTEM_PROMPT.into(),
        }
    }

    /// Build an orchestrator with the default tool set, configured from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
    ) -> Result<Self, ToolError> {
        let tools = dojo_tools::default_registry(config)?;
        let mut orchestrator = Self::new(provider, Arc::new(tools))
            .with_model(&config.model.model)
            .with_temperature(config.model.temperature)
            .with_max_tokens(config.model.max_tokens)
            .with_max_iterations(config.agent.max_iterations);
        if let Some(prompt) = &config.agent.system_prompt_override {
            orchestrator = orchestrator.with_system_prompt(prompt);
        }
        Ok(orchestrator)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the model round-trip budget per run.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Start a run on a background task and return its event stream.
    ///
    /// The receiver yields progress events and ends right after the terminal
    /// event. Dropping it cancels the run before its next model round-trip.
    pub fn run_stream(
        self: &Arc<Self>,
        message: String,
        gateway: GatewayConfig,
    ) -> mpsc::Receiver<ProgressEvent> {
        let (mut relay, rx) = ProgressRelay::channel(EVENT_CHANNEL_CAPACITY);
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run(&message, &gateway, &mut relay).await;
        });
        rx
    }

    /// Drive one run to completion.
    pub async fn run(
        &self,
        message: &str,
        gateway: &GatewayConfig,
        relay: &mut ProgressRelay,
    ) -> RunReport {
        let transcript = Transcript::seeded(&self.system_prompt, message);
        let run_id = transcript.id.clone();
        info!(run_id = %run_id, model = %gateway.model_name, "Starting run");

        let mut ctx = RunContext {
            gateway,
            relay,
            transcript,
            definitions: self.tools.definitions(),
            iterations: 0,
            tool_calls: 0,
        };

        let mut state = RunState::Seeded;
        let outcome = loop {
            state = match state {
                RunState::Terminal(outcome) => break outcome,
                other => self.step(other, &mut ctx).await,
            };
        };

        self.finish(&outcome, ctx.relay).await;
        info!(
            run_id = %run_id,
            iterations = ctx.iterations,
            tool_calls = ctx.tool_calls,
            events = ctx.relay.emitted(),
            outcome = outcome_label(&outcome),
            "Run finished"
        );

        RunReport {
            run_id,
            outcome,
            iterations: ctx.iterations,
            tool_calls: ctx.tool_calls,
            transcript: ctx.transcript,
        }
    }

    /// One state transition.
    async fn step(&self, state: RunState, ctx: &mut RunContext<'_>) -> RunState {
        match state {
            RunState::Seeded => {
                if !ctx.gateway.ready {
                    warn!("Run rejected: model endpoint not ready");
                    return RunState::Terminal(Outcome::Failed(NOT_READY_MESSAGE.into()));
                }
                RunState::AwaitingModel { iteration: 1 }
            }

            RunState::AwaitingModel { iteration } => {
                if iteration > self.max_iterations {
                    warn!(max = self.max_iterations, "Round-trip budget exhausted");
                    return RunState::Terminal(Outcome::Exhausted);
                }
                if ctx.relay.is_disconnected() {
                    info!(iteration, "Subscriber disconnected, stopping run");
                    return RunState::Terminal(Outcome::Cancelled);
                }

                debug!(iteration, messages = ctx.transcript.len(), "Awaiting model");
                ctx.iterations = iteration;

                let request = ProviderRequest {
                    model: self.model.clone(),
                    messages: ctx.transcript.messages().to_vec(),
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                    tools: ctx.definitions.clone(),
                    tool_choice: Some("auto".into()),
                };

                let response = match self.provider.complete(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(iteration, error = %e, "Model gateway failed");
                        return RunState::Terminal(Outcome::Failed(e.to_string()));
                    }
                };

                let message = response.message;
                if message.has_tool_calls() {
                    let calls = message.tool_calls.clone();
                    ctx.transcript
                        .push(Message::assistant_with_tools(message.content, calls.clone()));
                    RunState::ToolDispatch { iteration, calls }
                } else {
                    let content = sanitize_content(&message.content);
                    ctx.transcript.push(Message::assistant(message.content));
                    RunState::Terminal(Outcome::Done(content))
                }
            }

            RunState::ToolDispatch { iteration, calls } => {
                debug!(iteration, count = calls.len(), "Dispatching tool calls");
                for call in &calls {
                    let output = self.dispatch(call, ctx.relay).await;
                    ctx.transcript.push(Message::tool_result(&call.id, output));
                    ctx.tool_calls += 1;
                }
                RunState::AwaitingModel {
                    iteration: iteration + 1,
                }
            }

            RunState::Terminal(outcome) => RunState::Terminal(outcome),
        }
    }

    /// Execute one tool call and return the text for the transcript.
    async fn dispatch(&self, call: &MessageToolCall, relay: &mut ProgressRelay) -> String {
        let arguments = parse_arguments(&call.arguments);

        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return ToolError::NotFound(call.name.clone()).to_string();
        };

        if let Some(event) = tool.start_event(&arguments) {
            relay.emit(event).await;
        }

        let tool_call = ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        };
        let result = match self.tools.execute(&tool_call).await {
            Ok(result) => result,
            Err(e) => ToolResult::failed(&call.id, e.to_string()),
        };
        if !result.success {
            warn!(tool = %call.name, output = %result.output, "Tool call failed");
        }

        if let Some(event) = tool.result_event(&result) {
            relay.emit(event).await;
        }
        result.output
    }

    async fn finish(&self, outcome: &Outcome, relay: &mut ProgressRelay) {
        if let Outcome::Failed(message) = outcome {
            relay
                .emit(ProgressEvent::Error {
                    message: message.clone(),
                })
                .await;
            return;
        }

        let Some(answer) = outcome.answer() else {
            return;
        };
        // The exhaustion apology goes out as `done` only.
        if matches!(outcome, Outcome::Done(_)) && !answer.is_empty() {
            relay
                .emit(ProgressEvent::Stream {
                    content: answer.to_string(),
                })
                .await;
        }
        relay
            .emit(ProgressEvent::Done {
                content: answer.to_string(),
            })
            .await;
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Done(_) => "done",
        Outcome::Exhausted => "exhausted",
        Outcome::Failed(_) => "error",
        Outcome::Cancelled => "cancelled",
    }
}

impl Outcome {
    /// The answer text a client receives in `done`, if any.
    pub fn answer(&self) -> Option<&str> {
        match self {
            Outcome::Done(content) => Some(content),
            Outcome::Exhausted => Some(EXHAUSTED_ANSWER),
            Outcome::Failed(_) | Outcome::Cancelled => None,
        }
    }
}
