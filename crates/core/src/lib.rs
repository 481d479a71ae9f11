//! # Dojo Core
//!
//! Domain types, traits, and error definitions for the Dojo research assistant.
//! This crate has **no transport dependencies**: it defines the transcript,
//! the model-gateway and tool abstractions, and the progress events that every
//! other crate implements against.
//!
//! ## Design Philosophy
//!
//! The orchestrator only ever talks to a [`Provider`] and a [`ToolRegistry`],
//! and only ever speaks outward through [`ProgressEvent`]s. That keeps the loop
//! testable with scripted providers and lets SSE, the CLI and tests consume the
//! same event stream.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::ProgressEvent;
pub use message::{Message, MessageToolCall, Role, RunId, Transcript};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
