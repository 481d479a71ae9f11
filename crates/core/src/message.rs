//! Message and Transcript domain types.
//!
//! A transcript is the ordered history sent to the model on every round-trip.
//! Within one run it only ever grows: there is no API to edit or remove a
//! message once it has been pushed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Behavioral rules for the model
    System,
    /// The person asking
    User,
    /// The model
    Assistant,
    /// A tool execution result
    Tool,
}

/// A single message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content (empty while a tool call is pending)
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create an assistant message that requests tool calls.
    pub fn assistant_with_tools(
        content: impl Into<String>,
        tool_calls: Vec<MessageToolCall>,
    ) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// True when the model asked for at least one tool.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Opaque ID chosen by the model
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON-encoded string, exactly as the model sent them
    pub arguments: String,
}

/// The message history of one run. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Run this transcript belongs to
    pub id: RunId,

    messages: Vec<Message>,

    /// When the run started
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self {
            id: RunId::new(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Seed a transcript with the system rules and the user's request.
    pub fn seeded(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push(Message::system(system_prompt));
        transcript.push(Message::user(user_message));
        transcript
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Check that every tool message answers a call from the nearest preceding
    /// assistant message.
    ///
    /// Returns the offending message index on failure.
    pub fn verify_tool_links(&self) -> std::result::Result<(), usize> {
        let mut open_calls: Option<&[MessageToolCall]> = None;
        for (idx, msg) in self.messages.iter().enumerate() {
            match msg.role {
                Role::Assistant => open_calls = Some(&msg.tool_calls),
                Role::Tool => {
                    let linked = match (open_calls, msg.tool_call_id.as_deref()) {
                        (Some(calls), Some(id)) => calls.iter().any(|c| c.id == id),
                        _ => false,
                    };
                    if !linked {
                        return Err(idx);
                    }
                }
                Role::System | Role::User => open_calls = None,
            }
        }
        Ok(())
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
