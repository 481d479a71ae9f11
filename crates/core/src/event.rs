//! Progress events relayed to the client while a run is in flight.
//!
//! Events serialize as `{"type": "...", ...}` objects; the gateway writes each
//! one as a single SSE `data:` frame. `done` and `error` are terminal.

use serde::{Deserialize, Serialize};

/// Events emitted by the orchestrator during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A web search is about to run.
    SearchStart { query: String },

    /// Formatted search results (or the search's error text).
    SearchResults { results: String },

    /// A page fetch is about to run.
    FetchStart { url: String },

    /// Preview of the fetched page text.
    FetchResults { content: String },

    /// The sanitized final answer, emitted once just before `done`.
    Stream { content: String },

    /// The run finished; carries the final answer.
    Done { content: String },

    /// The run failed.
    Error { message: String },
}

impl ProgressEvent {
    /// Wire name of this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SearchStart { .. } => "search_start",
            Self::SearchResults { .. } => "search_results",
            Self::FetchStart { .. } => "fetch_start",
            Self::FetchResults { .. } => "fetch_results",
            Self::Stream { .. } => "stream",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether nothing may follow this event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_search_start() {
        let event = ProgressEvent::SearchStart {
            query: "weather Paris".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"search_start","query":"weather Paris"}"#);
    }

    #[test]
    fn fetch_results_uses_content_key() {
        let event = ProgressEvent::FetchResults {
            content: "Hello...".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"fetch_results","content":"Hello..."}"#);
    }

    #[test]
    fn event_type_matches_serialized_tag() {
        let events = [
            ProgressEvent::SearchStart { query: "q".into() },
            ProgressEvent::SearchResults { results: "r".into() },
            ProgressEvent::FetchStart { url: "u".into() },
            ProgressEvent::FetchResults { content: "c".into() },
            ProgressEvent::Stream { content: "s".into() },
            ProgressEvent::Done { content: "d".into() },
            ProgressEvent::Error { message: "e".into() },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.event_type());
        }
    }

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(ProgressEvent::Done { content: String::new() }.is_terminal());
        assert!(ProgressEvent::Error { message: String::new() }.is_terminal());
        assert!(!ProgressEvent::Stream { content: String::new() }.is_terminal());
        assert!(!ProgressEvent::SearchStart { query: String::new() }.is_terminal());
    }

    #[test]
    fn event_deserializes_from_wire() {
        let event: ProgressEvent =
            serde_json::from_str(r#"{"type":"error","message":"boom"}"#).unwrap();
        assert_eq!(event, ProgressEvent::Error { message: "boom".into() });
    }
}
