//! The research loop: drives a chat model through web searches and page
//! fetches until it can answer.
//!
//! 1. **Seed** a transcript with the system rules and the user's question
//! 2. **Ask the model**, presenting the `web_search` and `fetch_url` declarations
//! 3. **If tool calls**: run them in order, relay progress, append results, go to 2
//! 4. **If text**: strip control tokens, relay `stream` then `done`
//!
//! The loop stops at the round-trip budget with a fixed apology, and any
//! model gateway failure ends the run with a single `error` event.

pub mod orchestrator;
pub mod prompt;
pub mod relay;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use orchestrator::{Orchestrator, Outcome, RunReport};
pub use relay::{EVENT_CHANNEL_CAPACITY, ProgressRelay};
