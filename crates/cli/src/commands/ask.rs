//! `dojo ask`: Research one question in-process.
//!
//! Consumes the same progress events the HTTP server streams, printing
//! tool activity to stderr and the answer to stdout.

use std::sync::Arc;

use dojo_agent::Orchestrator;
use dojo_config::AppConfig;
use dojo_core::{ProgressEvent, Provider};
use dojo_providers::OpenAiCompatProvider;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::from_config(&config.model)?);
    let gateway = dojo_providers::probe(provider.as_ref()).await;
    if !gateway.ready {
        eprintln!("  Model endpoint not reachable at {}", config.model.base_url);
        return Err("AI not ready. Is the model server running?".into());
    }

    let orchestrator = Arc::new(Orchestrator::from_config(provider, &config)?);
    let mut rx = orchestrator.run_stream(message, gateway);

    let mut streamed = false;
    while let Some(event) = rx.recv().await {
        match &event {
            ProgressEvent::Stream { .. } => streamed = true,
            ProgressEvent::Done { .. } if streamed => continue,
            ProgressEvent::Error { message } => return Err(message.clone().into()),
            _ => {}
        }
        if let Some(line) = render(&event) {
            if matches!(event, ProgressEvent::Stream { .. } | ProgressEvent::Done { .. }) {
                println!("{line}");
            } else {
                eprintln!("{line}");
            }
        }
    }

    Ok(())
}

/// One printable line per progress event.
fn render(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::SearchStart { query } => Some(format!("  Searching: {query}")),
        ProgressEvent::SearchResults { results } => {
            let hits = results.lines().filter(|l| starts_numbered(l)).count();
            Some(format!("  Found {hits} result(s)"))
        }
        ProgressEvent::FetchStart { url } => Some(format!("  Reading: {url}")),
        ProgressEvent::FetchResults { .. } => None,
        ProgressEvent::Stream { content } | ProgressEvent::Done { content } => {
            Some(format!("\n{content}"))
        }
        ProgressEvent::Error { message } => Some(format!("  [Error] {message}")),
    }
}

fn starts_numbered(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}
