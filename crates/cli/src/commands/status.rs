//! `dojo status`: Probe the model endpoint and show configuration.

use dojo_config::AppConfig;
use dojo_providers::OpenAiCompatProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = OpenAiCompatProvider::from_config(&config.model)?;
    let status = dojo_providers::probe(&provider).await;

    println!("Dojo Status");
    println!("===========");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Model URL:    {}", config.model.base_url);
    println!("  Search URL:   {}", config.search.url);
    println!("  Server:       {}", config.bind_addr());
    println!("  Max rounds:   {}", config.agent.max_iterations);

    if status.ready {
        println!("\n  Model ready: {}", status.model_name);
    } else {
        println!("\n  Model not reachable. Is the model server running?");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  No config file, using defaults (run `dojo init` to create one)");
    }

    Ok(())
}
