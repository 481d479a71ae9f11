//! `dojo serve`: Start the HTTP API server.

use dojo_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }
    config.validate()?;

    println!("Dojo server");
    println!("   Listening: http://{}", config.bind_addr());
    println!("   Model:     {} ({})", config.model.model, config.model.base_url);
    println!("   Search:    {}", config.search.url);

    dojo_gateway::start(config).await?;

    Ok(())
}
