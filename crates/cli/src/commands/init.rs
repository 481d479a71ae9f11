//! `dojo init`: Write the default config file.

use dojo_config::AppConfig;

pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually or re-run with --force.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote config.toml to: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Start your model server and SearXNG");
    println!("   2. Run: dojo status");
    println!("   3. Run: dojo serve\n");

    Ok(())
}
