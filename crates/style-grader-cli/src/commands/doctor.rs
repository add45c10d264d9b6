//! Doctor command implementation.

use anyhow::{bail, Result};
use std::path::Path;
use style_grader_ollama::OllamaClient;

/// Runs the doctor command.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    match config_path {
        Some(p) => println!("Config:   {}", p.display()),
        None => println!("Config:   defaults"),
    }

    let client = OllamaClient::from_config(&config.semantic)?;
    println!("Endpoint: {}", client.endpoint());
    println!("Model:    {}", client.model());
    println!(
        "Semantic: {}",
        if config.semantic.enabled {
            "enabled"
        } else {
            "disabled (enable in config or pass --semantic)"
        }
    );

    if !client.check_connection().await {
        bail!(
            "Cannot reach {}. Is Ollama running? Start it with `ollama serve`.",
            client.endpoint()
        );
    }
    println!("Server:   reachable");

    if !client.has_model().await? {
        bail!(
            "Model {} is not installed. Pull it with `ollama pull {}`.",
            client.model(),
            client.model()
        );
    }
    println!("Model:    installed");

    Ok(())
}
