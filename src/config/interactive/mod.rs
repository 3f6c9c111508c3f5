#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::time::Duration;
use url::Url;

use super::{Config, ConfigError, OllamaConfig, QdrantConfig};
use crate::service::{ServiceAgent, ServiceError};

const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Simple RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embeddings and answers.");
    eprintln!();
    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Qdrant Configuration").bold().yellow());
    eprintln!("Configure the Qdrant instance that stores document vectors.");
    eprintln!();
    configure_qdrant(&mut config.qdrant)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());
    report_connection("Ollama", config.ollama.url(), "/api/version");
    report_connection("Qdrant", config.qdrant.url(), "/");

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    print_url("Ollama URL", config.ollama.url());
    eprintln!("  Chat Model: {}", style(&config.ollama.chat_model).cyan());
    eprintln!(
        "  Embedding Model: {}",
        style(&config.ollama.embedding_model).cyan()
    );
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
    eprintln!("  Timeout: {}s", style(config.ollama.timeout_seconds).cyan());

    eprintln!();
    eprintln!("{}", style("Qdrant Settings:").bold().yellow());
    print_url("Qdrant URL", config.qdrant.url());
    eprintln!("  Collection: {}", style(&config.qdrant.collection).cyan());
    eprintln!("  Vector Size: {}", style(config.qdrant.vector_size).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!(
        "  Chunk Overlap: {}",
        style(config.chunking.chunk_overlap).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn print_url(label: &str, url: Result<Url, ConfigError>) {
    match url {
        Ok(url) => eprintln!("  {}: {}", label, style(url).cyan()),
        Err(e) => eprintln!("  {}: {} ({})", label, style("Invalid").red(), e),
    }
}

fn load_existing_config() -> Result<Config> {
    match Config::load_default() {
        Ok(config) => {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        }
        Err(_) => {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: Config::config_dir()?,
                ..Config::default()
            })
        }
    }
}

fn prompt_protocol(name: &str, current: &str) -> Result<String> {
    let protocols = &["http", "https"];
    let default_index = protocols.iter().position(|&p| p == current).unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt(format!("{} protocol", name))
        .default(default_index)
        .items(protocols)
        .interact()?;

    Ok(protocols[protocol_index].to_string())
}

fn prompt_port(name: &str, current: u16) -> Result<u16> {
    let port = Input::new()
        .with_prompt(format!("{} port", name))
        .default(current)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(port)
}

fn prompt_model(prompt: &str, current: &str) -> Result<String> {
    let model = Input::new()
        .with_prompt(prompt)
        .default(current.to_string())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(model)
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocol = prompt_protocol("Ollama", &ollama.protocol)?;

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let candidate = OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            };
            candidate.url().map(|_| ())
        })
        .interact_text()?;

    let port = prompt_port("Ollama", ollama.port)?;
    let chat_model = prompt_model("Chat model", &ollama.chat_model)?;
    let embedding_model = prompt_model("Embedding model", &ollama.embedding_model)?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_chat_model(chat_model)?;
    ollama.set_embedding_model(embedding_model)?;
    ollama.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_qdrant(qdrant: &mut QdrantConfig) -> Result<()> {
    qdrant.protocol = prompt_protocol("Qdrant", &qdrant.protocol)?;

    let host: String = Input::new()
        .with_prompt("Qdrant host")
        .default(qdrant.host.clone())
        .interact_text()?;
    let port = prompt_port("Qdrant", qdrant.port)?;

    let collection: String = Input::new()
        .with_prompt("Collection name")
        .default(qdrant.collection.clone())
        .interact_text()?;

    let vector_size: usize = Input::new()
        .with_prompt("Vector size (embedding model output dimension)")
        .default(qdrant.vector_size)
        .interact_text()?;

    qdrant.set_host(host)?;
    qdrant.set_port(port)?;
    qdrant.set_collection(collection)?;
    qdrant.set_vector_size(vector_size)?;

    Ok(())
}

fn report_connection(name: &'static str, url: Result<Url, ConfigError>, probe_path: &str) {
    let reachable = url.is_ok_and(|url| {
        let agent = ServiceAgent::new(name, url).with_timeout(CONNECTION_TEST_TIMEOUT);
        is_reachable(&agent.get_json::<serde_json::Value>(probe_path))
    });

    if reachable {
        eprintln!(
            "{}",
            style(format!("✓ {} connection successful!", name)).green()
        );
    } else {
        eprintln!(
            "{}",
            style(format!("⚠ Warning: Could not connect to {}", name)).yellow()
        );
        eprintln!(
            "You can continue, but make sure {} is running before using the system.",
            name
        );
    }
}

/// A service that answered at all, even with an error status, is reachable
fn is_reachable<T>(result: &Result<T, ServiceError>) -> bool {
    match result {
        Ok(_) => true,
        Err(ServiceError::Status { status, .. }) => (400..500).contains(status),
        Err(_) => false,
    }
}
