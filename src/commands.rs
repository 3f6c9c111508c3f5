use anyhow::{Context, Result};
use dialoguer::Confirm;
use tracing::{error, info};

use crate::chat::{print_response, run_chat};
use crate::config::Config;
use crate::llm::OllamaClient;
use crate::processor::{InputOutcome, RawInput};
use crate::rag::RagSystem;
use crate::vector_store::QdrantClient;

/// Load the configuration and connect to both services
#[inline]
pub fn connect() -> Result<RagSystem> {
    let config = Config::load_default().context("Failed to load configuration")?;
    RagSystem::new(&config).context("Failed to initialize RAG system")
}

/// Add files or URLs to the knowledge base
#[inline]
pub fn add_documents(inputs: &[String]) -> Result<()> {
    let rag = connect()?;
    let inputs: Vec<RawInput> = inputs.iter().map(|i| RawInput::from(i.as_str())).collect();

    info!("Adding {} inputs to the knowledge base", inputs.len());
    let report = rag
        .add_documents(&inputs)
        .context("Failed to add documents")?;

    for outcome in &report.outcomes {
        match outcome {
            InputOutcome::Chunked { input, chunks } => {
                println!("✅ {} ({} chunks)", input, chunks.len());
            }
            InputOutcome::Skipped { index, reason } => {
                println!("⏭️  Skipped input {}: {}", index + 1, reason);
            }
        }
    }

    println!();
    println!(
        "Added {} chunks from {} documents",
        report.chunks_added,
        report.ingested()
    );
    Ok(())
}

/// Answer a single question and print its sources
#[inline]
pub fn ask(question: &str) -> Result<()> {
    let rag = connect()?;
    let response = rag.query(question).context("Failed to answer question")?;
    print_response(&response);
    Ok(())
}

/// Remove every document from the knowledge base
#[inline]
pub fn clear(skip_confirmation: bool) -> Result<()> {
    let rag = connect()?;
    let status = rag.status()?;

    if !skip_confirmation {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} chunks from collection '{}'?",
                status.chunk_count, status.collection
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Nothing was deleted.");
            return Ok(());
        }
    }

    rag.clear_knowledge_base()
        .context("Failed to clear knowledge base")?;
    println!("🗑️  Knowledge base cleared");
    Ok(())
}

/// Start an interactive chat session
#[inline]
pub fn chat() -> Result<()> {
    let rag = connect()?;
    run_chat(&rag)
}

/// Show service health and knowledge base size
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load_default().unwrap_or_default();

    println!("📊 Simple RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Ollama Status:");
    let ollama_ok = match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("   💬 Chat Model: {}", config.ollama.chat_model);
                println!("   🔢 Embedding Model: {}", config.ollama.embedding_model);
                true
            }
            Err(e) if e.is_service_unavailable() => {
                println!("   ❌ Ollama: Failed to connect - {}", e);
                false
            }
            Err(e) => {
                println!("   ⚠️  Ollama: Connected but unhealthy - {}", e);
                false
            }
        },
        Err(e) => {
            println!("   ❌ Ollama: Invalid configuration - {}", e);
            false
        }
    };
    println!();

    println!("🔍 Qdrant Status:");
    let qdrant_ok = match QdrantClient::new(&config.qdrant).and_then(|client| client.ping()) {
        Ok(()) => {
            println!(
                "   ✅ Qdrant: Connected ({}:{})",
                config.qdrant.host, config.qdrant.port
            );
            true
        }
        Err(e) => {
            println!("   ❌ Qdrant: Failed to connect - {}", e);
            false
        }
    };
    println!();

    println!("📚 Knowledge Base:");
    if !qdrant_ok {
        println!("   Unavailable until Qdrant is reachable");
        return Ok(());
    }

    match RagSystem::new(&config).and_then(|rag| rag.status()) {
        Ok(status) => {
            println!("   Collection: {}", status.collection);
            println!("   Vector Size: {}", status.vector_size);
            println!("   Chunks: {}", status.chunk_count);
        }
        Err(e) => {
            error!("Failed to read knowledge base status: {}", e);
            println!("   ❌ Error: {}", e);
        }
    }

    if !ollama_ok {
        println!();
        println!("💡 Run 'simple-rag config' to point at a running Ollama with both models pulled");
    }

    Ok(())
}
