#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Integration tests that require local Ollama and Qdrant instances
// Run with: cargo test --test integration_services -- --ignored

use simple_rag::config::{Config, OllamaConfig, QdrantConfig};
use simple_rag::llm::{Embedder, LanguageModel, OllamaClient};
use simple_rag::processor::RawInput;
use simple_rag::rag::RagSystem;
use simple_rag::vector_store::QdrantClient;
use std::env;
use std::fs;
use tempfile::TempDir;
use tracing::info;

const TEST_COLLECTION: &str = "simple_rag_integration";

fn integration_config() -> Config {
    let ollama_host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
    let qdrant_host = env::var("QDRANT_HOST").unwrap_or_else(|_| "localhost".to_string());
    let embedding_model = env::var("OLLAMA_EMBEDDING_MODEL").unwrap_or_else(|_| "llama2".to_string());
    let chat_model = env::var("OLLAMA_CHAT_MODEL").unwrap_or_else(|_| "llama2:1.3b".to_string());
    let vector_size = env::var("QDRANT_VECTOR_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4096);

    Config {
        ollama: OllamaConfig {
            host: ollama_host,
            embedding_model,
            chat_model,
            ..OllamaConfig::default()
        },
        qdrant: QdrantConfig {
            host: qdrant_host,
            collection: TEST_COLLECTION.to_string(),
            vector_size,
            ..QdrantConfig::default()
        },
        ..Config::default()
    }
}

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_health_check() {
    init_test_tracing();

    let client = OllamaClient::new(&integration_config().ollama).expect("client should build");
    let result = client.health_check();

    assert!(
        result.is_ok(),
        "Health check should succeed with local Ollama: {:?}",
        result
    );
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_embeddings_and_generation() {
    init_test_tracing();

    let config = integration_config();
    let client = OllamaClient::new(&config.ollama).expect("client should build");

    let texts = vec!["first text".to_string(), "second text".to_string()];
    let embeddings = client
        .embed_documents(&texts)
        .expect("embedding should succeed");
    assert_eq!(embeddings.len(), 2);
    assert_eq!(embeddings[0].len(), config.qdrant.vector_size);

    let answer = client
        .generate("Reply with the single word: hello")
        .expect("generation should succeed");
    assert!(!answer.trim().is_empty());
    info!("Model answered: {}", answer);
}

#[test]
#[ignore = "requires a running Qdrant instance"]
fn real_qdrant_ping() {
    init_test_tracing();

    let client = QdrantClient::new(&integration_config().qdrant).expect("client should build");
    client.ping().expect("Qdrant should answer");
}

#[test]
#[ignore = "requires running Ollama and Qdrant instances"]
fn real_round_trip() {
    init_test_tracing();

    let dir = TempDir::new().expect("should create temp dir");
    let file = dir.path().join("facts.txt");
    fs::write(&file, "The Rust compiler is called rustc.").expect("should write");

    let rag = RagSystem::new(&integration_config()).expect("system should start");
    rag.clear_knowledge_base().expect("clear should succeed");

    let report = rag
        .add_documents(&[RawInput::from(file.display().to_string())])
        .expect("ingest should succeed");
    assert_eq!(report.chunks_added, 1);
    assert_eq!(rag.status().expect("status should work").chunk_count, 1);

    let response = rag
        .query("What is the Rust compiler called?")
        .expect("query should succeed");
    assert_eq!(response.sources.len(), 1);
    info!("Answer: {}", response.answer);

    rag.clear_knowledge_base().expect("clear should succeed");
    assert_eq!(rag.status().expect("status should work").chunk_count, 0);
}
