
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Embedder, LanguageModel};
use crate::config::OllamaConfig;
use crate::service::{ServiceAgent, ServiceError};
use crate::{RagError, Result};

const SERVICE_NAME: &str = "Ollama";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    agent: ServiceAgent,
    embedding_model: String,
    chat_model: String,
    batch_size: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    #[serde(rename = "input")]
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ModelDetails {
    pub format: Option<String>,
    pub family: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RagError::Config(format!("Failed to generate Ollama URL: {}", e)))?;

        let agent = ServiceAgent::new(SERVICE_NAME, base_url)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
            .with_retry_attempts(config.retry_attempts);

        Ok(Self {
            agent,
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            batch_size: config.batch_size.max(1),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = self.agent.with_timeout(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.agent = self.agent.with_retry_attempts(attempts);
        self
    }

    #[inline]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    #[inline]
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    #[inline]
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Test connection to Ollama and verify both models are pulled
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.agent.base_url());

        self.ping()?;
        self.validate_models()?;

        info!(
            "Health check passed for Ollama at {} (chat: {}, embeddings: {})",
            self.agent.base_url(),
            self.chat_model,
            self.embedding_model
        );
        Ok(())
    }

    /// Check that the Ollama server is responsive
    #[inline]
    pub fn ping(&self) -> Result<()> {
        debug!("Pinging Ollama at {}", self.agent.base_url());
        let _: serde_json::Value = self.agent.get_json("/api/tags")?;
        debug!("Server ping successful");
        Ok(())
    }

    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response: ModelsResponse = self.agent.get_json("/api/tags")?;
        debug!("Found {} models", response.models.len());
        Ok(response.models)
    }

    /// Verify that the chat and embedding models are both available
    #[inline]
    pub fn validate_models(&self) -> Result<()> {
        let models = self.list_models()?;
        let available: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();

        for model in [&self.chat_model, &self.embedding_model] {
            if !available.iter().any(|name| model_matches(name, model)) {
                warn!(
                    "Model {} not found. Available models: {:?}",
                    model, available
                );
                return Err(RagError::Config(format!(
                    "Model '{}' is not available in Ollama. Available models: {:?}",
                    model, available
                )));
            }
        }

        Ok(())
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.embedding_model,
            inputs: texts,
        };

        let response: EmbedResponse = self.agent.post_json("/api/embed", &request)?;

        if response.embeddings.len() != texts.len() {
            return Err(ServiceError::InvalidResponse {
                service: SERVICE_NAME,
                message: format!(
                    "Mismatch between request and response counts: {} vs {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            }
            .into());
        }

        Ok(response.embeddings)
    }
}

impl Embedder for OllamaClient {
    #[inline]
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size as usize) {
            embeddings.extend(self.embed_batch(batch)?);
        }

        debug!("Generated {} embeddings total", embeddings.len());
        Ok(embeddings)
    }

    #[inline]
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text.to_string()])?;
        embeddings.pop().ok_or_else(|| {
            ServiceError::InvalidResponse {
                service: SERVICE_NAME,
                message: "Empty embedding response".to_string(),
            }
            .into()
        })
    }
}

impl LanguageModel for OllamaClient {
    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Generating completion with {} (prompt length: {})",
            self.chat_model,
            prompt.len()
        );

        let request = GenerateRequest {
            model: &self.chat_model,
            prompt,
            stream: false,
        };

        let response: GenerateResponse = self.agent.post_json("/api/generate", &request)?;
        Ok(response.response)
    }
}

/// Ollama reports untagged models as `name:latest`
fn model_matches(available: &str, wanted: &str) -> bool {
    available == wanted
        || available
            .strip_suffix(":latest")
            .is_some_and(|base| base == wanted)
        || wanted
            .strip_suffix(":latest")
            .is_some_and(|base| base == available)
}
