// Model seams: text embedding and text generation

pub mod ollama;

#[cfg(test)]
pub(crate) mod testing;

use crate::Result;

pub use ollama::{ModelInfo, OllamaClient};

/// Turns text into fixed-length vectors
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in the same order
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Completes a prompt with a single block of text
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}
