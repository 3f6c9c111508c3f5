// Deterministic stand-ins for the model services

use std::sync::Mutex;

use super::{Embedder, LanguageModel};
use crate::service::ServiceError;
use crate::{RagError, Result};

pub(crate) const TEST_DIMENSIONS: usize = 32;

/// Bag-of-words vectors: texts sharing words point the same way
#[derive(Debug, Clone, Copy)]
pub(crate) struct WordEmbedder {
    pub dimensions: usize,
}

impl Default for WordEmbedder {
    fn default() -> Self {
        Self {
            dimensions: TEST_DIMENSIONS,
        }
    }
}

impl WordEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2_166_136_261_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16_777_619));
            vector[hash as usize % self.dimensions] += 1.0;
        }
        vector
    }
}

impl Embedder for WordEmbedder {
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }
}

/// Behaves like a reachable server that refuses every request
#[derive(Debug, Default)]
pub(crate) struct DownEmbedder;

impl Embedder for DownEmbedder {
    fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(down())
    }

    fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(down())
    }
}

fn down() -> RagError {
    ServiceError::Unavailable {
        service: "Ollama",
        url: "http://localhost:11434/api/embed".to_string(),
        message: "connection refused".to_string(),
    }
    .into()
}

/// Says it doesn't know when the prompt carries no context, and records every prompt
#[derive(Debug, Default)]
pub(crate) struct RecordingModel {
    prompts: Mutex<Vec<String>>,
}

pub(crate) const UNKNOWN_ANSWER: &str = "I don't know.";
pub(crate) const KNOWN_ANSWER: &str = "The context answers this.";

impl RecordingModel {
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl LanguageModel for RecordingModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let empty_context = prompt.contains("Context: \n\nQuestion:");
        Ok(if empty_context {
            UNKNOWN_ANSWER.to_string()
        } else {
            KNOWN_ANSWER.to_string()
        })
    }
}
