// Loaders turning files and web pages into whole-text documents

pub mod web;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::{RagError, Result};

pub use web::{WebLoader, WebLoaderConfig, extract_page};

/// Origin information attached to a loaded document and every chunk cut from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File path or URL the text was loaded from
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl DocumentMetadata {
    #[inline]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: None,
            description: None,
            language: None,
        }
    }
}

/// The full text of one source before splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Load a UTF-8 text file as a single document
#[inline]
pub fn load_text_file(path: &Path, source: &str) -> Result<Document> {
    let content = fs::read_to_string(path)?;
    debug!("Loaded {} characters of text from {}", content.len(), source);

    Ok(Document {
        content,
        metadata: DocumentMetadata::new(source),
    })
}

/// Extract the text layer of a PDF file as a single document
#[inline]
pub fn load_pdf_file(path: &Path, source: &str) -> Result<Document> {
    let bytes = fs::read(path)?;
    let content = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RagError::Parse {
        origin: source.to_string(),
        message: e.to_string(),
    })?;
    debug!("Extracted {} characters of text from {}", content.len(), source);

    Ok(Document {
        content,
        metadata: DocumentMetadata::new(source),
    })
}
