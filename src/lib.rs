use std::path::PathBuf;

use thiserror::Error;

pub use service::ServiceError;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Vector dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RagError {
    /// Whether the error means an external service could not be reached
    #[inline]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::Service(ServiceError::Unavailable { .. }))
    }
}

pub mod chat;
pub mod commands;
pub mod config;
pub mod llm;
pub mod processor;
pub mod rag;
pub mod service;
pub mod session;
pub mod vector_store;
