// Document processing: resolve inputs, load them, and cut them into chunks

pub mod loader;
pub mod splitter;


use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use crate::{RagError, Result};

pub use loader::{Document, DocumentMetadata, WebLoader, WebLoaderConfig};
pub use splitter::{ChunkingConfig, RecursiveTextSplitter};

/// Position of a chunk within the document it was cut from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(flatten)]
    pub document: DocumentMetadata,
    /// Index of this chunk within its document
    #[serde(default)]
    pub chunk_index: usize,
    /// Byte offset of the chunk text within the document
    #[serde(default)]
    pub start_index: usize,
}

/// A bounded span of source text, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    #[inline]
    pub fn source(&self) -> &str {
        &self.metadata.document.source
    }
}

/// An input as handed over by a caller; only text inputs name a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Binary(Vec<u8>),
}

impl From<&str> for RawInput {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawInput {
    #[inline]
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for RawInput {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    /// Classify a path by its (case-insensitive) extension
    #[inline]
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Text),
            "" => Err(RagError::UnsupportedType(format!(
                "{} has no extension",
                path.display()
            ))),
            other => Err(RagError::UnsupportedType(format!(".{}", other))),
        }
    }
}

/// A document location resolved once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    Url(Url),
    File(PathBuf),
}

impl DocumentInput {
    /// `http://` and `https://` strings are URLs, anything else is a file path
    #[inline]
    pub fn parse(input: &str) -> Result<Self> {
        if input.starts_with("http://") || input.starts_with("https://") {
            let url = Url::parse(input).map_err(|e| RagError::Fetch {
                url: input.to_string(),
                message: format!("Invalid URL: {}", e),
            })?;
            Ok(Self::Url(url))
        } else {
            Ok(Self::File(PathBuf::from(input)))
        }
    }
}

impl fmt::Display for DocumentInput {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The input carried raw bytes rather than a path or URL
    NotText,
}

impl fmt::Display for SkipReason {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotText => write!(f, "not a path or URL"),
        }
    }
}

/// What happened to one input of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Chunked {
        input: DocumentInput,
        chunks: Vec<Chunk>,
    },
    Skipped {
        index: usize,
        reason: SkipReason,
    },
}

impl InputOutcome {
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        match self {
            Self::Chunked { chunks, .. } => chunks,
            Self::Skipped { .. } => &[],
        }
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Loads files and web pages and splits them with one chunking policy
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor {
    splitter: RecursiveTextSplitter,
    web_loader: WebLoader,
}

impl DocumentProcessor {
    #[inline]
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            splitter: RecursiveTextSplitter::new(config),
            web_loader: WebLoader::default(),
        }
    }

    #[inline]
    pub fn with_web_loader(mut self, web_loader: WebLoader) -> Self {
        self.web_loader = web_loader;
        self
    }

    #[inline]
    pub fn chunking_config(&self) -> ChunkingConfig {
        self.splitter.config()
    }

    /// Load a PDF or text file and split it into chunks
    #[inline]
    pub fn process_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        self.process_file_as(path, &path.display().to_string())
    }

    /// Like [`Self::process_file`], but records `source` as the chunk origin
    #[inline]
    pub fn process_file_as(&self, path: &Path, source: &str) -> Result<Vec<Chunk>> {
        if !path.exists() {
            return Err(RagError::NotFound(path.to_path_buf()));
        }

        let document = match FileKind::from_path(path)? {
            FileKind::Pdf => loader::load_pdf_file(path, source)?,
            FileKind::Text => loader::load_text_file(path, source)?,
        };

        let chunks = self.splitter.split_documents(&[document]);
        info!("Processed {} into {} chunks", source, chunks.len());
        Ok(chunks)
    }

    /// Fetch a web page and split its text into chunks
    #[inline]
    pub fn process_url(&self, url: &Url) -> Result<Vec<Chunk>> {
        let document = self.web_loader.load(url)?;
        let chunks = self.splitter.split_documents(&[document]);
        info!("Processed {} into {} chunks", url, chunks.len());
        Ok(chunks)
    }

    #[inline]
    pub fn process_input(&self, input: &DocumentInput) -> Result<Vec<Chunk>> {
        match input {
            DocumentInput::Url(url) => self.process_url(url),
            DocumentInput::File(path) => self.process_file(path),
        }
    }

    /// Process every input in order, reporting what happened to each.
    /// Non-text inputs are skipped; the first failure aborts the batch.
    #[inline]
    pub fn process_inputs(&self, inputs: &[RawInput]) -> Result<Vec<InputOutcome>> {
        let mut outcomes = Vec::with_capacity(inputs.len());

        for (index, raw) in inputs.iter().enumerate() {
            let RawInput::Text(text) = raw else {
                warn!("Skipping input {}: not a path or URL", index);
                outcomes.push(InputOutcome::Skipped {
                    index,
                    reason: SkipReason::NotText,
                });
                continue;
            };

            let input = DocumentInput::parse(text)?;
            let chunks = self.process_input(&input)?;
            outcomes.push(InputOutcome::Chunked { input, chunks });
        }

        Ok(outcomes)
    }

    /// Process every input and concatenate the chunks in input order
    #[inline]
    pub fn process_documents(&self, inputs: &[RawInput]) -> Result<Vec<Chunk>> {
        let chunks: Vec<Chunk> = self
            .process_inputs(inputs)?
            .into_iter()
            .flat_map(|outcome| match outcome {
                InputOutcome::Chunked { chunks, .. } => chunks,
                InputOutcome::Skipped { .. } => Vec::new(),
            })
            .collect();

        debug!("Processed {} inputs into {} chunks", inputs.len(), chunks.len());
        Ok(chunks)
    }
}
